//! TCP Server
//!
//! Accepts connections and dispatches each to its own handler thread.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use rustls::{ServerConnection, StreamOwned};

use super::connection::Connection;
use super::tls;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

/// TCP server for embercask
pub struct Server {
    /// Server configuration
    config: Config,

    /// Shared storage engine
    engine: Arc<Engine>,

    /// Bound listener
    listener: TcpListener,

    /// TLS state, present when key/cert paths are configured
    tls_config: Option<Arc<rustls::ServerConfig>>,

    /// Live connection count, bounded by `max_connections`
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen socket and prepare TLS, without accepting yet
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        let tls_config = match &config.tls {
            Some(paths) => {
                let server_config = tls::build_server_config(paths)?;
                tracing::info!("TLS: ENABLED");
                Some(Arc::new(server_config))
            }
            None => {
                tracing::warn!("TLS: DISABLED");
                tracing::warn!("TLS: Provide DB_TLS_KEY_PATH and DB_TLS_CERT_PATH.");
                None
            }
        };

        if config.credentials.is_none() {
            tracing::warn!("AUTH: DISABLED");
            tracing::warn!("AUTH: It is strongly recommended to set DB_USERNAME and DB_PASSWORD.");
        }

        let listener = TcpListener::bind(("0.0.0.0", config.server_port))?;

        Ok(Self {
            config,
            engine,
            listener,
            tls_config,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address the listener actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever (blocking)
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }
        Ok(())
    }

    /// Hand one accepted stream to its own thread
    fn spawn_connection(&self, stream: TcpStream) {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Admission check: the slot is taken before the thread starts and
        // released by the guard when the handler finishes.
        let active = Arc::clone(&self.active);
        let prior = active.fetch_add(1, Ordering::AcqRel);
        if prior >= self.config.max_connections {
            active.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!(
                "Refusing {}: connection limit of {} reached",
                peer_addr,
                self.config.max_connections
            );
            return;
        }

        // Disable Nagle's algorithm for low latency
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed for {}: {}", peer_addr, e);
        }

        let engine = Arc::clone(&self.engine);
        let credentials = self.config.credentials.clone();
        let tls_config = self.tls_config.clone();

        thread::spawn(move || {
            struct SlotGuard(Arc<AtomicUsize>);
            impl Drop for SlotGuard {
                fn drop(&mut self) {
                    self.0.fetch_sub(1, Ordering::AcqRel);
                }
            }
            let _slot = SlotGuard(active);

            let outcome = match tls_config {
                Some(tls_config) => match ServerConnection::new(tls_config) {
                    Ok(session) => {
                        // Handshake completes lazily on first read/write
                        let stream = StreamOwned::new(session, stream);
                        Connection::new(stream, engine, peer_addr.clone(), credentials).handle()
                    }
                    Err(e) => {
                        tracing::warn!("TLS session setup failed for {}: {}", peer_addr, e);
                        return;
                    }
                },
                None => Connection::new(stream, engine, peer_addr.clone(), credentials).handle(),
            };

            if let Err(e) = outcome {
                tracing::warn!("Connection {} ended with error: {}", peer_addr, e);
            }
        });
    }
}
