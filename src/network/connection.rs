//! Connection Handler
//!
//! Handles individual client connections.
//!
//! Each connection reads one request frame at a time and answers it with
//! a JSON envelope. Two failure classes get different treatment:
//!
//! - **Framing errors** (unknown opcode, oversized or truncated frame):
//!   the stream can no longer be trusted, so the connection closes after
//!   a best-effort failure reply.
//! - **Shape errors** (bad JSON, missing or unknown fields): answered
//!   with a failure envelope and the connection stays open.
//!
//! When credentials are configured, every request before a successful
//! AUTH is refused and a failed AUTH closes the connection.

use std::io::{Read, Write};
use std::sync::Arc;

use serde_json::Value;

use crate::config::Credentials;
use crate::engine::Engine;
use crate::error::{EmberError, Result};
use crate::protocol::{read_request, write_response, AuthRequest, Request, Response};

const INVALID_CREDENTIALS: &str = "Invalid username / password combination provided.";
const AUTH_REQUIRED: &str = "Authentication required.";

/// Handles a single client connection
///
/// Generic over the transport so plain TCP streams and finished TLS
/// sessions share one code path.
pub struct Connection<S: Read + Write> {
    /// Transport stream
    stream: S,

    /// Reference to the storage engine
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,

    /// Credentials this server requires, if any
    credentials: Option<Credentials>,

    /// Whether this connection has passed the AUTH gate
    authenticated: bool,
}

impl<S: Read + Write> Connection<S> {
    /// Create a new connection handler over an established stream
    ///
    /// With no credentials configured the AUTH gate starts open.
    pub fn new(
        stream: S,
        engine: Arc<Engine>,
        peer_addr: String,
        credentials: Option<Credentials>,
    ) -> Self {
        let authenticated = credentials.is_none();
        Self {
            stream,
            engine,
            peer_addr,
            credentials,
            authenticated,
        }
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends responses.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::info!("Connected: {}", self.peer_addr);

        loop {
            // Read the next request frame
            let (op, payload) = match read_request(&mut self.stream) {
                Ok(frame) => frame,
                Err(EmberError::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    // Client disconnected gracefully
                    tracing::info!("Disconnected: {}", self.peer_addr);
                    return Ok(());
                }
                Err(EmberError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                    tracing::info!("Connection reset by {}", self.peer_addr);
                    return Ok(());
                }
                Err(EmberError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionAborted => {
                    tracing::info!("Connection aborted by {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Closing {}: {}", self.peer_addr, e);
                    // Send a failure envelope if the stream still takes writes
                    let _ = self.send(&Response::failure(e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Request 0x{:02x} from {}", op as u8, self.peer_addr);

            // Parse the payload; shape errors are answered without closing
            let request = match Request::parse(op, &payload) {
                Ok(request) => request,
                Err(e) => {
                    tracing::debug!("Rejected request from {}: {}", self.peer_addr, e);
                    self.send(&Response::failure(e.to_string()))?;
                    continue;
                }
            };

            let (response, close_after) = self.dispatch(request);

            if let Err(e) = self.send(&response) {
                // If the client disconnected before the response could be
                // sent (connection abort/reset/broken pipe), log and exit
                // gracefully rather than treating it as a server error.
                if let EmberError::Io(ref io_err) = e {
                    match io_err.kind() {
                        std::io::ErrorKind::ConnectionAborted
                        | std::io::ErrorKind::ConnectionReset
                        | std::io::ErrorKind::BrokenPipe => {
                            tracing::debug!(
                                "Client {} disconnected before response could be sent: {}",
                                self.peer_addr,
                                e
                            );
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }

            if close_after {
                tracing::info!("Disconnected: {}", self.peer_addr);
                return Ok(());
            }
        }
    }

    /// Route one request; the flag says whether to close after replying
    fn dispatch(&mut self, request: Request) -> (Response, bool) {
        match request {
            Request::Auth(body) => self.authenticate(&body),
            _ if !self.authenticated => {
                tracing::warn!("Unauthorized: {}", self.peer_addr);
                (Response::failure(AUTH_REQUIRED), true)
            }
            Request::Get(body) => (self.get_value(&body.key), false),
            Request::Set(body) => (self.set_value(&body.key, body.value), false),
            Request::Ping => (Response::ok(), false),
        }
    }

    /// Check an AUTH request against the configured credentials
    fn authenticate(&mut self, body: &AuthRequest) -> (Response, bool) {
        let credentials = match &self.credentials {
            Some(credentials) => credentials,
            // No credentials configured: AUTH is an accepted no-op
            None => return (Response::ok(), false),
        };

        tracing::debug!("Authenticating: {}", self.peer_addr);
        if credentials.matches(&body.username, &body.password) {
            self.authenticated = true;
            tracing::info!("Authorized: {}", self.peer_addr);
            (Response::ok(), false)
        } else {
            tracing::warn!("Unauthorized: {}", self.peer_addr);
            (Response::failure(INVALID_CREDENTIALS), true)
        }
    }

    /// Look up a key; a missing key is a success carrying a null value
    fn get_value(&self, key: &str) -> Response {
        match self.engine.get(key) {
            Ok(Some(value)) => Response::with_value(value),
            Ok(None) => Response::with_value(Value::Null),
            Err(e) => {
                tracing::error!("GET failed for {}: {}", self.peer_addr, e);
                Response::failure("Failed to get value.")
            }
        }
    }

    /// Persist a value; engine errors are masked on the wire
    fn set_value(&self, key: &str, value: Value) -> Response {
        match self.engine.set(key, value) {
            Ok(()) => Response::ok(),
            Err(e) => {
                tracing::error!("SET failed for {}: {}", self.peer_addr, e);
                Response::failure("Failed to set value.")
            }
        }
    }

    /// Send a response to the client
    fn send(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.stream, response)?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
