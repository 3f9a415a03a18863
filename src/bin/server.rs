//! Embercask Server Binary
//!
//! Starts the TCP server for embercask. All configuration comes from the
//! environment; invalid settings are reported together before exiting.

use std::sync::Arc;

use embercask::config::{
    ENV_DATA_DIR, ENV_MAX_CONNECTIONS, ENV_PASSWORD, ENV_READ_BUFFER_SIZE, ENV_SERVER_PORT,
    ENV_SYNC_WRITES, ENV_TLS_CERT_PATH, ENV_TLS_KEY_PATH, ENV_USERNAME,
};
use embercask::network::Server;
use embercask::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,embercask=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("*** Embercask Server (v{}) ***", embercask::VERSION);

    tracing::info!("Validating environment config...");
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(problems) => {
            for problem in &problems {
                tracing::error!("{}", problem);
            }
            tracing::error!("Invalid environment config. Exiting.");
            std::process::exit(1);
        }
    };

    display_config(&config);

    tracing::info!("StorageEngine: Initializing...");
    let engine = match Engine::open(config.clone()) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!("Failed to open storage engine: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("StorageEngine: READY");

    let server = match Server::bind(config.clone(), engine) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server: Listening on {}.", config.server_port);

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Log the effective configuration, marking values that fell back to
/// defaults and masking the password.
fn display_config(config: &Config) {
    tracing::info!("Displaying config values:");
    tracing::info!("  {} = {}", ENV_DATA_DIR, config.data_dir.display());
    tracing::info!(
        "  {} = {}{}",
        ENV_SERVER_PORT,
        config.server_port,
        default_marker(ENV_SERVER_PORT)
    );
    tracing::info!(
        "  {} = {}{}",
        ENV_READ_BUFFER_SIZE,
        config.read_buffer_size,
        default_marker(ENV_READ_BUFFER_SIZE)
    );
    tracing::info!(
        "  {} = {}{}",
        ENV_SYNC_WRITES,
        config.sync_writes,
        default_marker(ENV_SYNC_WRITES)
    );
    tracing::info!(
        "  {} = {}{}",
        ENV_MAX_CONNECTIONS,
        config.max_connections,
        default_marker(ENV_MAX_CONNECTIONS)
    );

    match &config.credentials {
        Some(credentials) => {
            tracing::info!("  {} = {}", ENV_USERNAME, credentials.username());
            tracing::info!("  {} = {}", ENV_PASSWORD, credentials.masked_password());
        }
        None => {
            tracing::info!("  {} = (unset)", ENV_USERNAME);
            tracing::info!("  {} = (unset)", ENV_PASSWORD);
        }
    }

    match &config.tls {
        Some(tls) => {
            tracing::info!("  {} = {}", ENV_TLS_KEY_PATH, tls.key_path.display());
            tracing::info!("  {} = {}", ENV_TLS_CERT_PATH, tls.cert_path.display());
        }
        None => {
            tracing::info!("  {} = (unset)", ENV_TLS_KEY_PATH);
            tracing::info!("  {} = (unset)", ENV_TLS_CERT_PATH);
        }
    }
}

fn default_marker(name: &str) -> &'static str {
    if std::env::var_os(name).is_none() {
        " (default)"
    } else {
        ""
    }
}
