//! Configuration for Embercask
//!
//! Centralized configuration with sensible defaults, plus the environment
//! schema the server binary validates on startup. Every violation is
//! collected so an operator sees the full list in one pass, not one
//! failure per restart.

use std::fmt;
use std::path::PathBuf;

// =============================================================================
// Defaults and Limits
// =============================================================================

/// Default TCP port for the server
pub const DEFAULT_SERVER_PORT: u16 = 8091;

/// Default read-buffer chunk size (16 KiB)
pub const DEFAULT_READ_BUFFER_SIZE: usize = 16384;

/// Smallest permitted read-buffer chunk size
pub const MIN_READ_BUFFER_SIZE: usize = 16;

/// Default cap on concurrent client connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;

// =============================================================================
// Environment Variable Names
// =============================================================================

pub const ENV_DATA_DIR: &str = "DB_DATA_DIR";
pub const ENV_SERVER_PORT: &str = "DB_SERVER_PORT";
pub const ENV_USERNAME: &str = "DB_USERNAME";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_TLS_KEY_PATH: &str = "DB_TLS_KEY_PATH";
pub const ENV_TLS_CERT_PATH: &str = "DB_TLS_CERT_PATH";
pub const ENV_READ_BUFFER_SIZE: &str = "READ_BUFFER_BYTE_SIZE";
pub const ENV_SYNC_WRITES: &str = "DB_SYNC_WRITES";
pub const ENV_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";

/// Main configuration for an Embercask instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the segment file(s). Created recursively on startup
    /// if missing.
    pub data_dir: PathBuf,

    /// Chunk size for segment reads. Affects I/O granularity only; the
    /// logical result of a read or scan never depends on it.
    pub read_buffer_size: usize,

    /// Whether to fsync after every append (safest, slowest)
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP port for the server to listen on
    pub server_port: u16,

    /// Optional credential pair clients must present before any other request
    pub credentials: Option<Credentials>,

    /// Optional TLS key/cert paths; when both are set the listener
    /// terminates TLS
    pub tls: Option<TlsPaths>,

    /// Max concurrent client connections
    pub max_connections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./embercask_data"),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            sync_writes: false,
            server_port: DEFAULT_SERVER_PORT,
            credentials: None,
            tls: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from the process environment.
    ///
    /// Returns every schema violation at once so the operator can fix the
    /// whole environment in one pass.
    pub fn from_env() -> std::result::Result<Self, Vec<String>> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Exists so tests can validate the schema without mutating the real
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, Vec<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        // DB_DATA_DIR: required, non-blank
        let data_dir = match lookup(ENV_DATA_DIR) {
            Some(s) if !s.trim().is_empty() => PathBuf::from(s),
            Some(_) => {
                errors.push(format!(
                    "{}: must be a non-empty directory path",
                    ENV_DATA_DIR
                ));
                PathBuf::new()
            }
            None => {
                errors.push(format!(
                    "Environment variable '{}' is required",
                    ENV_DATA_DIR
                ));
                PathBuf::new()
            }
        };

        // DB_SERVER_PORT: integer 1-65535, default 8091
        let server_port = match lookup(ENV_SERVER_PORT) {
            Some(s) => match s.trim().parse::<u16>() {
                Ok(p) if p >= 1 => p,
                _ => {
                    errors.push(format!(
                        "{}: must be an integer between 1 - 65535",
                        ENV_SERVER_PORT
                    ));
                    DEFAULT_SERVER_PORT
                }
            },
            None => DEFAULT_SERVER_PORT,
        };

        // DB_USERNAME / DB_PASSWORD: non-blank, both-or-neither
        let username = match lookup(ENV_USERNAME) {
            Some(s) if !s.trim().is_empty() => Some(s),
            Some(_) => {
                errors.push(format!("{}: must be a non-empty string", ENV_USERNAME));
                None
            }
            None => None,
        };
        let password = match lookup(ENV_PASSWORD) {
            Some(s) if !s.trim().is_empty() => Some(s),
            Some(_) => {
                errors.push(format!("{}: must be a non-empty string", ENV_PASSWORD));
                None
            }
            None => None,
        };
        let credentials = match (username, password) {
            (Some(u), Some(p)) => Some(Credentials::new(u, p)),
            (Some(_), None) => {
                errors.push(format!(
                    "{}: must also provide {}",
                    ENV_USERNAME, ENV_PASSWORD
                ));
                None
            }
            (None, Some(_)) => {
                errors.push(format!(
                    "{}: must also provide {}",
                    ENV_PASSWORD, ENV_USERNAME
                ));
                None
            }
            (None, None) => None,
        };

        // DB_TLS_KEY_PATH / DB_TLS_CERT_PATH: non-blank, both-or-neither
        let tls_key = match lookup(ENV_TLS_KEY_PATH) {
            Some(s) if !s.trim().is_empty() => Some(PathBuf::from(s)),
            Some(_) => {
                errors.push(format!(
                    "{}: must be a non-empty file path",
                    ENV_TLS_KEY_PATH
                ));
                None
            }
            None => None,
        };
        let tls_cert = match lookup(ENV_TLS_CERT_PATH) {
            Some(s) if !s.trim().is_empty() => Some(PathBuf::from(s)),
            Some(_) => {
                errors.push(format!(
                    "{}: must be a non-empty file path",
                    ENV_TLS_CERT_PATH
                ));
                None
            }
            None => None,
        };
        let tls = match (tls_key, tls_cert) {
            (Some(key_path), Some(cert_path)) => Some(TlsPaths {
                key_path,
                cert_path,
            }),
            (Some(_), None) => {
                errors.push(format!(
                    "{}: must also provide {}",
                    ENV_TLS_KEY_PATH, ENV_TLS_CERT_PATH
                ));
                None
            }
            (None, Some(_)) => {
                errors.push(format!(
                    "{}: must also provide {}",
                    ENV_TLS_CERT_PATH, ENV_TLS_KEY_PATH
                ));
                None
            }
            (None, None) => None,
        };

        // READ_BUFFER_BYTE_SIZE: integer >= 16, default 16384
        let read_buffer_size = match lookup(ENV_READ_BUFFER_SIZE) {
            Some(s) => match s.trim().parse::<usize>() {
                Ok(n) if n >= MIN_READ_BUFFER_SIZE => n,
                _ => {
                    errors.push(format!(
                        "{}: must be an integer >= {}",
                        ENV_READ_BUFFER_SIZE, MIN_READ_BUFFER_SIZE
                    ));
                    DEFAULT_READ_BUFFER_SIZE
                }
            },
            None => DEFAULT_READ_BUFFER_SIZE,
        };

        // DB_SYNC_WRITES: 'true' or 'false', default false
        let sync_writes = match lookup(ENV_SYNC_WRITES) {
            Some(s) => match s.trim() {
                "true" => true,
                "false" => false,
                _ => {
                    errors.push(format!("{}: must be 'true' or 'false'", ENV_SYNC_WRITES));
                    false
                }
            },
            None => false,
        };

        // DB_MAX_CONNECTIONS: integer >= 1, default 1024
        let max_connections = match lookup(ENV_MAX_CONNECTIONS) {
            Some(s) => match s.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    errors.push(format!(
                        "{}: must be an integer >= 1",
                        ENV_MAX_CONNECTIONS
                    ));
                    DEFAULT_MAX_CONNECTIONS
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            data_dir,
            read_buffer_size,
            sync_writes,
            server_port,
            credentials,
            tls,
            max_connections,
        })
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Username/password pair clients must present when configured.
///
/// The password never appears in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The configured username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password masked with one asterisk per character, for config display
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }

    /// Whether the presented pair matches the configured pair exactly
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Paths to a PEM private key and certificate chain for TLS termination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub key_path: PathBuf,
    pub cert_path: PathBuf,
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (where segment files live)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the read-buffer chunk size (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Set whether every append is fsynced
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the TCP port to listen on
    pub fn server_port(mut self, port: u16) -> Self {
        self.config.server_port = port;
        self
    }

    /// Require clients to authenticate with the given pair
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Terminate TLS using the given PEM key and certificate files
    pub fn tls_paths(
        mut self,
        key_path: impl Into<PathBuf>,
        cert_path: impl Into<PathBuf>,
    ) -> Self {
        self.config.tls = Some(TlsPaths {
            key_path: key_path.into(),
            cert_path: cert_path.into(),
        });
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
