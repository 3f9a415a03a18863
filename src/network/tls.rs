//! TLS configuration
//!
//! Builds the rustls server state from PEM files on disk. The handshake
//! itself runs lazily inside each connection's stream.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use rustls::{Certificate, PrivateKey, ServerConfig};
use rustls_pemfile::{certs, ec_private_keys, pkcs8_private_keys, rsa_private_keys};

use crate::config::TlsPaths;
use crate::error::{EmberError, Result};

/// Build a rustls server config from the configured key and cert paths
pub(crate) fn build_server_config(paths: &TlsPaths) -> Result<ServerConfig> {
    let chain = load_cert_chain(&paths.cert_path)?;
    if chain.is_empty() {
        return Err(EmberError::Tls(format!(
            "no certificates found in {}",
            paths.cert_path.display()
        )));
    }
    let key = load_private_key(&paths.key_path)?;

    ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(chain, key)
        .map_err(|e| EmberError::Tls(format!("invalid key/certificate pair: {}", e)))
}

fn load_cert_chain(path: &Path) -> Result<Vec<Certificate>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let raw = certs(&mut reader).map_err(|_| {
        EmberError::Tls(format!("invalid certificate chain in {}", path.display()))
    })?;
    Ok(raw.into_iter().map(Certificate).collect())
}

/// Accepts PKCS#8, PKCS#1 RSA, or SEC1 EC key material
fn load_private_key(path: &Path) -> Result<PrivateKey> {
    let pem = std::fs::read(path)?;

    let mut reader = Cursor::new(&pem);
    let keys =
        pkcs8_private_keys(&mut reader).map_err(|_| EmberError::Tls("invalid PKCS#8 key".into()))?;
    if let Some(key) = keys.into_iter().next() {
        return Ok(PrivateKey(key));
    }

    let mut reader = Cursor::new(&pem);
    let keys =
        rsa_private_keys(&mut reader).map_err(|_| EmberError::Tls("invalid RSA key".into()))?;
    if let Some(key) = keys.into_iter().next() {
        return Ok(PrivateKey(key));
    }

    let mut reader = Cursor::new(&pem);
    let keys =
        ec_private_keys(&mut reader).map_err(|_| EmberError::Tls("invalid SEC1 EC key".into()))?;
    if let Some(key) = keys.into_iter().next() {
        return Ok(PrivateKey(key));
    }

    Err(EmberError::Tls(format!(
        "no usable private key in {} (expected PKCS#8, PKCS#1 RSA, or SEC1 EC)",
        path.display()
    )))
}
