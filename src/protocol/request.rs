//! Request definitions
//!
//! Typed requests parsed from client frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EmberError, Result};

/// Operation codes carried in the first byte of a request frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Get = 0x01,
    Set = 0x02,
    Auth = 0x03,
    Ping = 0x04,
}

impl OpCode {
    /// Map a wire byte to an opcode
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(OpCode::Get),
            0x02 => Some(OpCode::Set),
            0x03 => Some(OpCode::Auth),
            0x04 => Some(OpCode::Ping),
            _ => None,
        }
    }
}

/// GET payload: `{"key": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetRequest {
    pub key: String,
}

/// SET payload: `{"key": "...", "value": <any JSON>}`
///
/// `value` must be present; a JSON `null` value is the tombstone form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
}

/// AUTH payload: `{"username": "...", "password": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// A parsed request
#[derive(Debug, Clone)]
pub enum Request {
    /// Get a value by key
    Get(GetRequest),

    /// Set a key to a value
    Set(SetRequest),

    /// Authenticate the connection
    Auth(AuthRequest),

    /// Ping (health check)
    Ping,
}

impl Request {
    /// Get the request opcode
    pub fn op_code(&self) -> OpCode {
        match self {
            Request::Get(_) => OpCode::Get,
            Request::Set(_) => OpCode::Set,
            Request::Auth(_) => OpCode::Auth,
            Request::Ping => OpCode::Ping,
        }
    }

    /// Parse a raw payload into a typed request.
    ///
    /// Shape problems (bad JSON, missing or unknown fields) come back as
    /// `EmberError::Request`, which a connection answers without closing.
    /// Framing problems never reach this far.
    pub fn parse(op: OpCode, payload: &[u8]) -> Result<Self> {
        match op {
            OpCode::Get => {
                let body: GetRequest = serde_json::from_slice(payload)
                    .map_err(|e| EmberError::Request(format!("GET request: {}", e)))?;
                Ok(Request::Get(body))
            }
            OpCode::Set => {
                let body: SetRequest = serde_json::from_slice(payload)
                    .map_err(|e| EmberError::Request(format!("SET request: {}", e)))?;
                Ok(Request::Set(body))
            }
            OpCode::Auth => {
                let body: AuthRequest = serde_json::from_slice(payload)
                    .map_err(|e| EmberError::Request(format!("AUTH request: {}", e)))?;
                Ok(Request::Auth(body))
            }
            OpCode::Ping => {
                if !payload.is_empty() {
                    return Err(EmberError::Request(format!(
                        "PING request: unexpected payload of {} bytes",
                        payload.len()
                    )));
                }
                Ok(Request::Ping)
            }
        }
    }
}
