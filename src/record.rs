//! Record codec
//!
//! Defines the key-value record and its on-disk frame format.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────┬──────────────────────────────────────┐
//! │ length (4)   │ payload (length bytes)               │
//! │ u32 LE       │ UTF-8 JSON: {"k": <key>, "v": <val>} │
//! └──────────────┴──────────────────────────────────────┘
//! ```
//!
//! `length` counts the payload only, never the 4-byte header. A record is
//! immutable once written; a later frame for the same key supersedes it
//! logically but never rewrites it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EmberError, Result};

/// Size of the length prefix preceding every payload
pub const FRAME_HEADER_SIZE: usize = 4;

/// A single key-value record in a segment file
///
/// Serializes to the compact JSON object `{"k":...,"v":...}`. A `null`
/// value marks the record as a tombstone (the key was deleted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The logical key
    #[serde(rename = "k")]
    pub key: String,

    /// The stored value; `Value::Null` is the tombstone sentinel
    #[serde(rename = "v")]
    pub value: Value,
}

impl Record {
    /// Create a record for a live value
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Create a tombstone record marking `key` as deleted
    pub fn tombstone(key: impl Into<String>) -> Self {
        Self::new(key, Value::Null)
    }

    /// Whether this record marks its key as deleted
    pub fn is_tombstone(&self) -> bool {
        self.value.is_null()
    }

    /// Encode this record into a complete frame: length prefix + payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload =
            serde_json::to_vec(self).map_err(|e| EmberError::Encoding(e.to_string()))?;

        // The length prefix is a u32; anything larger cannot be framed.
        if payload.len() > u32::MAX as usize {
            return Err(EmberError::Encoding(format!(
                "payload of {} bytes exceeds the u32 length prefix",
                payload.len()
            )));
        }

        let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode a record from a frame payload (the bytes after the header)
    pub fn decode(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| EmberError::Decoding(e.to_string()))
    }
}
