//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A response envelope to send to the client
///
/// `value` and `message` are omitted from the wire form when absent, so a
/// bare success serializes as `{"success":true}` while a GET for a missing
/// key serializes as `{"success":true,"value":null}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request succeeded
    pub success: bool,

    /// Value for GET responses (JSON `null` when the key is absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Human-readable status or error text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    /// Create a bare success response
    pub fn ok() -> Self {
        Self {
            success: true,
            value: None,
            message: None,
        }
    }

    /// Create a success response carrying a value
    pub fn with_value(value: Value) -> Self {
        Self {
            success: true,
            value: Some(value),
            message: None,
        }
    }

    /// Create a failure response with a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            message: Some(message.into()),
        }
    }
}
