//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Length-Prefixed JSON)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Op (1)   │ Len (4)  │       JSON Payload          │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Operations
//! - 0x01: GET   - Payload: `{"key": "..."}`
//! - 0x02: SET   - Payload: `{"key": "...", "value": <any JSON>}`
//! - 0x03: AUTH  - Payload: `{"username": "...", "password": "..."}`
//! - 0x04: PING  - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │       JSON Envelope         │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! The envelope always carries `success`, plus `value` for GET results
//! and `message` for failures and status text.

mod request;
mod response;
mod codec;

pub use request::{AuthRequest, GetRequest, OpCode, Request, SetRequest};
pub use response::Response;
pub use codec::{
    encode_request, encode_response, read_request, read_response, write_request, write_response,
    MAX_PAYLOAD_SIZE, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
