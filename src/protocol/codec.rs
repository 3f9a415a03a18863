//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Op (1)   │ Len (4)  │       JSON Payload          │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Operation
//! - GET:  `{"key": "..."}`
//! - SET:  `{"key": "...", "value": <any JSON>}`
//! - AUTH: `{"username": "...", "password": "..."}`
//! - PING: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │       JSON Envelope         │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! Length fields are big-endian u32 and count payload bytes only.

use std::io::{Read, Write};

use crate::error::{EmberError, Result};

use super::{OpCode, Request, Response};

/// Request header size: 1 byte opcode + 4 bytes payload length
pub const REQUEST_HEADER_SIZE: usize = 5;

/// Response header size: 4 bytes payload length
pub const RESPONSE_HEADER_SIZE: usize = 4;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: op (1) + payload_len (4) + JSON payload
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    let payload = match request {
        Request::Get(body) => serde_json::to_vec(body)
            .map_err(|e| EmberError::Encoding(format!("GET payload: {}", e)))?,
        Request::Set(body) => serde_json::to_vec(body)
            .map_err(|e| EmberError::Encoding(format!("SET payload: {}", e)))?,
        Request::Auth(body) => serde_json::to_vec(body)
            .map_err(|e| EmberError::Encoding(format!("AUTH payload: {}", e)))?,
        Request::Ping => Vec::new(),
    };

    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(EmberError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = Vec::with_capacity(REQUEST_HEADER_SIZE + payload.len());
    message.push(request.op_code() as u8);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(&payload);

    Ok(message)
}

/// Read one request frame from a stream.
///
/// Blocks until a complete frame arrives, then returns the opcode and the
/// raw payload bytes. Turning the payload into a typed request is a
/// separate step (`Request::parse`) so the two failure classes stay
/// distinct: an error from here (unknown opcode, oversized frame,
/// truncated stream) means the stream can no longer be trusted.
pub fn read_request<R: Read>(reader: &mut R) -> Result<(OpCode, Vec<u8>)> {
    // Read header first
    let mut header = [0u8; REQUEST_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let op = OpCode::from_byte(header[0])
        .ok_or_else(|| EmberError::Protocol(format!("Unknown operation: 0x{:02x}", header[0])))?;

    // Parse and validate payload length
    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(EmberError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    // Read payload
    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok((op, payload))
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response envelope to bytes
///
/// Format: payload_len (4) + JSON envelope
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(response)
        .map_err(|e| EmberError::Encoding(format!("response envelope: {}", e)))?;

    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(EmberError::Protocol(format!(
            "Response payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = Vec::with_capacity(RESPONSE_HEADER_SIZE + payload.len());
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(&payload);

    Ok(message)
}

/// Read a complete response from a stream
///
/// Blocks until a complete envelope is received or an error occurs
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    // Read header first
    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    // Parse and validate payload length
    let payload_len = u32::from_be_bytes(header) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(EmberError::Protocol(format!(
            "Response payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    // Read payload
    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    serde_json::from_slice(&payload)
        .map_err(|e| EmberError::Protocol(format!("Malformed response envelope: {}", e)))
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
