//! Tests for the wire protocol
//!
//! These tests verify:
//! - Exact request frame layout (opcode byte, big-endian length, payload)
//! - Request and response round trips through the codec
//! - Response envelope JSON shapes, including null-value handling
//! - Payload parsing rejects malformed shapes
//! - Framing errors for unknown opcodes, oversized and truncated frames

use std::io::Cursor;

use serde_json::{json, Value};

use embercask::error::EmberError;
use embercask::protocol::{
    encode_request, encode_response, read_request, read_response, write_request, AuthRequest,
    GetRequest, OpCode, Request, Response, SetRequest, MAX_PAYLOAD_SIZE, REQUEST_HEADER_SIZE,
};

// =============================================================================
// Frame Layout
// =============================================================================

#[test]
fn test_get_request_frame_bytes() {
    let request = Request::Get(GetRequest {
        key: "k".to_string(),
    });
    let frame = encode_request(&request).unwrap();

    let payload = br#"{"key":"k"}"#;
    assert_eq!(frame[0], 0x01);
    assert_eq!(&frame[1..5], &(payload.len() as u32).to_be_bytes());
    assert_eq!(&frame[REQUEST_HEADER_SIZE..], payload);
}

#[test]
fn test_ping_request_is_header_only() {
    let frame = encode_request(&Request::Ping).unwrap();
    assert_eq!(frame, vec![0x04, 0, 0, 0, 0]);
}

#[test]
fn test_opcode_byte_values() {
    assert_eq!(OpCode::Get as u8, 0x01);
    assert_eq!(OpCode::Set as u8, 0x02);
    assert_eq!(OpCode::Auth as u8, 0x03);
    assert_eq!(OpCode::Ping as u8, 0x04);

    assert_eq!(OpCode::from_byte(0x02), Some(OpCode::Set));
    assert_eq!(OpCode::from_byte(0x00), None);
    assert_eq!(OpCode::from_byte(0xFF), None);
}

// =============================================================================
// Request Round Trips
// =============================================================================

#[test]
fn test_request_round_trip_all_operations() {
    let requests = vec![
        Request::Get(GetRequest {
            key: "user:1".to_string(),
        }),
        Request::Set(SetRequest {
            key: "user:1".to_string(),
            value: json!({"name": "ada", "age": 36}),
        }),
        Request::Auth(AuthRequest {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        }),
        Request::Ping,
    ];

    for original in requests {
        let mut wire = Vec::new();
        write_request(&mut wire, &original).unwrap();

        let mut cursor = Cursor::new(wire);
        let (op, payload) = read_request(&mut cursor).unwrap();
        assert_eq!(op, original.op_code());

        let parsed = Request::parse(op, &payload).unwrap();
        match (&original, &parsed) {
            (Request::Get(a), Request::Get(b)) => assert_eq!(a.key, b.key),
            (Request::Set(a), Request::Set(b)) => {
                assert_eq!(a.key, b.key);
                assert_eq!(a.value, b.value);
            }
            (Request::Auth(a), Request::Auth(b)) => {
                assert_eq!(a.username, b.username);
                assert_eq!(a.password, b.password);
            }
            (Request::Ping, Request::Ping) => {}
            (a, b) => panic!("round trip changed variant: {:?} -> {:?}", a, b),
        }
    }
}

// =============================================================================
// Response Round Trips
// =============================================================================

#[test]
fn test_response_round_trip() {
    let responses = vec![
        Response::ok(),
        Response::with_value(json!({"n": 1})),
        Response::failure("broken"),
    ];

    for original in responses {
        let wire = encode_response(&original).unwrap();
        let mut cursor = Cursor::new(wire);
        let decoded = read_response(&mut cursor).unwrap();

        assert_eq!(decoded.success, original.success);
        assert_eq!(decoded.value, original.value);
        assert_eq!(decoded.message, original.message);
    }
}

#[test]
fn test_null_value_decodes_as_absent() {
    // serde maps a JSON null onto Option::None, so a carried null and an
    // omitted field are indistinguishable after decoding. Callers treat
    // both as "no value".
    let wire = encode_response(&Response::with_value(Value::Null)).unwrap();
    let mut cursor = Cursor::new(wire);
    let decoded = read_response(&mut cursor).unwrap();

    assert!(decoded.success);
    assert_eq!(decoded.value, None);
}

#[test]
fn test_response_envelope_json_shapes() {
    let wire = encode_response(&Response::ok()).unwrap();
    assert_eq!(&wire[4..], br#"{"success":true}"#);

    let wire = encode_response(&Response::with_value(Value::Null)).unwrap();
    assert_eq!(&wire[4..], br#"{"success":true,"value":null}"#);

    let wire = encode_response(&Response::failure("broken")).unwrap();
    assert_eq!(&wire[4..], br#"{"success":false,"message":"broken"}"#);
}

// =============================================================================
// Payload Parsing
// =============================================================================

#[test]
fn test_parse_rejects_unknown_fields() {
    let err = Request::parse(OpCode::Get, br#"{"key":"k","bogus":1}"#).unwrap_err();
    assert!(matches!(err, EmberError::Request(_)));
}

#[test]
fn test_parse_rejects_missing_set_value() {
    let err = Request::parse(OpCode::Set, br#"{"key":"k"}"#).unwrap_err();
    assert!(matches!(err, EmberError::Request(_)));
}

#[test]
fn test_parse_allows_explicit_null_set_value() {
    let request = Request::parse(OpCode::Set, br#"{"key":"k","value":null}"#).unwrap();
    match request {
        Request::Set(body) => assert_eq!(body.value, Value::Null),
        other => panic!("expected Set, got {:?}", other),
    }
}

#[test]
fn test_parse_rejects_non_string_key() {
    let err = Request::parse(OpCode::Get, br#"{"key":42}"#).unwrap_err();
    assert!(matches!(err, EmberError::Request(_)));
}

#[test]
fn test_parse_rejects_ping_payload() {
    let err = Request::parse(OpCode::Ping, b"x").unwrap_err();
    assert!(matches!(err, EmberError::Request(_)));
}

#[test]
fn test_parse_rejects_invalid_json() {
    let err = Request::parse(OpCode::Auth, b"not json").unwrap_err();
    assert!(matches!(err, EmberError::Request(_)));
}

// =============================================================================
// Framing Errors
// =============================================================================

#[test]
fn test_unknown_opcode_is_protocol_error() {
    let mut cursor = Cursor::new(vec![0x7F, 0, 0, 0, 0]);
    let err = read_request(&mut cursor).unwrap_err();
    assert!(matches!(err, EmberError::Protocol(_)));
}

#[test]
fn test_oversized_payload_is_protocol_error() {
    let mut frame = vec![0x01];
    frame.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());

    let mut cursor = Cursor::new(frame);
    let err = read_request(&mut cursor).unwrap_err();
    assert!(matches!(err, EmberError::Protocol(_)));
}

#[test]
fn test_truncated_header_is_io_error() {
    let mut cursor = Cursor::new(vec![0x01, 0, 0]);
    let err = read_request(&mut cursor).unwrap_err();
    match err {
        EmberError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected Io, got {:?}", other),
    }
}

#[test]
fn test_truncated_payload_is_io_error() {
    // Header declares 11 payload bytes, only 4 follow.
    let mut frame = vec![0x01, 0, 0, 0, 11];
    frame.extend_from_slice(b"{\"ke");

    let mut cursor = Cursor::new(frame);
    let err = read_request(&mut cursor).unwrap_err();
    match err {
        EmberError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected Io, got {:?}", other),
    }
}
