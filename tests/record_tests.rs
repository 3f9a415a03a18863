//! Tests for the record codec
//!
//! These tests verify:
//! - Frame layout: u32 LE length prefix + compact JSON payload
//! - Round trips across every JSON value shape
//! - Tombstone construction and detection
//! - Decode failures on malformed payloads

use embercask::record::{Record, FRAME_HEADER_SIZE};
use embercask::EmberError;
use serde_json::{json, Value};

// =============================================================================
// Frame Layout Tests
// =============================================================================

#[test]
fn test_encode_exact_frame_bytes() {
    let record = Record::new("5", json!(5));
    let frame = record.encode().unwrap();

    // 15-byte payload: {"k":"5","v":5}
    assert_eq!(&frame[..FRAME_HEADER_SIZE], &[15, 0, 0, 0]);
    assert_eq!(&frame[FRAME_HEADER_SIZE..], br#"{"k":"5","v":5}"#);
    assert_eq!(frame.len(), 19);
}

#[test]
fn test_length_prefix_counts_payload_only() {
    let record = Record::new("0", json!("abcd"));
    let frame = record.encode().unwrap();

    let declared = u32::from_le_bytes(frame[..4].try_into().unwrap()) as usize;
    assert_eq!(declared, frame.len() - FRAME_HEADER_SIZE);
    assert_eq!(declared, 20); // {"k":"0","v":"abcd"}
}

#[test]
fn test_key_precedes_value_in_payload() {
    let record = Record::new("a", json!(true));
    let frame = record.encode().unwrap();
    let payload = std::str::from_utf8(&frame[FRAME_HEADER_SIZE..]).unwrap();
    assert!(payload.starts_with(r#"{"k":"#));
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_value_shapes() {
    let values = vec![
        json!("plain string"),
        json!(42),
        json!(-17.25),
        json!(true),
        json!(false),
        json!(["a", 1, null]),
        json!({"nested": {"deep": [1, 2, 3]}, "flag": false}),
    ];

    for value in values {
        let record = Record::new("key", value.clone());
        let frame = record.encode().unwrap();
        let decoded = Record::decode(&frame[FRAME_HEADER_SIZE..]).unwrap();
        assert_eq!(decoded.key, "key");
        assert_eq!(decoded.value, value);
    }
}

#[test]
fn test_round_trip_unicode_key() {
    let record = Record::new("clé-日本語", json!("värde"));
    let frame = record.encode().unwrap();

    // The prefix counts UTF-8 bytes, not characters
    let declared = u32::from_le_bytes(frame[..4].try_into().unwrap()) as usize;
    assert_eq!(declared, frame.len() - FRAME_HEADER_SIZE);

    let decoded = Record::decode(&frame[FRAME_HEADER_SIZE..]).unwrap();
    assert_eq!(decoded.key, "clé-日本語");
    assert_eq!(decoded.value, json!("värde"));
}

// =============================================================================
// Tombstone Tests
// =============================================================================

#[test]
fn test_tombstone_construction() {
    let tombstone = Record::tombstone("gone");
    assert!(tombstone.is_tombstone());
    assert_eq!(tombstone.key, "gone");
    assert_eq!(tombstone.value, Value::Null);
}

#[test]
fn test_tombstone_wire_form() {
    let frame = Record::tombstone("x").encode().unwrap();
    assert_eq!(&frame[FRAME_HEADER_SIZE..], br#"{"k":"x","v":null}"#);
}

#[test]
fn test_live_record_is_not_tombstone() {
    assert!(!Record::new("x", json!(0)).is_tombstone());
    assert!(!Record::new("x", json!("")).is_tombstone());
    assert!(!Record::new("x", json!(false)).is_tombstone());
}

// =============================================================================
// Decode Failure Tests
// =============================================================================

#[test]
fn test_decode_rejects_invalid_json() {
    let result = Record::decode(b"{not json");
    assert!(matches!(result, Err(EmberError::Decoding(_))));
}

#[test]
fn test_decode_rejects_missing_fields() {
    assert!(Record::decode(br#"{"k":"only-key"}"#).is_err());
    assert!(Record::decode(br#"{"v":"only-value"}"#).is_err());
    assert!(Record::decode(br#"{}"#).is_err());
}

#[test]
fn test_decode_rejects_trailing_garbage() {
    let result = Record::decode(br#"{"k":"a","v":1}garbage"#);
    assert!(matches!(result, Err(EmberError::Decoding(_))));
}

#[test]
fn test_decode_rejects_wrong_key_type() {
    let result = Record::decode(br#"{"k":42,"v":1}"#);
    assert!(matches!(result, Err(EmberError::Decoding(_))));
}
