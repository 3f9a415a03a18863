//! Segment Reader
//!
//! Streams a segment file in fixed-size chunks and reassembles complete
//! frames, whatever the alignment between frame boundaries and chunk
//! boundaries. Both entry points share that discipline:
//!
//! - [`SegmentReader::read_at`] recovers exactly one record from a known
//!   offset (the hot path behind `get`).
//! - [`SegmentReader::scan`] replays the whole file from offset 0 to
//!   rebuild the memory index (the startup path).
//!
//! The chunk size comes from configuration and affects I/O granularity
//! only: the `(key, offset)` sequence produced by `scan` is identical for
//! every chunk size.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use bytes::{Buf, BytesMut};

use crate::error::{EmberError, Result};
use crate::record::{Record, FRAME_HEADER_SIZE};

/// Reads frames out of a segment file in configurable chunks
#[derive(Debug, Clone, Copy)]
pub struct SegmentReader {
    /// How many bytes each read syscall asks for
    chunk_size: usize,
}

impl SegmentReader {
    /// Create a reader that streams in `chunk_size`-byte chunks.
    ///
    /// Config validation enforces a floor of 16 bytes; anything non-zero
    /// works here, it just changes how often the OS is asked for bytes.
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self { chunk_size }
    }

    /// Read the single record whose frame starts at `offset`.
    ///
    /// Chunks are accumulated until the buffer holds the 4-byte length
    /// header and then the full payload it declares; the one frame is
    /// decoded and any surplus buffered bytes are discarded. Hitting end
    /// of file first means the offset does not point at a complete frame.
    pub fn read_at(&self, path: &Path, offset: u64) -> Result<Record> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = BytesMut::new();
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            if let Some(payload_len) = frame_payload_len(&buffer) {
                if buffer.len() >= FRAME_HEADER_SIZE + payload_len {
                    let payload = &buffer[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + payload_len];
                    return Record::decode(payload).map_err(|e| EmberError::CorruptRecord {
                        offset,
                        reason: e.to_string(),
                    });
                }
            }

            let n = file.read(&mut chunk)?;
            if n == 0 {
                return Err(EmberError::CorruptRecord {
                    offset,
                    reason: format!(
                        "segment ended after {} bytes, before the frame was complete",
                        buffer.len()
                    ),
                });
            }
            buffer.extend_from_slice(&chunk[..n]);
        }
    }

    /// Scan the whole segment from offset 0, yielding `(key, offset)` for
    /// every complete frame in file order.
    ///
    /// A carry-over buffer holds bytes whose frame has not finished
    /// arriving, and `consumed` tracks the absolute file offset of the
    /// buffer's first byte, so each frame's recorded offset is
    /// `consumed + position within the buffer`.
    ///
    /// An incomplete frame at the tail (a short header, or a declared
    /// length running past end of file) is the signature of an append
    /// interrupted by a crash. It is dropped silently and the scan
    /// succeeds with every frame before it. A frame that is complete but
    /// whose payload fails to decode is interior damage and surfaces as
    /// `CorruptRecord` with its offset.
    pub fn scan(&self, path: &Path) -> Result<Vec<(String, u64)>> {
        let mut file = File::open(path)?;

        let mut entries = Vec::new();
        let mut carry = BytesMut::new();
        let mut consumed: u64 = 0;
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let n = file.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            carry.extend_from_slice(&chunk[..n]);

            // Drain every complete frame the buffer now holds.
            let mut pos = 0usize;
            while let Some(payload_len) = frame_payload_len(&carry[pos..]) {
                let frame_len = FRAME_HEADER_SIZE + payload_len;
                if carry.len() - pos < frame_len {
                    break;
                }

                let frame_offset = consumed + pos as u64;
                let payload = &carry[pos + FRAME_HEADER_SIZE..pos + frame_len];
                let record =
                    Record::decode(payload).map_err(|e| EmberError::CorruptRecord {
                        offset: frame_offset,
                        reason: e.to_string(),
                    })?;

                entries.push((record.key, frame_offset));
                pos += frame_len;
            }

            // Keep only the unconsumed remainder and fold the consumed
            // amount into the absolute offset counter.
            carry.advance(pos);
            consumed += pos as u64;
        }

        if !carry.is_empty() {
            tracing::debug!(
                "dropping {} trailing bytes at offset {}: incomplete frame from an interrupted append",
                carry.len(),
                consumed
            );
        }

        Ok(entries)
    }

    /// The configured chunk size
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

/// Payload length declared by the frame at the start of `buffer`, or
/// `None` while fewer than 4 header bytes have arrived.
fn frame_payload_len(buffer: &[u8]) -> Option<usize> {
    if buffer.len() < FRAME_HEADER_SIZE {
        return None;
    }
    let header: [u8; FRAME_HEADER_SIZE] = buffer[..FRAME_HEADER_SIZE].try_into().unwrap();
    Some(u32::from_le_bytes(header) as usize)
}
