//! Segment Module
//!
//! The append-only log file holding every record, and the reader/writer
//! pair that move frames in and out of it.
//!
//! ## Responsibilities
//! - Append frames at the tail and report each frame's start offset
//! - Read exactly one frame back from a known offset
//! - Scan the whole file to recover `(key, offset)` pairs after a restart
//! - Reassemble frames whose bytes arrive split across read-buffer
//!   boundaries
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Frame 1 (offset 0)                      │
//! │ ┌──────────┬──────────────────────────┐ │
//! │ │ Len (4)  │ Payload (Len bytes)      │ │
//! │ └──────────┴──────────────────────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Frame 2 (offset 4 + Len₁)               │
//! │ ┌──────────┬──────────────────────────┐ │
//! │ │ Len (4)  │ Payload (Len bytes)      │ │
//! │ └──────────┴──────────────────────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The file is never truncated or rewritten in place while active. A later
//! frame for the same key supersedes earlier ones logically; nothing is
//! erased until compaction rewrites the live set into a fresh segment.

mod reader;
mod writer;

pub use reader::SegmentReader;
pub use writer::SegmentWriter;

/// File extension for segment files
pub const SEGMENT_EXTENSION: &str = "seg";
