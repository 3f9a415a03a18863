//! Segment Writer
//!
//! Appends frames to the tail of the segment file and reports the offset
//! at which each frame began.
//!
//! The writer owns the tail position: it stats the file once at open and
//! advances a counter per successful append, so offset determination and
//! the write itself form one step with no stat-then-write window. The
//! engine serializes access with a mutex, which makes each append atomic
//! with respect to every other append on the same segment.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{EmberError, Result};
use crate::record::Record;

/// Appends frames to a single segment file
pub struct SegmentWriter {
    /// Segment file path, for diagnostics
    path: PathBuf,

    /// File handle opened in append mode
    file: File,

    /// Tracked file size == the offset the next frame will start at
    size: u64,

    /// Whether to fsync after every append
    sync_writes: bool,

    /// Set when an append failed partway; the tracked size can no longer
    /// be trusted and must be re-stated before the next append.
    size_dirty: bool,
}

impl SegmentWriter {
    /// Open an existing segment file for appending.
    ///
    /// The engine creates segment files; opening a missing one is an I/O
    /// error rather than a silent create.
    pub fn open(path: &Path, sync_writes: bool) -> Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
            sync_writes,
            size_dirty: false,
        })
    }

    /// Append one record and return the offset its frame starts at.
    ///
    /// The frame is written with a single `write_all`; if that fails
    /// partway the append reports failure, the returned offset is never
    /// produced, and the tracked size is marked stale so the next append
    /// re-stats the file instead of trusting it.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        if self.size_dirty {
            self.size = self.file.metadata()?.len();
            self.size_dirty = false;
        }

        let frame = record.encode()?;
        let offset = self.size;

        if let Err(e) = self.file.write_all(&frame) {
            self.size_dirty = true;
            return Err(EmberError::WriteFailed(format!(
                "append of {} bytes at offset {} to {} failed: {}",
                frame.len(),
                offset,
                self.path.display(),
                e
            )));
        }

        // The bytes are in the file even if the sync below fails.
        self.size += frame.len() as u64;

        if self.sync_writes {
            self.file.sync_data()?;
        }

        tracing::trace!(
            "appended {} byte frame for key '{}' at offset {}",
            frame.len(),
            record.key,
            offset
        );

        Ok(offset)
    }

    /// Flush written frames to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    /// Current size of the segment == the offset of the next append
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Path of the segment being appended to
    pub fn path(&self) -> &Path {
        &self.path
    }
}
