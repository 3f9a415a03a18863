//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Startup: ensure the data directory, select the active segment,
//!   rebuild the memory index from a full scan
//! - Serve get/set/delete against the index and segment file
//! - Serialize appends so offsets never overlap
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader
//!
//! - **Writes** (set/delete): serialized by the writer mutex. Offset
//!   determination and the append are one critical section, and the index
//!   entry is stored before the lock is released, so index order always
//!   matches file order.
//! - **Reads** (get): never take the writer mutex. Bytes below the current
//!   file size are immutable once written, so `read_at` opens its own
//!   descriptor and proceeds concurrently with an append extending the
//!   tail. The index lookup rides its internal read lock.
//!
//! A returned engine is the readiness signal: `open` only hands one back
//! after the directory, segment, and index are all in place.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::index::MemoryIndex;
use crate::record::Record;
use crate::segment::{SegmentReader, SegmentWriter, SEGMENT_EXTENSION};

/// The main storage engine
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Path of the active segment file
    segment_path: PathBuf,

    /// Serialized tail appender (exclusive access, one append in flight)
    writer: Mutex<SegmentWriter>,

    /// Chunked frame reader (stateless; each read opens its own handle)
    reader: SegmentReader,

    /// Key -> latest offset (internal RwLock for concurrent readers)
    index: MemoryIndex,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const INITIAL_SEGMENT_FILENAME: &'static str = "0.seg";

    /// Open or create an engine with the given config.
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Select the active segment file (create `0.seg` when none exist)
    /// 3. Scan it to rebuild the memory index
    /// 4. Ready to serve requests
    ///
    /// Any failure here is fatal to the instance: no partially-ready
    /// engine is ever returned.
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Ensure the data directory exists
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Select or create the active segment
        tracing::info!("Startup: Initializing segment file");
        let segment_path = Self::select_segment(&config.data_dir)?;
        tracing::debug!("Active segment: {}", segment_path.display());

        // Step 3: Rebuild the index from a full scan
        tracing::info!("Startup: Building the index");
        let reader = SegmentReader::new(config.read_buffer_size);
        let pairs = reader.scan(&segment_path)?;

        let index = MemoryIndex::new();
        index.clear();
        index.set_all(pairs);
        tracing::info!("Index built: {} keys", index.len());

        let writer = SegmentWriter::open(&segment_path, config.sync_writes)?;

        Ok(Self {
            config,
            segment_path,
            writer: Mutex::new(writer),
            reader,
            index,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Pick the active segment file in `data_dir`.
    ///
    /// No segment files: create a fresh, empty `0.seg`. Exactly one: use
    /// it. Several (artifacts of a past compaction): the most recently
    /// modified wins, with equal timestamps broken by the greatest file
    /// name so the choice stays deterministic.
    fn select_segment(data_dir: &Path) -> Result<PathBuf> {
        let mut candidates: Vec<(PathBuf, SystemTime)> = Vec::new();

        for entry in fs::read_dir(data_dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_segment = path.is_file()
                && path
                    .extension()
                    .map(|ext| ext == SEGMENT_EXTENSION)
                    .unwrap_or(false);
            if is_segment {
                let modified = entry.metadata()?.modified()?;
                candidates.push((path, modified));
            }
        }

        if candidates.is_empty() {
            let path = data_dir.join(Self::INITIAL_SEGMENT_FILENAME);
            fs::write(&path, b"")?;
            tracing::debug!("Created fresh segment {}", path.display());
            return Ok(path);
        }

        candidates.sort_by(|(a_path, a_time), (b_path, b_time)| {
            a_time.cmp(b_time).then_with(|| a_path.cmp(b_path))
        });

        // Ascending sort, so the newest (greatest name on ties) is last.
        let (path, _) = candidates.pop().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no segment candidates")
        })?;
        Ok(path)
    }

    // =========================================================================
    // Runtime Operations
    // =========================================================================

    /// Persist a value for a key.
    ///
    /// The append and the index update happen under the writer lock, so
    /// concurrent `set` calls get distinct, non-overlapping offsets and
    /// the index never points at a frame that wasn't appended. If the
    /// append fails, the index is left untouched and the error propagates.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let record = Record::new(key, value);

        let mut writer = self.writer.lock();
        let offset = writer.append(&record)?;
        self.index.set(record.key, offset);

        Ok(())
    }

    /// Retrieve the latest value for a key.
    ///
    /// A key absent from the index returns `None` without touching the
    /// file. A key whose latest record is a tombstone also returns `None`:
    /// deleted and never-written are observably identical here, and the
    /// key keeps its index entry until compaction rewrites the live set.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let offset = match self.index.get(key) {
            Some(offset) => offset,
            None => return Ok(None),
        };

        let record = self.reader.read_at(&self.segment_path, offset)?;
        if record.is_tombstone() {
            Ok(None)
        } else {
            Ok(Some(record.value))
        }
    }

    /// Delete a key by appending a tombstone record.
    ///
    /// The key's earlier entries stay in the segment file; only compaction
    /// reclaims that space.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.set(key, Value::Null)
    }

    /// Rewrite every live (non-tombstone) record into a fresh segment and
    /// return its path.
    ///
    /// Appends are frozen for the duration so the rewrite sees a stable
    /// index. The engine keeps serving from the active segment afterwards;
    /// switching over to the compacted file and reclaiming the old one is
    /// a separate, future step.
    pub fn compact(&self) -> Result<PathBuf> {
        let _writer = self.writer.lock();

        let target = self.next_segment_path()?;
        fs::write(&target, b"")?;
        let mut compacted = SegmentWriter::open(&target, self.config.sync_writes)?;

        let mut live = 0usize;
        for (_, offset) in self.index.entries() {
            let record = self.reader.read_at(&self.segment_path, offset)?;
            if record.is_tombstone() {
                continue;
            }
            compacted.append(&record)?;
            live += 1;
        }
        compacted.sync()?;

        tracing::info!("Compacted {} live records into {}", live, target.display());
        Ok(target)
    }

    /// Next unused numbered segment path in the data directory
    fn next_segment_path(&self) -> Result<PathBuf> {
        let mut max_id: Option<u64> = None;

        for entry in fs::read_dir(&self.config.data_dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_segment = path
                .extension()
                .map(|ext| ext == SEGMENT_EXTENSION)
                .unwrap_or(false);
            if !is_segment {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u64>().ok())
            {
                max_id = Some(max_id.map_or(id, |m| m.max(id)));
            }
        }

        let next = max_id.map_or(0, |m| m + 1);
        Ok(self
            .config
            .data_dir
            .join(format!("{}.{}", next, SEGMENT_EXTENSION)))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path of the active segment file
    pub fn segment_path(&self) -> &Path {
        &self.segment_path
    }

    /// Current size of the active segment in bytes
    pub fn segment_size(&self) -> u64 {
        self.writer.lock().size()
    }

    /// Number of keys in the memory index (tombstoned keys included)
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
