//! # db
//!
//! The central orchestrator that ties together the [`memtable`] and
//! [`sstable`] crates into a complete LSM-tree key-value store.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                     DB                        │
//! │                                               │
//! │ write.rs → Memtable insert                    │
//! │              |                                │
//! │              |  (max_inmemory_size exceeded?) │
//! │              |            yes                 │
//! │              v                                │
//! │           flush() → new segment(s)            │
//! │              |                                │
//! │              |  (segment_count >= threshold?) │
//! │              |            yes                 │
//! │              v                                │
//! │           compact() → merged segment set      │
//! │                                               │
//! │ read.rs → Memtable → segments, newest-first   │
//! │            (first match wins)                 │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module responsibilities
//!
//! | Module | Purpose |
//! |---|---|
//! | [`lib.rs`] | `Db` struct, constructor, accessors, `Debug`, `Drop` |
//! | [`recovery`] | Cold-start directory scan and segment-set reconstruction |
//! | [`write`] | `put()`, `delete()`, `flush()`, internal flush chunking |
//! | [`read`] | `get()`, `contains()`, `len()` |
//! | [`compaction`] | `compact()`: k-way merge + tombstone GC |
//!
//! ## No write-ahead log
//!
//! Unlike the teacher's `engine` crate, `Db` does not append to a WAL before
//! mutating the memtable — durability comes solely from `flush()` writing
//! segment files. A crash before `flush()` loses all memtable writes; this
//! is intentional (see the crate's `DESIGN.md`), not an oversight.
mod compaction;
mod error;
mod read;
mod recovery;
mod write;

pub use error::DbError;

use config::DbConfig;
use memtable::Memtable;
use sstable::Segment;

/// The central storage engine orchestrating the memtable and the segment
/// set.
///
/// # Write path
///
/// 1. If the memtable already holds `key`, overwrite it in place.
/// 2. Otherwise, if the memtable holds `max_inmemory_size` distinct keys,
///    flush it to one or more new segments first.
/// 3. Insert `key` into the (now certainly non-full) memtable.
///
/// # Read path
///
/// 1. Check the memtable (freshest data, tombstones included).
/// 2. Check segments from newest to oldest; the sparse index bounds each
///    segment's scan window.
/// 3. First match wins; a tombstone anywhere stops the search.
///
/// # Cold start
///
/// On construction ([`Db::open`]), existing `.dat` files under
/// `config.path` are loaded back into the segment set, newest-first, and
/// each segment's sparse index is rebuilt by scanning its file.
pub struct Db {
    pub(crate) mem: Memtable,
    /// Segments, ordered newest-first. No levels: every segment
    /// participates in every compaction.
    pub(crate) segments: Vec<Segment>,
    pub(crate) config: DbConfig,
    /// Monotonic counter used to mint unique, sortable segment filenames.
    pub(crate) next_segment_id: u64,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("memtable_entries", &self.mem.len())
            .field("segment_count", &self.segments.len())
            .field("max_inmemory_size", &self.config.max_inmemory_size)
            .field("segment_size", &self.config.segment_size)
            .field("merge_threshold", &self.config.merge_threshold)
            .field("persist_segments", &self.config.persist_segments)
            .field("path", &self.config.path)
            .finish()
    }
}

impl Db {
    /// Opens (or creates) a database at `config.path`, replaying any
    /// existing segment files into a fresh segment set.
    ///
    /// If `config.persist_segments` is `false`, no directory is scanned and
    /// the database starts empty — segments created during this session
    /// will still be real, scoped-open files, they simply aren't expected
    /// to already exist from a prior run.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the directory cannot be created or
    /// enumerated, or if an existing segment file is corrupt.
    pub fn open(config: DbConfig) -> Result<Self, DbError> {
        let (segments, next_segment_id) = recovery::load_segment_set(&config)?;
        Ok(Self {
            mem: Memtable::new(),
            segments,
            config,
            next_segment_id,
        })
    }

    /// Returns the number of segments currently in the segment set.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the configuration this database was opened with.
    #[must_use]
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub(crate) fn next_segment_path(&mut self) -> std::path::PathBuf {
        let name = recovery::segment_filename(self.next_segment_id);
        self.next_segment_id += 1;
        self.config.path.join(name)
    }
}

/// Best-effort flush on drop: if the process exits normally with data still
/// buffered in the memtable, persist it rather than silently discarding it.
/// This does not contradict the "no WAL" design — it only covers the
/// graceful-shutdown path, not a crash, which is exactly the case §9 of the
/// spec documents as lossy by design.
impl Drop for Db {
    fn drop(&mut self) {
        if !self.mem.is_empty() {
            let _ = self.flush();
        }
    }
}

#[cfg(test)]
mod tests;
