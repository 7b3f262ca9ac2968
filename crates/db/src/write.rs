//! Write path: `put()`, `delete()`, `flush()`, and the internal flush
//! chunking shared with [`crate::compaction`].

use crate::{Db, DbError};
use memtable::EntryValue;
use sstable::SegmentBuilder;

impl Db {
    /// Inserts a key-value pair, overwriting any prior value or tombstone
    /// for `key`.
    ///
    /// If `key` is not already present in the memtable and the memtable is
    /// at capacity (`max_inmemory_size` distinct keys), the memtable is
    /// flushed to new segment(s) first, then `key` is inserted into the
    /// now-empty memtable. Overwriting a tombstone resurrects the key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::EmptyKey`] if `key` is empty, or [`DbError::Io`]
    /// if an overflow-triggered flush fails.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), DbError> {
        if key.is_empty() {
            return Err(DbError::EmptyKey);
        }
        self.admit(key, EntryValue::Live(value))
    }

    /// Deletes `key`, recording a tombstone.
    ///
    /// The key must be visible (a live value, anywhere in the memtable or
    /// segment set) or this fails with [`DbError::KeyNotFound`] — deleting a
    /// key that is already absent, or already a tombstone, is rejected
    /// rather than silently succeeding.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::EmptyKey`] if `key` is empty, [`DbError::KeyNotFound`]
    /// if the key is not currently visible, or [`DbError::Io`] if an
    /// overflow-triggered flush fails.
    pub fn delete(&mut self, key: Vec<u8>) -> Result<(), DbError> {
        if key.is_empty() {
            return Err(DbError::EmptyKey);
        }
        match self.lookup(&key)? {
            crate::read::Lookup::Live(_) => self.admit(key, EntryValue::Tombstone),
            crate::read::Lookup::Tombstone | crate::read::Lookup::Missing => {
                Err(DbError::KeyNotFound)
            }
        }
    }

    /// Inserts `value` for `key`, applying the overflow-then-flush
    /// discipline shared by `put` and `delete`. Assumes `key` is non-empty.
    fn admit(&mut self, key: Vec<u8>, value: EntryValue) -> Result<(), DbError> {
        if !self.mem.contains_key(&key) && self.mem.len() >= self.config.max_inmemory_size {
            self.flush()?;
        }
        match value {
            EntryValue::Live(v) => self.mem.put(key, v),
            EntryValue::Tombstone => self.mem.put_tombstone(key),
        }
        Ok(())
    }

    /// Force-writes the current memtable contents into one or more new
    /// segments, even if `max_inmemory_size` has not been reached.
    ///
    /// A no-op if the memtable is empty: no empty segment file is created,
    /// and calling `flush()` twice in a row with no intervening writes is a
    /// no-op the second time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] on segment-file creation or write failure.
    pub fn flush(&mut self) -> Result<(), DbError> {
        if self.mem.is_empty() {
            return Ok(());
        }

        let entries: Vec<(Vec<u8>, EntryValue)> = self
            .mem
            .iter_sorted()
            .map(|(k, v)| (k.to_vec(), v.clone()))
            .collect();

        let new_segments = self.write_chunks(entries.into_iter())?;
        // New segments originate from one memtable snapshot and never
        // overlap in keys, so their relative order is immaterial — they
        // are all "newest" as a group.
        self.segments.splice(0..0, new_segments);
        self.mem.clear();

        if self.segments.len() >= self.config.merge_threshold {
            self.compact()?;
        }
        Ok(())
    }

    /// Chunks a sorted, deduplicated entry stream into `segment_size`-sized
    /// groups and writes each group out as a new sealed [`sstable::Segment`].
    ///
    /// Shared by [`flush`](Db::flush) (source: the memtable) and
    /// [`compact`](crate::compaction) (source: the k-way merge of the
    /// existing segment set).
    pub(crate) fn write_chunks(
        &mut self,
        entries: impl Iterator<Item = (Vec<u8>, EntryValue)>,
    ) -> Result<Vec<sstable::Segment>, DbError> {
        let mut out = Vec::new();
        let mut chunk: Vec<(Vec<u8>, EntryValue)> = Vec::with_capacity(self.config.segment_size);

        for pair in entries {
            chunk.push(pair);
            if chunk.len() == self.config.segment_size {
                out.push(self.build_segment(std::mem::take(&mut chunk))?);
            }
        }
        if !chunk.is_empty() {
            out.push(self.build_segment(chunk)?);
        }
        Ok(out)
    }

    fn build_segment(
        &mut self,
        chunk: Vec<(Vec<u8>, EntryValue)>,
    ) -> Result<sstable::Segment, DbError> {
        let mut builder = if self.config.persist_segments {
            std::fs::create_dir_all(&self.config.path)?;
            let path = self.next_segment_path();
            SegmentBuilder::new_persistent(path, self.config.sparse_offset)?
        } else {
            SegmentBuilder::new_ephemeral(self.config.sparse_offset)?
        };
        for (key, value) in &chunk {
            builder.add_entry(key, value)?;
        }
        Ok(builder.finish()?)
    }
}
