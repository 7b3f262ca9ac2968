//! Compaction: merges the entire segment set into a fresh one of the same
//! visible semantics, dropping tombstones that no longer shadow anything.

use crate::{Db, DbError};
use memtable::EntryValue;
use sstable::MergeIterator;

impl Db {
    /// Merges every segment in the segment set into a new set of at most
    /// the same size, applying last-write-wins and garbage-collecting
    /// tombstones.
    ///
    /// All segments participate in every compaction in this design (there
    /// is no leveling), so a tombstone surviving the k-way merge can be
    /// dropped outright: there is no older segment left outside this
    /// compaction that it could still be shadowing. The memtable is not
    /// part of compaction and is read first regardless, so a dropped
    /// tombstone here cannot resurrect a key the memtable itself had
    /// deleted.
    ///
    /// A no-op if fewer than two segments exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] on a read failure during the merge or a
    /// write failure producing the replacement segments.
    pub(crate) fn compact(&mut self) -> Result<(), DbError> {
        if self.segments.len() < 2 {
            return Ok(());
        }

        let merged = MergeIterator::new(&self.segments)?;
        let merged: Vec<(Vec<u8>, EntryValue)> = merged.collect::<Result<Vec<_>, _>>()?;
        let live: Vec<(Vec<u8>, EntryValue)> = merged
            .into_iter()
            .filter(|(_, v)| !matches!(v, EntryValue::Tombstone))
            .collect();

        let old_paths: Vec<std::path::PathBuf> =
            self.segments.iter().map(|s| s.path().to_path_buf()).collect();

        let new_segments = self.write_chunks(live.into_iter())?;

        // Drop the old readers (releasing file handles) before unlinking
        // their backing files.
        self.segments = new_segments;
        if self.config.persist_segments {
            for path in old_paths {
                let _ = std::fs::remove_file(path);
            }
        }

        Ok(())
    }
}
