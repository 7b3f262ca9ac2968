//! Read path: `get()`, `contains()`, `len()`, and the shared `lookup()`
//! helper that both `get` and `delete` (in [`crate::write`]) drive their
//! decisions from.

use crate::{Db, DbError};
use memtable::EntryValue;
use sstable::SearchOutcome;
use std::collections::HashSet;

/// The three-way outcome of searching the memtable and segment set for a
/// key, replacing the teacher's pattern of a generic exception shared by
/// "not found" and "deleted" with a tagged result the façade can match on.
pub(crate) enum Lookup {
    Live(Vec<u8>),
    Tombstone,
    Missing,
}

impl Db {
    /// Looks up `key`, checking the memtable first and then every segment
    /// from newest to oldest. A tombstone — wherever it is found — stops
    /// the search immediately; older segments are never consulted once a
    /// tombstone or a value has been seen.
    pub(crate) fn lookup(&self, key: &[u8]) -> Result<Lookup, DbError> {
        match self.mem.get_entry(key) {
            Some(EntryValue::Live(v)) => return Ok(Lookup::Live(v.clone())),
            Some(EntryValue::Tombstone) => return Ok(Lookup::Tombstone),
            None => {}
        }

        for segment in &self.segments {
            match segment.search(key)? {
                SearchOutcome::Found(v) => return Ok(Lookup::Live(v)),
                SearchOutcome::Tombstone => return Ok(Lookup::Tombstone),
                SearchOutcome::NotFound => continue,
            }
        }

        Ok(Lookup::Missing)
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::KeyDeleted`] if the newest visible record for
    /// `key` is a tombstone, or [`DbError::KeyNotFound`] if `key` has no
    /// record anywhere in the memtable or segment set.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>, DbError> {
        match self.lookup(key)? {
            Lookup::Live(v) => Ok(v),
            Lookup::Tombstone => Err(DbError::KeyDeleted),
            Lookup::Missing => Err(DbError::KeyNotFound),
        }
    }

    /// Returns `true` iff [`get`](Db::get) would return a value. A tombstone
    /// or a missing key both yield `false` without raising — but a genuine
    /// I/O failure while scanning a segment is not a "not visible" outcome
    /// and is propagated rather than reported as absence.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if a segment scan fails.
    pub fn contains(&self, key: &[u8]) -> Result<bool, DbError> {
        match self.lookup(key)? {
            Lookup::Live(_) => Ok(true),
            Lookup::Tombstone | Lookup::Missing => Ok(false),
        }
    }

    /// Returns the number of distinct keys currently visible across the
    /// memtable and the segment set, with shadowing and tombstones applied.
    ///
    /// Implemented as a merge-style traversal: the memtable is freshest, so
    /// its keys are recorded first, then each segment (newest to oldest)
    /// contributes only keys not already seen. This is O(total entries) —
    /// the spec notes a persistent counter would be a reasonable
    /// optimization but does not require one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if a segment scan fails.
    pub fn len(&self) -> Result<usize, DbError> {
        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let mut count = 0usize;

        for (key, value) in self.mem.iter_sorted() {
            seen.insert(key.to_vec());
            if !value.is_tombstone() {
                count += 1;
            }
        }

        for segment in &self.segments {
            for entry in segment.scan()? {
                let (key, value) = entry?;
                if seen.contains(&key) {
                    continue;
                }
                let is_live = !value.is_tombstone();
                seen.insert(key);
                if is_live {
                    count += 1;
                }
            }
        }

        Ok(count)
    }
}
