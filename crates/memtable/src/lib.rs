//! # Memtable
//!
//! An in-memory, sorted, mutable write buffer for the RiptideKV storage engine.
//!
//! The memtable is the first point of contact for every write operation. It
//! buffers recent `PUT` and `DELETE` operations in a sorted structure
//! (`BTreeMap`) before they are flushed to immutable on-disk segments.
//!
//! ## Key properties
//! - **Sorted order**: entries are always in ascending key order (required
//!   for segment flush, which must append entries in non-decreasing key
//!   order).
//! - **Last write wins**: re-inserting a key overwrites the prior entry
//!   unconditionally — there is no sequence-number gating, since entries
//!   only ever originate from the calling thread in program order.
//! - **Tombstone support**: deletes are recorded as `EntryValue::Tombstone`
//!   markers and counted toward capacity like any other entry.
//!
//! ## Example
//! ```rust
//! use memtable::Memtable;
//!
//! let mut m = Memtable::new();
//! m.put(b"hello".to_vec(), b"world".to_vec());
//! assert_eq!(m.get(b"hello").unwrap(), b"world");
//!
//! m.put_tombstone(b"hello".to_vec());
//! assert!(m.get(b"hello").is_none());
//! ```

use std::collections::BTreeMap;

/// The payload half of a memtable entry: either a live value or a tombstone.
///
/// Replaces the teacher's sentinel-based `value: Option<Vec<u8>>` with an
/// explicit tagged variant per the redesign flagged for dynamic dispatch on
/// "entry kind" — the segment codec and the DB façade match on this type
/// directly instead of testing `Option::is_none()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    /// The key holds a live value.
    Live(Vec<u8>),
    /// The key has been deleted; shadows any older value for the same key.
    Tombstone,
}

impl EntryValue {
    /// Returns the live value, or `None` if this is a tombstone.
    pub fn as_value(&self) -> Option<&[u8]> {
        match self {
            EntryValue::Live(v) => Some(v),
            EntryValue::Tombstone => None,
        }
    }

    /// Returns `true` if this entry is a tombstone.
    pub fn is_tombstone(&self) -> bool {
        matches!(self, EntryValue::Tombstone)
    }
}

/// An ordered, in-memory write buffer backed by a `BTreeMap`.
///
/// Capacity is measured in distinct keys (live values and tombstones counted
/// equally), matching the spec's `max_inmemory_size` semantics: the DB
/// façade flushes the memtable to a new segment before it would exceed this
/// count.
#[derive(Debug, Default)]
pub struct Memtable {
    map: BTreeMap<Vec<u8>, EntryValue>,
}

impl Memtable {
    /// Creates a new, empty memtable.
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Inserts a key-value pair, overwriting any prior entry (live or
    /// tombstone) for the same key. Overwriting a tombstone resurrects the
    /// key.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.map.insert(key, EntryValue::Live(value));
    }

    /// Records a tombstone (delete marker) for the given key, overwriting
    /// any prior entry.
    ///
    /// Callers are responsible for verifying the key is visible elsewhere
    /// before calling this — the memtable itself accepts tombstones for any
    /// key unconditionally.
    pub fn put_tombstone(&mut self, key: Vec<u8>) {
        self.map.insert(key, EntryValue::Tombstone);
    }

    /// Returns the live value for `key`, or `None` if the key is absent or a
    /// tombstone.
    ///
    /// Prefer [`get_entry`](Memtable::get_entry) when the caller must
    /// distinguish "key not found" from "key was deleted".
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.map.get(key).and_then(EntryValue::as_value)
    }

    /// Returns the raw [`EntryValue`] for `key`, if present (including
    /// tombstones).
    pub fn get_entry(&self, key: &[u8]) -> Option<&EntryValue> {
        self.map.get(key)
    }

    /// Returns an iterator over all entries in ascending key order,
    /// including tombstones. Required for correct segment flush, which must
    /// append entries in non-decreasing key order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&[u8], &EntryValue)> {
        self.map.iter().map(|(k, v)| (k.as_slice(), v))
    }

    /// Returns the number of entries (live values and tombstones counted
    /// equally). Used for `max_inmemory_size` capacity accounting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the memtable holds zero entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `key` has any entry (live or tombstone).
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Removes all entries. Called after a successful flush.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}
