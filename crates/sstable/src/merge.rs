//! K-way merge across sealed segments, used by compaction.
//!
//! Unlike a reader holding a full in-memory key index, a [`Segment`]'s
//! index is deliberately sparse, so the merge cannot enumerate candidate
//! keys from the index alone — it drives each segment through its
//! sequential [`Segment::scan`] iterator instead and merges the resulting
//! streams with a binary heap.
//!
//! Segments are supplied newest-first. When multiple segments hold an entry
//! for the same key, the merge keeps the one from the lowest segment index
//! (the newest) and discards the rest — there is no sequence number in this
//! design, so recency is entirely a function of position in the segment
//! set.

use crate::segment::Segment;
use anyhow::Result;
use memtable::EntryValue;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct HeapEntry {
    key: Vec<u8>,
    value: EntryValue,
    source: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.source == other.source
    }
}
impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse key order so the smallest key
        // surfaces first, and for equal keys prefer the lowest source index
        // (newest segment).
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.source.cmp(&self.source))
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Merges the entry streams of several segments, newest-first, into a
/// single ascending-key stream with exactly one entry per distinct key —
/// the one contributed by the newest segment that has it.
///
/// Tombstones are yielded like any other entry; callers that want
/// compaction's garbage-collecting behavior should filter them out of the
/// final output (see the `db` crate's compaction routine).
pub struct MergeIterator {
    scanners: Vec<Box<dyn Iterator<Item = Result<(Vec<u8>, EntryValue)>>>>,
    heap: BinaryHeap<HeapEntry>,
    exhausted: bool,
}

impl MergeIterator {
    /// Builds a merge iterator over `segments`, which must be ordered
    /// newest-first (index 0 = most recently written).
    pub fn new(segments: &[Segment]) -> Result<Self> {
        let mut scanners: Vec<Box<dyn Iterator<Item = Result<(Vec<u8>, EntryValue)>>>> =
            Vec::with_capacity(segments.len());
        for seg in segments {
            scanners.push(Box::new(seg.scan()?));
        }

        let mut heap = BinaryHeap::new();
        for (source, scanner) in scanners.iter_mut().enumerate() {
            if let Some(next) = scanner.next() {
                let (key, value) = next?;
                heap.push(HeapEntry { key, value, source });
            }
        }

        Ok(Self {
            scanners,
            heap,
            exhausted: false,
        })
    }

    fn refill(&mut self, source: usize) -> Result<()> {
        if let Some(next) = self.scanners[source].next() {
            let (key, value) = next?;
            self.heap.push(HeapEntry { key, value, source });
        }
        Ok(())
    }
}

impl Iterator for MergeIterator {
    type Item = Result<(Vec<u8>, EntryValue)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let winner = self.heap.pop()?;
        if let Err(e) = self.refill(winner.source) {
            self.exhausted = true;
            return Some(Err(e));
        }

        // Drain and discard every other entry sharing this key; the heap
        // ordering guarantees the lowest source index was already chosen.
        while let Some(top) = self.heap.peek() {
            if top.key != winner.key {
                break;
            }
            let shadowed = self.heap.pop().unwrap();
            if let Err(e) = self.refill(shadowed.source) {
                self.exhausted = true;
                return Some(Err(e));
            }
        }

        Some(Ok((winner.key, winner.value)))
    }
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
