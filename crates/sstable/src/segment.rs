//! Immutable, on-disk sorted segments and the builder that produces them.
//!
//! A segment is a single file holding entries in strictly ascending key
//! order, plus a sparse in-memory index sampled every `sparse_offset`
//! entries. Segments are written once (via [`SegmentBuilder`]) and never
//! modified afterward; compaction replaces a group of segments with a fresh
//! one rather than editing any in place.

use crate::entry;
use anyhow::{bail, Context, Result};
use memtable::EntryValue;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};

/// Outcome of [`Segment::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The key was found with a live value.
    Found(Vec<u8>),
    /// The key was found but shadowed by a tombstone in this segment.
    Tombstone,
    /// The key is not present in this segment.
    NotFound,
}

/// Builds a new segment by accepting entries in strictly ascending key
/// order, then sealing them into an immutable [`Segment`].
///
/// Mirrors the "Appending" state of a segment's lifecycle; [`finish`] is the
/// only way to transition to the sealed, queryable state.
///
/// [`finish`]: SegmentBuilder::finish
pub struct SegmentBuilder {
    writer: BufWriter<File>,
    path: PathBuf,
    ephemeral: bool,
    sparse_offset: usize,
    sparse_index: BTreeMap<Vec<u8>, u64>,
    offset: u64,
    entry_count: usize,
    last_key: Option<Vec<u8>>,
    last_entry_offset: u64,
}

impl SegmentBuilder {
    /// Creates a builder that writes to a persistent file at `path`.
    pub fn new_persistent(path: impl Into<PathBuf>, sparse_offset: usize) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)
            .with_context(|| format!("creating segment file {}", path.display()))?;
        Ok(Self::from_file(file, path, false, sparse_offset))
    }

    /// Creates a builder that writes to a temporary file which is deleted
    /// when the resulting [`Segment`] is dropped. Used when
    /// `persist_segments` is disabled — the segment still exists as a real
    /// file on disk for the duration of the process, it just leaves nothing
    /// behind.
    pub fn new_ephemeral(sparse_offset: usize) -> Result<Self> {
        let tmp = tempfile::Builder::new()
            .prefix("riptide-seg-")
            .suffix(".dat")
            .tempfile()
            .context("creating ephemeral segment file")?;
        let (file, path) = tmp.keep().context("persisting ephemeral tempfile handle")?;
        Ok(Self::from_file(file, path, true, sparse_offset))
    }

    fn from_file(file: File, path: PathBuf, ephemeral: bool, sparse_offset: usize) -> Self {
        Self {
            writer: BufWriter::new(file),
            path,
            ephemeral,
            sparse_offset: sparse_offset.max(1),
            sparse_index: BTreeMap::new(),
            offset: 0,
            entry_count: 0,
            last_key: None,
            last_entry_offset: 0,
        }
    }

    /// Appends one entry. Keys must be strictly greater than the previous
    /// key appended to this builder.
    pub fn add_entry(&mut self, key: &[u8], value: &EntryValue) -> Result<()> {
        if let Some(last) = &self.last_key {
            if key <= last.as_slice() {
                bail!(
                    "segment builder requires strictly ascending keys, got {:?} after {:?}",
                    key,
                    last
                );
            }
        }

        if self.entry_count % self.sparse_offset == 0 {
            self.sparse_index.insert(key.to_vec(), self.offset);
        }

        let bytes = entry::encode(key, value);
        self.writer
            .write_all(&bytes)
            .with_context(|| format!("writing entry to segment {}", self.path.display()))?;

        self.last_entry_offset = self.offset;
        self.offset += bytes.len() as u64;
        self.entry_count += 1;
        self.last_key = Some(key.to_vec());
        Ok(())
    }

    /// Seals the segment: flushes all buffered bytes, guarantees the final
    /// key is present in the sparse index (even if it didn't land on a
    /// sample boundary), and returns the immutable, queryable [`Segment`].
    pub fn finish(mut self) -> Result<Segment> {
        if let Some(last) = &self.last_key {
            self.sparse_index
                .entry(last.clone())
                .or_insert_with(|| self.last_entry_offset);
        }
        self.writer
            .flush()
            .with_context(|| format!("flushing segment {}", self.path.display()))?;

        Ok(Segment {
            path: self.path,
            ephemeral: self.ephemeral,
            sparse_index: self.sparse_index,
            entry_count: self.entry_count,
        })
    }
}

/// An immutable, sealed, on-disk sorted run of entries.
///
/// Reads reopen the underlying file per-call rather than holding a
/// persistent handle: the store is single-threaded and cooperative, so
/// there is no concurrent-access benefit to amortizing the open, and scoped
/// acquisition keeps the file descriptor lifetime tied to the operation
/// that needs it.
pub struct Segment {
    path: PathBuf,
    ephemeral: bool,
    sparse_index: BTreeMap<Vec<u8>, u64>,
    entry_count: usize,
}

impl Segment {
    /// Rebuilds a segment's sparse index by sequentially scanning an
    /// existing file on disk. Used during cold-start recovery, where the
    /// index built at write time is not itself persisted.
    pub fn open(path: impl Into<PathBuf>, sparse_offset: usize, ephemeral: bool) -> Result<Self> {
        let path = path.into();
        let sparse_offset = sparse_offset.max(1);
        let file =
            File::open(&path).with_context(|| format!("opening segment {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let mut sparse_index = BTreeMap::new();
        let mut offset: u64 = 0;
        let mut entry_count = 0usize;
        let mut last_key: Option<Vec<u8>> = None;
        let mut last_offset: u64 = 0;

        loop {
            let start = offset;
            match entry::decode(&mut reader) {
                Ok((key, _value)) => {
                    if entry_count % sparse_offset == 0 {
                        sparse_index.insert(key.clone(), start);
                    }
                    offset = reader.stream_position()?;
                    entry_count += 1;
                    last_key = Some(key);
                    last_offset = start;
                }
                Err(e) => {
                    if is_eof(&e) {
                        break;
                    }
                    return Err(e).with_context(|| {
                        format!("decoding segment {} at offset {}", path.display(), start)
                    });
                }
            }
        }

        // Ensure the final entry's key is indexed, matching SegmentBuilder::finish.
        if let Some(key) = last_key {
            sparse_index.entry(key).or_insert(last_offset);
        }

        Ok(Self {
            path,
            ephemeral,
            sparse_index,
            entry_count,
        })
    }

    /// The segment's backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries (live and tombstone) in this segment.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Whether this segment's file is deleted when dropped.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Looks up `key` within this segment using the sparse index to bound a
    /// sequential scan.
    ///
    /// Algorithm:
    /// 1. Find `s_lo`, the greatest indexed offset whose key is `<= key`.
    /// 2. Find `s_hi`, the smallest indexed offset whose key is `> key`
    ///    (or EOF if none).
    /// 3. Scan sequentially from `s_lo` (or the start of the file if no
    ///    `s_lo` exists) up to `s_hi`.
    /// 4. Stop as soon as a matching key is found or a key greater than
    ///    the target is read.
    /// 5. Report `Found`, `Tombstone`, or `NotFound` accordingly.
    pub fn search(&self, key: &[u8]) -> Result<SearchOutcome> {
        if self.sparse_index.is_empty() {
            return Ok(SearchOutcome::NotFound);
        }

        let lo_offset = self
            .sparse_index
            .range::<[u8], _>((Bound::Unbounded, Bound::Included(key)))
            .next_back()
            .map(|(_, &off)| off)
            .unwrap_or(0);

        let hi_offset = self
            .sparse_index
            .range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(_, &off)| off);

        let file = File::open(&self.path)
            .with_context(|| format!("opening segment {}", self.path.display()))?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(lo_offset))?;

        loop {
            let pos = reader.stream_position()?;
            if let Some(hi) = hi_offset {
                if pos >= hi {
                    return Ok(SearchOutcome::NotFound);
                }
            }

            match entry::decode(&mut reader) {
                Ok((found_key, value)) => {
                    if found_key.as_slice() == key {
                        return Ok(match value {
                            EntryValue::Live(v) => SearchOutcome::Found(v),
                            EntryValue::Tombstone => SearchOutcome::Tombstone,
                        });
                    }
                    if found_key.as_slice() > key {
                        return Ok(SearchOutcome::NotFound);
                    }
                }
                Err(e) if is_eof(&e) => return Ok(SearchOutcome::NotFound),
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("decoding segment {} during search", self.path.display())
                    })
                }
            }
        }
    }

    /// Opens a fresh handle and returns a lazy iterator over every entry in
    /// ascending key order. Used by compaction's k-way merge.
    pub fn scan(&self) -> Result<SegmentScanner> {
        let file = File::open(&self.path)
            .with_context(|| format!("opening segment {}", self.path.display()))?;
        Ok(SegmentScanner {
            reader: BufReader::new(file),
        })
    }
}

impl Drop for Segment {
    fn drop(&mut self) {
        if self.ephemeral {
            let _ = fs::remove_file(&self.path);
        }
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("path", &self.path)
            .field("entry_count", &self.entry_count)
            .field("ephemeral", &self.ephemeral)
            .field("sparse_index_len", &self.sparse_index.len())
            .finish()
    }
}

/// A lazy, forward-only iterator over a segment's entries, used by the
/// k-way merge during compaction.
pub struct SegmentScanner {
    reader: BufReader<File>,
}

impl Iterator for SegmentScanner {
    type Item = Result<(Vec<u8>, EntryValue)>;

    fn next(&mut self) -> Option<Self::Item> {
        match entry::decode(&mut self.reader) {
            Ok(pair) => Some(Ok(pair)),
            Err(e) if is_eof(&e) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn is_eof(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io_err| io_err.kind() == std::io::ErrorKind::UnexpectedEof)
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "tests/segment_tests.rs"]
mod tests;
