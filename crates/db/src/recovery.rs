//! Cold-start recovery: reconstructing the segment set from files on disk.
//!
//! Segment files are named `seg-{counter:020}.dat`, where `counter` is a
//! monotonically increasing value minted by [`crate::Db::next_segment_path`].
//! Zero-padding makes lexicographic filename order match creation order,
//! resolving §9 open question 1 of the spec: directory-enumeration order
//! must match write order for newest-wins to hold, and a plain
//! `std::fs::read_dir` gives no such guarantee on its own — sorting by this
//! filename scheme does.

use crate::DbError;
use config::DbConfig;
use sstable::Segment;

const PREFIX: &str = "seg-";
const SUFFIX: &str = ".dat";

/// Formats the on-disk filename for segment `id`.
pub(crate) fn segment_filename(id: u64) -> String {
    format!("{PREFIX}{id:020}{SUFFIX}")
}

fn parse_segment_id(filename: &str) -> Option<u64> {
    filename
        .strip_prefix(PREFIX)?
        .strip_suffix(SUFFIX)?
        .parse()
        .ok()
}

/// Scans `config.path` for segment files and loads them into a newest-first
/// segment set, rebuilding each segment's sparse index by scanning its
/// file. Returns the loaded segments plus the next unused segment counter.
///
/// If `config.persist_segments` is `false`, no directory is scanned and an
/// empty segment set with counter `0` is returned — ephemeral databases
/// never have pre-existing state to recover.
pub(crate) fn load_segment_set(config: &DbConfig) -> Result<(Vec<Segment>, u64), DbError> {
    if !config.persist_segments {
        return Ok((Vec::new(), 0));
    }

    std::fs::create_dir_all(&config.path)?;

    let mut found: Vec<(u64, std::path::PathBuf)> = std::fs::read_dir(&config.path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter_map(|path| {
            let id = path.file_name()?.to_str().and_then(parse_segment_id)?;
            Some((id, path))
        })
        .collect();

    // Newest (highest counter) first.
    found.sort_by(|a, b| b.0.cmp(&a.0));

    let next_id = found.first().map(|(id, _)| id + 1).unwrap_or(0);

    let mut segments = Vec::with_capacity(found.len());
    for (_, path) in found {
        segments.push(Segment::open(path, config.sparse_offset, false)?);
    }

    Ok((segments, next_id))
}
