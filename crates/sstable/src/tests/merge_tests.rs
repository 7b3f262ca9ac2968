use super::*;
use crate::segment::{Segment, SegmentBuilder};
use memtable::EntryValue;
use tempfile::tempdir;

fn segment_from(dir: &std::path::Path, name: &str, entries: &[(&[u8], EntryValue)]) -> Segment {
    let mut builder = SegmentBuilder::new_persistent(dir.join(name), 4).unwrap();
    for (key, value) in entries {
        builder.add_entry(key, value).unwrap();
    }
    builder.finish().unwrap()
}

#[test]
fn merges_disjoint_segments_in_order() {
    let dir = tempdir().unwrap();
    let s0 = segment_from(
        dir.path(),
        "s0.dat",
        &[(b"c", EntryValue::Live(b"3".to_vec()))],
    );
    let s1 = segment_from(
        dir.path(),
        "s1.dat",
        &[
            (b"a", EntryValue::Live(b"1".to_vec())),
            (b"b", EntryValue::Live(b"2".to_vec())),
        ],
    );

    let merged: Vec<_> = MergeIterator::new(&[s0, s1])
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(
        merged,
        vec![
            (b"a".to_vec(), EntryValue::Live(b"1".to_vec())),
            (b"b".to_vec(), EntryValue::Live(b"2".to_vec())),
            (b"c".to_vec(), EntryValue::Live(b"3".to_vec())),
        ]
    );
}

#[test]
fn newest_segment_wins_on_overlapping_key() {
    let dir = tempdir().unwrap();
    // segments passed newest-first: index 0 is newest.
    let newest = segment_from(
        dir.path(),
        "newest.dat",
        &[(b"k", EntryValue::Live(b"new".to_vec()))],
    );
    let oldest = segment_from(
        dir.path(),
        "oldest.dat",
        &[(b"k", EntryValue::Live(b"old".to_vec()))],
    );

    let merged: Vec<_> = MergeIterator::new(&[newest, oldest])
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(merged, vec![(b"k".to_vec(), EntryValue::Live(b"new".to_vec()))]);
}

#[test]
fn tombstone_from_newer_segment_shadows_older_live_value() {
    let dir = tempdir().unwrap();
    let newest = segment_from(dir.path(), "newest.dat", &[(b"k", EntryValue::Tombstone)]);
    let oldest = segment_from(
        dir.path(),
        "oldest.dat",
        &[(b"k", EntryValue::Live(b"old".to_vec()))],
    );

    let merged: Vec<_> = MergeIterator::new(&[newest, oldest])
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(merged, vec![(b"k".to_vec(), EntryValue::Tombstone)]);
}

#[test]
fn merges_three_segments_with_interleaved_keys() {
    let dir = tempdir().unwrap();
    let s0 = segment_from(
        dir.path(),
        "s0.dat",
        &[
            (b"a", EntryValue::Live(b"s0-a".to_vec())),
            (b"d", EntryValue::Live(b"s0-d".to_vec())),
        ],
    );
    let s1 = segment_from(
        dir.path(),
        "s1.dat",
        &[
            (b"b", EntryValue::Live(b"s1-b".to_vec())),
            (b"d", EntryValue::Live(b"s1-d-shadowed".to_vec())),
        ],
    );
    let s2 = segment_from(
        dir.path(),
        "s2.dat",
        &[
            (b"a", EntryValue::Live(b"s2-a-shadowed".to_vec())),
            (b"c", EntryValue::Live(b"s2-c".to_vec())),
        ],
    );

    let merged: Vec<_> = MergeIterator::new(&[s0, s1, s2])
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(
        merged,
        vec![
            (b"a".to_vec(), EntryValue::Live(b"s0-a".to_vec())),
            (b"b".to_vec(), EntryValue::Live(b"s1-b".to_vec())),
            (b"c".to_vec(), EntryValue::Live(b"s2-c".to_vec())),
            (b"d".to_vec(), EntryValue::Live(b"s0-d".to_vec())),
        ]
    );
}

#[test]
fn merge_over_empty_segment_list_yields_nothing() {
    let merged: Vec<_> = MergeIterator::new(&[])
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert!(merged.is_empty());
}

#[test]
fn merge_over_single_segment_passes_through() {
    let dir = tempdir().unwrap();
    let s0 = segment_from(
        dir.path(),
        "s0.dat",
        &[
            (b"a", EntryValue::Live(b"1".to_vec())),
            (b"b", EntryValue::Tombstone),
        ],
    );

    let merged: Vec<_> = MergeIterator::new(&[s0])
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(
        merged,
        vec![
            (b"a".to_vec(), EntryValue::Live(b"1".to_vec())),
            (b"b".to_vec(), EntryValue::Tombstone),
        ]
    );
}
