use super::*;
use memtable::EntryValue;
use tempfile::tempdir;

fn build_persistent(
    dir: &std::path::Path,
    name: &str,
    sparse_offset: usize,
    entries: &[(&[u8], EntryValue)],
) -> Segment {
    let path = dir.join(name);
    let mut builder = SegmentBuilder::new_persistent(&path, sparse_offset).unwrap();
    for (key, value) in entries {
        builder.add_entry(key, value).unwrap();
    }
    builder.finish().unwrap()
}

#[test]
fn search_finds_live_value() {
    let dir = tempdir().unwrap();
    let seg = build_persistent(
        dir.path(),
        "a.dat",
        4,
        &[
            (b"a", EntryValue::Live(b"1".to_vec())),
            (b"b", EntryValue::Live(b"2".to_vec())),
            (b"c", EntryValue::Live(b"3".to_vec())),
        ],
    );

    assert_eq!(seg.search(b"b").unwrap(), SearchOutcome::Found(b"2".to_vec()));
}

#[test]
fn search_reports_tombstone() {
    let dir = tempdir().unwrap();
    let seg = build_persistent(
        dir.path(),
        "a.dat",
        4,
        &[
            (b"a", EntryValue::Live(b"1".to_vec())),
            (b"b", EntryValue::Tombstone),
        ],
    );

    assert_eq!(seg.search(b"b").unwrap(), SearchOutcome::Tombstone);
}

#[test]
fn search_missing_key_returns_not_found() {
    let dir = tempdir().unwrap();
    let seg = build_persistent(
        dir.path(),
        "a.dat",
        4,
        &[(b"a", EntryValue::Live(b"1".to_vec()))],
    );

    assert_eq!(seg.search(b"zzz").unwrap(), SearchOutcome::NotFound);
}

#[test]
fn search_with_sparse_index_scans_within_bracket() {
    let dir = tempdir().unwrap();
    let mut entries = Vec::new();
    let values: Vec<Vec<u8>> = (0..100).map(|i| format!("v{:03}", i).into_bytes()).collect();
    let keys: Vec<Vec<u8>> = (0..100).map(|i| format!("k{:03}", i).into_bytes()).collect();
    for i in 0..100 {
        entries.push((keys[i].as_slice(), EntryValue::Live(values[i].clone())));
    }
    let seg = build_persistent(dir.path(), "a.dat", 10, &entries);

    // Every key should be findable regardless of whether it landed on a
    // sparse index sample boundary.
    for i in 0..100 {
        let outcome = seg.search(&keys[i]).unwrap();
        assert_eq!(outcome, SearchOutcome::Found(values[i].clone()));
    }
    assert_eq!(seg.search(b"k999").unwrap(), SearchOutcome::NotFound);
}

#[test]
fn builder_rejects_out_of_order_keys() {
    let dir = tempdir().unwrap();
    let mut builder =
        SegmentBuilder::new_persistent(dir.path().join("a.dat"), 4).unwrap();
    builder
        .add_entry(b"b", &EntryValue::Live(b"1".to_vec()))
        .unwrap();
    let err = builder.add_entry(b"a", &EntryValue::Live(b"2".to_vec()));
    assert!(err.is_err());
}

#[test]
fn builder_rejects_duplicate_keys() {
    let dir = tempdir().unwrap();
    let mut builder =
        SegmentBuilder::new_persistent(dir.path().join("a.dat"), 4).unwrap();
    builder
        .add_entry(b"a", &EntryValue::Live(b"1".to_vec()))
        .unwrap();
    let err = builder.add_entry(b"a", &EntryValue::Live(b"2".to_vec()));
    assert!(err.is_err());
}

#[test]
fn open_rebuilds_index_matching_original() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.dat");
    {
        let mut builder = SegmentBuilder::new_persistent(&path, 3).unwrap();
        for i in 0..20u32 {
            builder
                .add_entry(
                    format!("k{:03}", i).as_bytes(),
                    &EntryValue::Live(format!("v{:03}", i).into_bytes()),
                )
                .unwrap();
        }
        builder.finish().unwrap();
    }

    let reopened = Segment::open(&path, 3, false).unwrap();
    assert_eq!(reopened.entry_count(), 20);
    for i in 0..20u32 {
        let key = format!("k{:03}", i);
        let expected = format!("v{:03}", i).into_bytes();
        assert_eq!(
            reopened.search(key.as_bytes()).unwrap(),
            SearchOutcome::Found(expected)
        );
    }
}

#[test]
fn empty_segment_search_returns_not_found() {
    let dir = tempdir().unwrap();
    let builder = SegmentBuilder::new_persistent(dir.path().join("a.dat"), 4).unwrap();
    let seg = builder.finish().unwrap();
    assert_eq!(seg.entry_count(), 0);
    assert_eq!(seg.search(b"anything").unwrap(), SearchOutcome::NotFound);
}

#[test]
fn scan_yields_entries_in_order() {
    let dir = tempdir().unwrap();
    let seg = build_persistent(
        dir.path(),
        "a.dat",
        4,
        &[
            (b"a", EntryValue::Live(b"1".to_vec())),
            (b"b", EntryValue::Tombstone),
            (b"c", EntryValue::Live(b"3".to_vec())),
        ],
    );

    let collected: Vec<_> = seg.scan().unwrap().collect::<Result<_>>().unwrap();
    assert_eq!(
        collected,
        vec![
            (b"a".to_vec(), EntryValue::Live(b"1".to_vec())),
            (b"b".to_vec(), EntryValue::Tombstone),
            (b"c".to_vec(), EntryValue::Live(b"3".to_vec())),
        ]
    );
}

#[test]
fn ephemeral_segment_file_removed_on_drop() {
    let mut builder = SegmentBuilder::new_ephemeral(4).unwrap();
    builder
        .add_entry(b"a", &EntryValue::Live(b"1".to_vec()))
        .unwrap();
    let seg = builder.finish().unwrap();
    let path = seg.path().to_path_buf();
    assert!(path.exists());
    assert!(seg.is_ephemeral());

    drop(seg);
    assert!(!path.exists());
}

#[test]
fn persistent_segment_file_survives_drop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.dat");
    let mut builder = SegmentBuilder::new_persistent(&path, 4).unwrap();
    builder
        .add_entry(b"a", &EntryValue::Live(b"1".to_vec()))
        .unwrap();
    let seg = builder.finish().unwrap();
    assert!(!seg.is_ephemeral());

    drop(seg);
    assert!(path.exists());
}
