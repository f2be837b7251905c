//! Tests for file I/O and the load filter

use super::*;

#[test]
fn filter_normalizes_line_endings() {
    assert_eq!(filter(b"a\r\nb", 8), b"a\nb");
    assert_eq!(filter(b"a\rb", 8), b"a\nb");
    assert_eq!(filter(b"a\r\r\nb", 8), b"a\n\nb");
}

#[test]
fn filter_expands_tabs_to_next_stop() {
    // 'a' sits in column 0, so the tab pads 7 spaces to column 8
    assert_eq!(filter(b"a\tb", 8), b"a       b".to_vec());
    // A tab in column 0 pads a full stop
    assert_eq!(filter(b"\tx", 8), b"        x".to_vec());
    // Columns reset at newlines
    assert_eq!(filter(b"abc\n\td", 8), b"abc\n        d".to_vec());
}

#[test]
fn filter_counts_characters_not_bytes() {
    // Two 2-byte chars occupy columns 0 and 1; tab pads to column 8
    let input = "éé\tz".as_bytes();
    let expect = "éé      z".as_bytes();
    assert_eq!(filter(input, 8), expect);
}

#[test]
fn filter_is_idempotent() {
    let once = filter(b"a\tb\r\nc\rd", 8);
    let twice = filter(&once, 8);
    assert_eq!(once, twice);
}

#[test]
fn scenario_filter_example() {
    // "a\tb\r\nc" filters to "a       b\nc"
    assert_eq!(filter(b"a\tb\r\nc", 8), b"a       b\nc".to_vec());
}

#[test]
fn read_write_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.txt");
    write_file(&path, (b"first half ", b"second half")).unwrap();
    let loaded = read_file(&path).unwrap();
    assert_eq!(loaded.bytes, b"first half second half");
    assert!(!loaded.wants_filter);
}

#[test]
fn read_flags_filter_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabs.txt");
    write_file(&path, (b"col1\tcol2\r\n", b"")).unwrap();
    let loaded = read_file(&path).unwrap();
    assert!(loaded.wants_filter);
}

#[test]
fn read_missing_file_reports_load_error() {
    let err = read_file(Path::new("/no/such/file/anywhere")).unwrap_err();
    assert_eq!(err.kind, crate::error::ErrorType::Io);
    assert_eq!(err.code, crate::constants::errors::LOAD_FAILED);
}

#[test]
fn split_path_separates_name_and_dir() {
    let (name, dir) = split_path(Path::new("/tmp/notes.txt"));
    assert_eq!(name, "notes.txt");
    assert_eq!(dir, Some(PathBuf::from("/tmp")));
    let (name, dir) = split_path(Path::new("bare.txt"));
    assert_eq!(name, "bare.txt");
    assert_eq!(dir, None);
}
