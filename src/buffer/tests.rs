//! Tests for the buffer aggregate and its undo integration

use super::*;
use crate::undo::flags;

fn text_of(buf: &Buffer) -> String {
    buf.text().to_string()
}

#[test]
fn insert_and_delete_roundtrip() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"hello world", 0).unwrap();
    assert_eq!(text_of(&buf), "hello world");
    let removed = buf.delete(5, 6, 0, false).unwrap();
    assert_eq!(removed, b" world");
    assert_eq!(text_of(&buf), "hello");
    assert!(buf.is_modified());
}

#[test]
fn read_only_buffer_refuses_mutation() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"locked", 0).unwrap();
    buf.read_only = true;
    let err = buf.insert(0, b"x", 0).unwrap_err();
    assert_eq!(err.kind, crate::error::ErrorType::Policy);
    assert!(buf.delete(0, 1, 0, false).is_err());
    assert_eq!(text_of(&buf), "locked");
}

#[test]
fn typing_then_undo_scenario() {
    // Insert "abc" at 0, then "d" at 1: "adbc". Undo twice back to "".
    let mut buf = Buffer::new(1);
    buf.insert(0, b"abc", 0).unwrap();
    buf.insert(1, b"d", flags::CHUNK).unwrap();
    assert_eq!(text_of(&buf), "adbc");
    assert_eq!(buf.len(), 4);

    let out = buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "abc");
    assert_eq!(out.cursor, 1);

    let out = buf.undo_step(true).unwrap();
    assert_eq!(text_of(&buf), "");
    assert_eq!(out.cursor, 0);

    let err = buf.undo_step(true).unwrap_err();
    assert!(err.contains_msg("No further undo"));
}

#[test]
fn undo_restores_deleted_text() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"one two", flags::CHUNK).unwrap();
    buf.delete(3, 4, flags::CHUNK, false).unwrap();
    assert_eq!(text_of(&buf), "one");

    let out = buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "one two");
    assert_eq!(out.cursor, 7);
}

#[test]
fn replace_undoes_as_one_operation() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"color", flags::CHUNK).unwrap();
    buf.replace(3, 2, b"our", false).unwrap();
    assert_eq!(text_of(&buf), "colour");

    buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "color");
}

#[test]
fn chained_replace_all_undoes_in_one_step() {
    // "aaa" with a -> bb, all three chained: one undo restores everything
    let mut buf = Buffer::new(1);
    buf.insert(0, b"aaa", flags::CHUNK).unwrap();
    buf.undo.end_read();

    let mut pos = 0;
    let mut first = true;
    while pos + 1 <= buf.len() {
        let found = (pos..buf.len()).find(|&p| buf.text().byte_at(p) == b'a');
        let Some(p) = found else { break };
        buf.replace(p, 1, b"bb", !first).unwrap();
        first = false;
        pos = p + 2;
    }
    assert_eq!(text_of(&buf), "bbbbbb");

    buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "aaa");
}

#[test]
fn undo_of_undo_redoes() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"keep", flags::CHUNK).unwrap();
    buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "");
    // A non-undo command intervenes; the next undo replays the inverse
    buf.undo.end_read();
    buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "keep");
}

#[test]
fn save_barrier_restores_clean_state() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"base", flags::CHUNK).unwrap();
    buf.note_saved();
    assert!(!buf.is_modified());

    buf.insert(4, b"!", flags::CHUNK).unwrap();
    assert!(buf.is_modified());

    let out = buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "base");
    assert!(out.now_clean);
    assert!(!buf.is_modified());
}

#[test]
fn save_marker_seen_mid_run_blocks_clean_transition() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"a", flags::CHUNK).unwrap();
    buf.note_saved();
    buf.insert(1, b"b", flags::CHUNK).unwrap();
    buf.note_saved();

    // First undo crosses the newest Save marker; FIRSTMOD blocks reached
    // afterwards may not claim cleanliness
    let out = buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "a");
    assert!(!out.now_clean);

    let out = buf.undo_step(true).unwrap();
    assert_eq!(text_of(&buf), "");
    assert!(!out.now_clean);
}

#[test]
fn unmodify_point_is_the_undo_target() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"settled", flags::CHUNK).unwrap();
    buf.unmodify();
    buf.insert(7, b" more", flags::CHUNK).unwrap();
    assert!(buf.is_modified());

    let out = buf.undo_step(false).unwrap();
    assert_eq!(text_of(&buf), "settled");
    assert!(out.now_clean);
    assert!(!buf.is_modified());
}

#[test]
fn marks_follow_edits() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"0123456789", 0).unwrap();
    buf.marks.push(5);
    buf.insert(2, b"xx", flags::CHUNK).unwrap();
    assert_eq!(buf.marks.top(), 7);
    buf.delete(0, 4, flags::CHUNK, false).unwrap();
    assert_eq!(buf.marks.top(), 3);
    // Deleting across the mark clamps it to the deletion point
    buf.marks.push(4);
    buf.delete(2, 5, flags::CHUNK, false).unwrap();
    assert_eq!(buf.marks.top(), 2);
}

#[test]
fn disabled_undo_reports() {
    let mut buf = Buffer::new(1);
    buf.insert(0, b"text", 0).unwrap();
    buf.undo.disable();
    let err = buf.undo_step(false).unwrap_err();
    assert_eq!(err.kind, crate::error::ErrorType::Resource);
}

#[test]
fn display_name_tags_collisions() {
    let mut buf = Buffer::new(1);
    buf.file_name = "notes.txt".into();
    assert_eq!(buf.display_name(), "notes.txt");
    buf.collision = true;
    buf.dir_path = Some(std::path::PathBuf::from("/tmp"));
    assert_eq!(buf.display_name(), "notes.txt (/tmp)");
}
