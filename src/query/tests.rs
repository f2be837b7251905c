//! Tests for the mini-query editor

use super::*;
use crate::kill_ring::KillRing;

fn query(initial: &str) -> MiniQuery {
    MiniQuery::new(1, "Find file: ", initial, QueryType::Str, QueryKind::FindFile {
        new_frame: false,
    })
}

#[test]
fn typing_inserts_at_cursor() {
    let mut q = query("");
    q.insert_char('h');
    q.insert_char('i');
    assert_eq!(q.response, "hi");
    q.left();
    q.insert_char('e');
    assert_eq!(q.response, "hei");
}

#[test]
fn cursor_moves_by_chars_not_bytes() {
    let mut q = query("café");
    assert_eq!(q.cursor, 5);
    q.left();
    assert_eq!(q.cursor, 3, "stepped back over the 2-byte é");
    q.right();
    assert_eq!(q.cursor, 5);
}

#[test]
fn word_motion() {
    let mut q = query("one two three");
    q.home();
    q.word_right();
    assert_eq!(q.cursor, 3);
    q.word_right();
    assert_eq!(q.cursor, 7);
    q.end();
    q.word_left();
    assert_eq!(q.cursor, 8);
}

#[test]
fn deletions() {
    let mut q = query("abcdef");
    q.delete_back();
    assert_eq!(q.response, "abcde");
    q.home();
    q.delete_forward();
    assert_eq!(q.response, "bcde");
}

#[test]
fn word_deletions() {
    let mut q = query("alpha beta");
    q.delete_word_back();
    assert_eq!(q.response, "alpha ");
    q.home();
    q.delete_word_forward();
    assert_eq!(q.response, " ");
}

#[test]
fn kill_to_end_feeds_the_ring() {
    let mut ring = KillRing::new();
    let mut q = query("keep-drop");
    q.home();
    for _ in 0..5 {
        q.right();
    }
    q.kill_to_end(&mut ring);
    assert_eq!(q.response, "keep-");
    assert_eq!(ring.yank(), Some(&b"drop"[..]));
}

#[test]
fn yank_and_yank_pop() {
    let mut ring = KillRing::new();
    ring.kill(b"older");
    ring.kill(b"newer");
    let mut q = query("x");
    q.end();
    q.yank(&mut ring);
    assert_eq!(q.response, "xnewer");
    assert!(q.yank_pop(&mut ring));
    assert_eq!(q.response, "xolder");
    // yank-pop after anything else refuses
    q.left();
    assert!(!q.yank_pop(&mut ring));
}

#[test]
fn clear_empties_response() {
    let mut q = query("something");
    q.clear();
    assert_eq!(q.response, "");
    assert_eq!(q.cursor, 0);
}

#[test]
fn scroll_window_keeps_cursor_margin() {
    let mut q = query("abcdefghijklmnopqrstuvwxyz");
    q.home();
    let (first, left, right) = q.scroll_window(10);
    assert_eq!(first, 0);
    assert!(!left);
    assert!(right, "hidden text to the right shows a tick");

    q.end();
    let (first, left, right) = q.scroll_window(10);
    assert!(first > 0);
    assert!(left, "hidden text to the left shows a tick");
    assert!(!right);
    // The cursor (at char 26) stays within the window
    assert!(26 >= first && 26 <= first + 10);
}

#[test]
fn scroll_window_tracks_cursor_back() {
    let mut q = query("abcdefghijklmnopqrstuvwxyz");
    q.end();
    q.scroll_window(10);
    q.home();
    let (first, left, _) = q.scroll_window(10);
    assert_eq!(first, 0);
    assert!(!left);
}
