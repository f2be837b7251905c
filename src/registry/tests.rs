//! Tests for the command registry

use super::*;
use crate::key::{seq_ctrl, seq_ctrl_x, seq_ctrl_x_ctrl};

struct Dummy;

fn noop(_: &mut Dummy, _: &CommandCtx) -> Result<()> {
    Ok(())
}

fn sample() -> Registry<Dummy> {
    let mut reg = Registry::new();
    reg.register("forward-char", noop, &[seq_ctrl('f')]);
    reg.register("save-file", noop, &[seq_ctrl_x_ctrl('s')]);
    reg.register("split-pane", noop, &[seq_ctrl_x('2')]);
    reg.register("search-forward", noop, &[seq_ctrl('s')]);
    reg.register("save-and-quit", noop, &[seq_ctrl_x_ctrl('c')]);
    reg
}

#[test]
fn exact_match_full() {
    let reg = sample();
    let id = reg.find("forward-char").unwrap();
    assert_eq!(reg.match_seq(&seq_ctrl('f')), MatchResult::Full(id));
}

#[test]
fn prefix_of_longer_binding_is_partial() {
    let reg = sample();
    assert_eq!(reg.match_seq(&seq_ctrl('x')), MatchResult::Partial);
    let mut cx_c = seq_ctrl('x');
    cx_c.push(crate::constants::keys::CONTROL);
    assert_eq!(reg.match_seq(&cx_c), MatchResult::Partial);
}

#[test]
fn unmatched_sequence_is_undefined() {
    let reg = sample();
    assert_eq!(reg.match_seq(&seq_ctrl('q')), MatchResult::Undefined);
    assert_eq!(reg.match_seq(b"zz"), MatchResult::Undefined);
}

#[test]
fn find_by_name_uses_sorted_index() {
    let reg = sample();
    assert!(reg.find("save-file").is_some());
    assert!(reg.find("no-such-command").is_none());
    let names: Vec<&str> = reg.names().collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn complete_extends_to_longest_common_prefix() {
    let reg = sample();
    assert_eq!(reg.complete("sa").as_deref(), Some("save-"));
    assert_eq!(reg.complete("sp").as_deref(), Some("split-pane"));
    assert_eq!(reg.complete("zz"), None);
}

#[test]
fn bindings_of_lists_all_chords() {
    let mut reg = sample();
    let id = reg.register("set-mark", noop, &[seq_ctrl(' '), seq_ctrl('@')]);
    let seqs: Vec<&[u8]> = reg.bindings_of(id).map(|b| b.seq.as_slice()).collect();
    assert_eq!(seqs.len(), 2);
}
