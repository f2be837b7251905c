//! Tests for dispatch and the numeric-prefix parser

use super::*;
use crate::key::{seq_ctrl, seq_ctrl_x, KeyPress};
use crate::registry::{CommandCtx, MatchResult, Registry};

struct Dummy;

fn noop(_: &mut Dummy, _: &CommandCtx) -> crate::error::Result<()> {
    Ok(())
}

fn registry() -> Registry<Dummy> {
    let mut reg = Registry::new();
    reg.register("forward-char", noop, &[seq_ctrl('f')]);
    reg.register("split-pane", noop, &[seq_ctrl_x('2')]);
    reg
}

fn feed(state: &mut DispatchState, reg: &Registry<Dummy>, press: KeyPress) -> Feed {
    state.feed(press, |seq| reg.match_seq(seq))
}

#[test]
fn single_chord_executes() {
    let reg = registry();
    let mut state = DispatchState::new();
    let id = reg.find("forward-char").unwrap();
    assert_eq!(feed(&mut state, &reg, KeyPress::ctrl('f')), Feed::Execute(id));
    assert!(!state.in_progress());
}

#[test]
fn two_key_sequence_goes_through_pending() {
    let reg = registry();
    let mut state = DispatchState::new();
    assert_eq!(feed(&mut state, &reg, KeyPress::ctrl('x')), Feed::Pending);
    assert!(state.in_progress());
    let id = reg.find("split-pane").unwrap();
    assert_eq!(feed(&mut state, &reg, KeyPress::ch('2')), Feed::Execute(id));
}

#[test]
fn unbound_printable_self_inserts() {
    let reg = registry();
    let mut state = DispatchState::new();
    assert_eq!(feed(&mut state, &reg, KeyPress::ch('q')), Feed::SelfInsert('q'));
}

#[test]
fn unbound_chord_is_undefined() {
    let reg = registry();
    let mut state = DispatchState::new();
    match feed(&mut state, &reg, KeyPress::ctrl('q')) {
        Feed::Undefined(seq) => assert_eq!(seq, seq_ctrl('q')),
        other => panic!("expected Undefined, got {:?}", other),
    }
}

#[test]
fn unbound_continuation_is_not_self_insert() {
    let reg = registry();
    let mut state = DispatchState::new();
    feed(&mut state, &reg, KeyPress::ctrl('x'));
    match feed(&mut state, &reg, KeyPress::ch('z')) {
        Feed::Undefined(_) => {}
        other => panic!("expected Undefined, got {:?}", other),
    }
}

#[test]
fn ctrl_u_defaults_to_four() {
    let reg = registry();
    let mut state = DispatchState::new();
    assert_eq!(feed(&mut state, &reg, KeyPress::ctrl('u')), Feed::PrefixKey);
    assert_eq!(state.prefix().amount(), 4);
    assert!(!state.prefix().explicit);
    // A second Ctrl+U multiplies
    feed(&mut state, &reg, KeyPress::ctrl('u'));
    assert_eq!(state.prefix().amount(), 16);
}

#[test]
fn digits_after_ctrl_u_accumulate() {
    let reg = registry();
    let mut state = DispatchState::new();
    feed(&mut state, &reg, KeyPress::ctrl('u'));
    feed(&mut state, &reg, KeyPress::ch('1'));
    feed(&mut state, &reg, KeyPress::ch('2'));
    let p = state.prefix();
    assert_eq!(p.amount(), 12);
    assert!(p.explicit);
}

#[test]
fn meta_minus_is_negative_one() {
    let reg = registry();
    let mut state = DispatchState::new();
    assert_eq!(feed(&mut state, &reg, KeyPress::meta('-')), Feed::PrefixKey);
    assert_eq!(state.prefix().amount(), -1);
}

#[test]
fn meta_digit_opens_accumulator() {
    let reg = registry();
    let mut state = DispatchState::new();
    feed(&mut state, &reg, KeyPress::meta('3'));
    feed(&mut state, &reg, KeyPress::ch('7'));
    assert_eq!(state.prefix().amount(), 37);
}

#[test]
fn minus_with_no_digits_flips_sign() {
    let reg = registry();
    let mut state = DispatchState::new();
    feed(&mut state, &reg, KeyPress::ctrl('u'));
    assert_eq!(feed(&mut state, &reg, KeyPress::ch('-')), Feed::PrefixKey);
    assert_eq!(state.prefix().amount(), -4);
    feed(&mut state, &reg, KeyPress::ch('-'));
    assert_eq!(state.prefix().amount(), 4);
}

#[test]
fn digit_cap_errors_out() {
    let reg = registry();
    let mut state = DispatchState::new();
    feed(&mut state, &reg, KeyPress::meta('1'));
    for _ in 0..4 {
        assert_eq!(feed(&mut state, &reg, KeyPress::ch('9')), Feed::PrefixKey);
    }
    assert_eq!(feed(&mut state, &reg, KeyPress::ch('9')), Feed::PrefixError);
    assert!(!state.in_progress());
}

#[test]
fn prefix_applies_to_following_command() {
    let reg = registry();
    let mut state = DispatchState::new();
    feed(&mut state, &reg, KeyPress::ctrl('u'));
    let id = reg.find("forward-char").unwrap();
    assert_eq!(feed(&mut state, &reg, KeyPress::ctrl('f')), Feed::Execute(id));
    assert_eq!(state.prefix().amount(), 4);
    state.reset();
    assert_eq!(state.prefix().amount(), 1);
}

#[test]
fn digits_without_prefix_self_insert() {
    let reg = registry();
    let mut state = DispatchState::new();
    assert_eq!(feed(&mut state, &reg, KeyPress::ch('7')), Feed::SelfInsert('7'));
}

#[test]
fn format_seq_is_readable() {
    assert_eq!(format_seq(&seq_ctrl('x')), "C-x");
    let mut seq = seq_ctrl('x');
    seq.extend_from_slice(&seq_ctrl('s'));
    assert_eq!(format_seq(&seq), "C-x C-s");
    assert_eq!(
        format_seq(&crate::key::seq_ext(crate::constants::keys::EXT_PAGE_DOWN)),
        "PgDn"
    );
}

#[test]
fn pending_echo_waits_for_delay() {
    let reg = registry();
    let mut state = DispatchState::new();
    feed(&mut state, &reg, KeyPress::ctrl('x'));
    assert!(state.pending_echo().is_none(), "first press stays quiet");
    // A second press that keeps the sequence alive runs the delay down
    state.feed(KeyPress::ctrl('w'), |_| MatchResult::Partial);
    assert_eq!(state.pending_echo().as_deref(), Some("C-x C-w"));
}
