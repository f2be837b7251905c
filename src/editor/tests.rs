//! End-to-end tests driving the editor through scripted host events

use super::*;
use crate::host::scripted::ScriptedHost;
use crate::host::HostEvent;
use crate::key::{KeyCode, KeyPress};

fn editor() -> Editor<ScriptedHost> {
    Editor::new(ScriptedHost::new(24, 80)).unwrap()
}

fn key(ed: &mut Editor<ScriptedHost>, press: KeyPress) {
    ed.handle_event(HostEvent::Key(press));
}

fn type_str(ed: &mut Editor<ScriptedHost>, s: &str) {
    for c in s.chars() {
        if c == '\n' {
            key(ed, KeyPress::plain(KeyCode::Enter));
        } else {
            key(ed, KeyPress::ch(c));
        }
    }
}

fn enter(ed: &mut Editor<ScriptedHost>) {
    key(ed, KeyPress::plain(KeyCode::Enter));
}

fn cur_text(ed: &Editor<ScriptedHost>) -> String {
    ed.buffer_of(ed.cur_pane_id()).text().to_string()
}

fn cur_cursor(ed: &Editor<ScriptedHost>) -> usize {
    ed.pane(ed.cur_pane_id()).cursor
}

fn echo_text(ed: &Editor<ScriptedHost>) -> String {
    ed.cur_frame().echo.text.clone()
}

#[test]
fn starts_with_one_frame_one_pane_scratch_buffer() {
    let ed = editor();
    assert_eq!(ed.frames.len(), 1);
    assert_eq!(ed.panes.len(), 1);
    assert_eq!(cur_text(&ed), "");
    assert_eq!(ed.buffer_of(ed.cur_pane_id()).pane_refs, 1);
}

#[test]
fn scenario_gap_buffer_typing_and_undo() {
    let mut ed = editor();
    type_str(&mut ed, "abc");
    key(&mut ed, KeyPress::ctrl('b'));
    key(&mut ed, KeyPress::ctrl('b'));
    type_str(&mut ed, "d");
    assert_eq!(cur_text(&ed), "adbc");
    assert_eq!(ed.buffer_of(ed.cur_pane_id()).len(), 4);
    assert_eq!(cur_cursor(&ed), 2);

    key(&mut ed, KeyPress::ctrl('_'));
    assert_eq!(cur_text(&ed), "abc");
    assert_eq!(cur_cursor(&ed), 1);

    key(&mut ed, KeyPress::ctrl('_'));
    assert_eq!(cur_text(&ed), "");
    assert_eq!(cur_cursor(&ed), 0);

    key(&mut ed, KeyPress::ctrl('_'));
    assert!(echo_text(&ed).contains("No further undo"));
}

#[test]
fn scenario_word_delete_coalesces_in_kill_ring() {
    let mut ed = editor();
    type_str(&mut ed, "one two three four");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 0;

    key(&mut ed, KeyPress::meta('d'));
    key(&mut ed, KeyPress::meta('d'));
    key(&mut ed, KeyPress::meta('d'));
    assert_eq!(ed.kill_ring.len(), 1, "three kills coalesced into one");
    assert_eq!(ed.kill_ring.yank(), Some(&b"one two three"[..]));
    assert_eq!(cur_text(&ed), " four");

    // A non-kill command breaks the chain; the next kill starts fresh
    key(&mut ed, KeyPress::ctrl('f'));
    key(&mut ed, KeyPress::meta('d'));
    assert_eq!(ed.kill_ring.len(), 2);
    assert_eq!(ed.kill_ring.yank(), Some(&b"four"[..]));
}

#[test]
fn scenario_undo_over_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabs.txt");
    std::fs::write(&path, b"a\tb\r\nc").unwrap();

    let mut ed = editor();
    ed.open_path(&path, false).unwrap();
    assert!(ed.query.is_some(), "filter offer is up");
    key(&mut ed, KeyPress::ch('y'));

    assert_eq!(cur_text(&ed), "a       b\nc");
    let buf = ed.buffer_of(ed.cur_pane_id());
    assert!(buf.filtered);
    assert!(buf.is_modified());

    // Later edits undo; the filter itself does not
    type_str(&mut ed, "X");
    key(&mut ed, KeyPress::ctrl('_'));
    assert_eq!(cur_text(&ed), "a       b\nc");
    key(&mut ed, KeyPress::ctrl('_'));
    assert!(echo_text(&ed).contains("No further undo"));
    assert_eq!(cur_text(&ed), "a       b\nc");
}

#[test]
fn scenario_cross_pane_mutation() {
    let mut ed = editor();
    let line = "123456789\n";
    let content = line.repeat(30);
    let p1 = ed.cur_pane_id();
    ed.insert_text(p1, content.as_bytes()).unwrap();

    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('2'));
    let frame = ed.cur_frame();
    assert_eq!(frame.panes.len(), 2);
    let p2 = frame.panes[1];

    {
        let pane2 = ed.panes.get_mut(&p2).unwrap();
        pane2.viewport = 100;
        pane2.cursor = 150;
        pane2.rows_before_view = 10;
    }
    ed.panes.get_mut(&p1).unwrap().cursor = 50;

    ed.insert_text(p1, b"ABCDE").unwrap();
    assert_eq!(ed.panes[&p2].viewport, 105);
    assert_eq!(ed.panes[&p2].cursor, 155);

    // An insertion past both view positions leaves them alone
    ed.panes.get_mut(&p1).unwrap().cursor = 200;
    ed.insert_text(p1, b"ABCDE").unwrap();
    assert_eq!(ed.panes[&p2].viewport, 105);
    assert_eq!(ed.panes[&p2].cursor, 155);
}

#[test]
fn scenario_incremental_search_wrap() {
    let mut ed = editor();
    type_str(&mut ed, "foo bar foo");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 0;

    key(&mut ed, KeyPress::ctrl('s'));
    type_str(&mut ed, "foo");
    assert_eq!(ed.isearch.as_ref().unwrap().matched, Some(0));
    assert_eq!(cur_cursor(&ed), 3);

    key(&mut ed, KeyPress::ctrl('s'));
    assert_eq!(ed.isearch.as_ref().unwrap().matched, Some(8));
    assert_eq!(cur_cursor(&ed), 11);

    key(&mut ed, KeyPress::ctrl('s'));
    assert_eq!(echo_text(&ed), "Failing search: foo");
    assert!(ed.isearch.as_ref().unwrap().wrap_pending);

    key(&mut ed, KeyPress::ctrl('s'));
    assert_eq!(ed.isearch.as_ref().unwrap().matched, Some(0));
    assert_eq!(cur_cursor(&ed), 3);

    enter(&mut ed);
    assert!(ed.isearch.is_none());
    assert_eq!(cur_cursor(&ed), 3);
    assert_eq!(ed.buffer_of(pane).marks.top(), 0, "origin mark pushed");
}

#[test]
fn scenario_query_replace_chained_undo() {
    let mut ed = editor();
    type_str(&mut ed, "aaa");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 0;

    key(&mut ed, KeyPress::meta('%'));
    assert!(ed.query.is_some());
    type_str(&mut ed, "a");
    enter(&mut ed);
    type_str(&mut ed, "bb");
    enter(&mut ed);
    assert!(ed.query.is_some(), "disposition prompt is up");
    key(&mut ed, KeyPress::ch('!'));

    assert_eq!(cur_text(&ed), "bbbbbb");
    assert!(echo_text(&ed).contains("Replaced 3 occurrences"));

    key(&mut ed, KeyPress::ctrl('_'));
    assert_eq!(cur_text(&ed), "aaa", "one undo unwinds the whole replace-all");
}

#[test]
fn query_replace_interactive_dispositions() {
    let mut ed = editor();
    type_str(&mut ed, "x x x x");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 0;

    key(&mut ed, KeyPress::meta('%'));
    type_str(&mut ed, "x");
    enter(&mut ed);
    type_str(&mut ed, "y");
    enter(&mut ed);

    key(&mut ed, KeyPress::ch('y'));
    key(&mut ed, KeyPress::ch('n'));
    key(&mut ed, KeyPress::ch('.'));
    assert_eq!(cur_text(&ed), "y x y x");
    assert!(ed.qreplace.is_none());
    // The from-string entered the kill ring once
    assert_eq!(ed.kill_ring.len(), 1);
    assert_eq!(ed.kill_ring.yank(), Some(&b"x"[..]));
}

#[test]
fn boundary_messages_have_canonical_wording() {
    let mut ed = editor();
    key(&mut ed, KeyPress::ctrl('f'));
    assert_eq!(echo_text(&ed), "End of buffer");
    key(&mut ed, KeyPress::plain(KeyCode::Backspace));
    assert_eq!(echo_text(&ed), "Beginning of buffer");
}

#[test]
fn self_insert_honors_numeric_prefix() {
    let mut ed = editor();
    key(&mut ed, KeyPress::ctrl('u'));
    type_str(&mut ed, "z");
    assert_eq!(cur_text(&ed), "zzzz");

    // A sign flip with no digits leaves a negative count; self-insert
    // clamps it to a single character
    key(&mut ed, KeyPress::ctrl('u'));
    type_str(&mut ed, "-");
    assert_eq!(cur_text(&ed), "zzzz", "minus was a prefix key, not input");
    type_str(&mut ed, "q");
    assert_eq!(cur_text(&ed), "zzzzq");
}

#[test]
fn kill_line_appends_on_repeat_and_yanks_back() {
    let mut ed = editor();
    type_str(&mut ed, "first\nsecond\nthird");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 0;

    key(&mut ed, KeyPress::ctrl('k'));
    assert_eq!(ed.kill_ring.yank(), Some(&b"first"[..]));
    key(&mut ed, KeyPress::ctrl('k'));
    assert_eq!(ed.kill_ring.yank(), Some(&b"first\n"[..]));
    assert_eq!(cur_text(&ed), "second\nthird");

    key(&mut ed, KeyPress::ctrl('y'));
    assert_eq!(cur_text(&ed), "first\nsecond\nthird");
}

#[test]
fn yank_pop_cycles_older_kills() {
    let mut ed = editor();
    type_str(&mut ed, "alpha beta");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 0;

    key(&mut ed, KeyPress::meta('d'));
    key(&mut ed, KeyPress::ctrl('f'));
    key(&mut ed, KeyPress::meta('d'));
    // Killed "alpha" then "beta"; buffer holds " "
    assert_eq!(ed.kill_ring.len(), 2);
    assert_eq!(cur_text(&ed), " ");

    key(&mut ed, KeyPress::ctrl('y'));
    assert_eq!(cur_text(&ed), " beta");
    key(&mut ed, KeyPress::meta('y'));
    assert_eq!(cur_text(&ed), " alpha");
}

#[test]
fn selection_kill_and_exchange() {
    let mut ed = editor();
    type_str(&mut ed, "pick this up");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 5;

    key(&mut ed, KeyPress::ctrl(' '));
    assert!(ed.selection.is_some());
    ed.panes.get_mut(&pane).unwrap().cursor = 9;

    // Exchange swaps cursor and mark
    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ctrl('x'));
    assert_eq!(cur_cursor(&ed), 5);

    ed.panes.get_mut(&pane).unwrap().cursor = 10;
    key(&mut ed, KeyPress::ctrl('w'));
    assert_eq!(cur_text(&ed), "pick up");
    assert_eq!(ed.kill_ring.yank(), Some(&b"this "[..]));
    assert!(ed.selection.is_none());
}

#[test]
fn typing_replaces_active_selection_in_one_undo_step() {
    let mut ed = editor();
    type_str(&mut ed, "keep DELETE keep");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 5;
    key(&mut ed, KeyPress::ctrl(' '));
    ed.panes.get_mut(&pane).unwrap().cursor = 11;

    type_str(&mut ed, "X");
    assert_eq!(cur_text(&ed), "keep X keep");

    key(&mut ed, KeyPress::ctrl('_'));
    assert_eq!(cur_text(&ed), "keep DELETE keep");
}

#[test]
fn split_inherits_view_and_other_pane_cycles() {
    let mut ed = editor();
    type_str(&mut ed, "some text");
    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('2'));
    assert_eq!(ed.cur_frame().panes.len(), 2);
    let p1 = ed.cur_frame().panes[0];
    let p2 = ed.cur_frame().panes[1];
    assert_eq!(ed.panes[&p1].buffer, ed.panes[&p2].buffer);
    assert_eq!(ed.buffer_of(p1).pane_refs, 2);

    let before = ed.cur_pane_id();
    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('o'));
    assert_ne!(ed.cur_pane_id(), before);

    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('0'));
    assert_eq!(ed.cur_frame().panes.len(), 1);
    assert_eq!(ed.buffer_of(ed.cur_pane_id()).pane_refs, 1);
}

#[test]
fn killing_last_pane_kills_frame_and_last_frame_quits() {
    let mut ed = editor();
    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('0'));
    assert!(ed.should_quit, "destroying the last frame ends the program");
}

#[test]
fn new_frame_and_cycling() {
    let mut ed = editor();
    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('5'));
    key(&mut ed, KeyPress::ch('2'));
    assert_eq!(ed.frames.len(), 2);
    let second = ed.current_frame;

    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('5'));
    key(&mut ed, KeyPress::ch('o'));
    assert_ne!(ed.current_frame, second);

    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('5'));
    key(&mut ed, KeyPress::ch('1'));
    assert_eq!(ed.frames.len(), 1);
}

#[test]
fn undefined_key_reports_in_echo() {
    let mut ed = editor();
    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('z'));
    assert!(echo_text(&ed).contains("Undefined key"));
    assert_eq!(cur_text(&ed), "", "no mutation happened");
}

#[test]
fn save_and_reload_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");

    let mut ed = editor();
    type_str(&mut ed, "saved content");
    ed.write_current_buffer(&path).unwrap();
    let buf = ed.buffer_of(ed.cur_pane_id());
    assert!(!buf.is_modified());
    assert_eq!(buf.file_name, "note.txt");

    assert_eq!(std::fs::read(&path).unwrap(), b"saved content");
}

#[test]
fn find_file_via_query_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.txt");
    std::fs::write(&path, b"from disk").unwrap();

    let mut ed = editor();
    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ctrl('f'));
    assert!(ed.query.is_some());
    // Replace the seeded default directory wholesale
    ed.query.as_mut().unwrap().clear();
    type_str(&mut ed, path.to_str().unwrap());
    enter(&mut ed);
    assert_eq!(cur_text(&ed), "from disk");
}

#[test]
fn switch_buffer_restores_cached_view() {
    let mut ed = editor();
    type_str(&mut ed, "first buffer");
    let pane = ed.cur_pane_id();
    let first = ed.panes[&pane].buffer;
    ed.buffers.get_mut(&first).unwrap().file_name = "first".into();

    let second = ed.create_buffer();
    ed.buffers.get_mut(&second).unwrap().file_name = "second".into();
    ed.panes.get_mut(&pane).unwrap().cursor = 5;
    ed.show_buffer_in_pane(pane, second);
    assert_eq!(cur_text(&ed), "");

    ed.show_buffer_in_pane(pane, first);
    assert_eq!(cur_text(&ed), "first buffer");
    assert_eq!(cur_cursor(&ed), 5, "cached cursor restored");
}

#[test]
fn mouse_click_moves_cursor_and_drag_selects() {
    let mut ed = editor();
    type_str(&mut ed, "clickable text here");
    ed.handle_event(HostEvent::Mouse(crate::host::MouseEvent {
        kind: crate::host::MouseKind::Press,
        row: 0,
        col: 4,
    }));
    assert_eq!(cur_cursor(&ed), 4);
    ed.handle_event(HostEvent::Mouse(crate::host::MouseEvent {
        kind: crate::host::MouseKind::Drag,
        row: 0,
        col: 9,
    }));
    ed.handle_event(HostEvent::Mouse(crate::host::MouseEvent {
        kind: crate::host::MouseKind::Release,
        row: 0,
        col: 9,
    }));
    let sel = ed.selection.expect("drag made a selection");
    assert_eq!(sel.range(cur_cursor(&ed)), (4, 9));
}

#[test]
fn focus_loss_parks_selection_and_refocus_restores() {
    let mut ed = editor();
    type_str(&mut ed, "held");
    let pane = ed.cur_pane_id();
    ed.set_selection(pane, 0);

    ed.handle_event(HostEvent::FocusOut);
    assert!(ed.selection.is_none());
    ed.handle_event(HostEvent::FocusIn);
    assert!(ed.selection.is_some());
}

#[test]
fn ctrl_g_aborts_in_precedence_order() {
    let mut ed = editor();
    type_str(&mut ed, "abc");

    // Mini-query first
    key(&mut ed, KeyPress::meta('x'));
    assert!(ed.query.is_some());
    key(&mut ed, KeyPress::ctrl('g'));
    assert!(ed.query.is_none());

    // Then incremental search, cursor restored to the origin
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 0;
    key(&mut ed, KeyPress::ctrl('s'));
    type_str(&mut ed, "b");
    assert_eq!(cur_cursor(&ed), 2);
    key(&mut ed, KeyPress::ctrl('g'));
    assert!(ed.isearch.is_none());
    assert_eq!(cur_cursor(&ed), 0);

    // Then an in-progress key sequence
    key(&mut ed, KeyPress::ctrl('x'));
    assert!(ed.dispatch.in_progress());
    key(&mut ed, KeyPress::ctrl('g'));
    assert!(!ed.dispatch.in_progress());
}

#[test]
fn resize_rewraps_viewports() {
    let mut ed = editor();
    let long = "abcdefghij".repeat(20);
    type_str(&mut ed, &long);
    ed.handle_event(HostEvent::Resize { rows: 24, cols: 40 });
    let pane = ed.cur_pane_id();
    let row_chars = ed.cur_frame().row_chars();
    assert_eq!(row_chars, 38);
    let viewport = ed.panes[&pane].viewport;
    let text = ed.buffer_of(pane).text();
    assert!(crate::layout::is_row_start(text, viewport, row_chars));
}

#[test]
fn external_clipboard_yank_enters_ring_at_pop() {
    let mut ed = editor();
    // Another client owns the clipboard and answers our paste request
    ed.kill_ring.kill(b"ours");
    ed.clipboard.clipboard_owned = false;
    ed.host.push_event(HostEvent::PasteData {
        data: b"theirs".to_vec(),
        more: false,
    });
    key(&mut ed, KeyPress::ctrl('y'));
    assert_eq!(cur_text(&ed), "theirs");
    assert_eq!(ed.kill_ring.len(), 1, "ring untouched at yank time");

    key(&mut ed, KeyPress::meta('y'));
    assert_eq!(ed.kill_ring.len(), 2, "external text entered at pop time");
    assert_eq!(cur_text(&ed), "ours");
}

#[test]
fn selection_request_served_from_kill_ring() {
    let mut ed = editor();
    type_str(&mut ed, "take this");
    let pane = ed.cur_pane_id();
    ed.panes.get_mut(&pane).unwrap().cursor = 0;
    key(&mut ed, KeyPress::ctrl(' '));
    ed.panes.get_mut(&pane).unwrap().cursor = 4;
    key(&mut ed, KeyPress::ctrl('w'));

    ed.handle_event(HostEvent::SelectionRequest {
        which: crate::host::ClipSelection::Clipboard,
        req: 42,
    });
    assert!(ed.host.ops.iter().any(|op| matches!(
        op,
        crate::host::scripted::HostOp::SendSelection { req: 42, data } if data == b"take"
    )));
}

#[test]
fn draw_paints_text_mode_line_and_echo() {
    let mut ed = editor();
    type_str(&mut ed, "visible words");
    key(&mut ed, KeyPress::ctrl('x'));
    key(&mut ed, KeyPress::ch('2'));
    ed.host.clear_ops();
    ed.draw().unwrap();
    let drawn = ed.host.drawn_text();
    assert!(drawn.contains("visible words"));
    assert!(drawn.contains("*scratch*"), "mode line shows the buffer name");
}

#[test]
fn goto_line_via_prefix() {
    let mut ed = editor();
    type_str(&mut ed, "one\ntwo\nthree\nfour");
    key(&mut ed, KeyPress::meta('3'));
    key(&mut ed, KeyPress::meta('g'));
    assert_eq!(cur_cursor(&ed), 8, "line 3 starts after two newlines");
}

#[test]
fn help_opens_read_only_info_buffer() {
    let mut ed = editor();
    ed.execute_named("help").unwrap();
    let buf = ed.buffer_of(ed.cur_pane_id());
    assert!(buf.read_only);
    assert!(buf.info_only);
    let text = cur_text(&ed);
    assert!(text.contains("forward-char"));
    assert!(text.contains("query-replace"));
}
