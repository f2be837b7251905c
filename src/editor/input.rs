//! Key routing
//!
//! Modal precedence for every press: pop-up list, mini-query,
//! incremental search, then the main dispatcher. Ctrl+G aborts whichever
//! layer owns the key.

use tracing::trace;

use crate::dispatch::{format_seq, Feed};
use crate::host::HostEnv;
use crate::key::{KeyCode, KeyPress};
use crate::search::{BACKWARD, FORWARD};

use super::Editor;

fn is_ctrl_g(press: &KeyPress) -> bool {
    press.ctrl && !press.meta && press.code == KeyCode::Char('g')
}

impl<H: HostEnv> Editor<H> {
    pub fn handle_key(&mut self, press: KeyPress) {
        if self.popup.is_some() {
            self.popup_key(press);
            return;
        }
        if self.query.is_some() {
            self.query_key(press);
            return;
        }
        if self.isearch.is_some() {
            if !self.isearch_key(press) {
                // The press ended the search; it still means something
                self.dispatch_key(press);
            }
            return;
        }
        self.dispatch_key(press);
    }

    fn dispatch_key(&mut self, press: KeyPress) {
        if is_ctrl_g(&press) {
            // Universal abort: command in progress, then the selection
            if self.dispatch.in_progress() {
                self.dispatch.reset();
            } else if self.selection.take().is_some() {
                self.clipboard.release_primary(&mut self.host);
            }
            self.echo_message("Quit");
            return;
        }

        let registry = &self.registry;
        let outcome = self.dispatch.feed(press, |seq| registry.match_seq(seq));
        match outcome {
            Feed::Execute(id) => {
                trace!(name = self.registry.name_of(id), "execute");
                let pane = self.cur_pane_id();
                self.cur_frame_mut().echo.clear();
                self.execute(id, pane);
            }
            Feed::SelfInsert(c) => {
                let pane = self.cur_pane_id();
                let amount = self.dispatch.prefix().amount().max(1) as usize;
                let mut bytes = Vec::new();
                let mut buf = [0u8; 4];
                for _ in 0..amount {
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                self.dispatch.reset();
                self.dispatch.last_command = None;
                let buffer = self.panes[&pane].buffer;
                if let Some(b) = self.buffers.get_mut(&buffer) {
                    b.undo.end_read();
                }
                if let Err(err) = self.insert_text(pane, &bytes) {
                    self.report(err);
                }
            }
            Feed::Undefined(seq) => {
                self.echo_error(format!("Undefined key: {}", format_seq(&seq)));
            }
            Feed::PrefixError => {
                self.echo_error("Numeric prefix too large");
            }
            Feed::Pending | Feed::PrefixKey => {
                if let Some(pending) = self.dispatch.pending_echo() {
                    self.cur_frame_mut().echo.prompt(pending);
                }
            }
        }
    }

    /// Handle a press while incremental search is active. Returns false
    /// when the press exits the search and must be re-dispatched.
    fn isearch_key(&mut self, press: KeyPress) -> bool {
        let pane_id = self.isearch.as_ref().unwrap().pane;

        if is_ctrl_g(&press) {
            // Abort without a mark, cursor back at the origin
            let state = self.isearch.take().unwrap();
            if !state.pattern.is_empty() {
                self.prev_search = state.pattern;
            }
            let origin = state.origin;
            self.panes.get_mut(&pane_id).unwrap().cursor = origin;
            self.contain_pane_cursor(pane_id);
            self.echo_message("Quit");
            return true;
        }

        if press.code == KeyCode::Enter && !press.ctrl && !press.meta {
            self.exit_isearch_with_mark();
            self.cur_frame_mut().echo.clear();
            return true;
        }

        if press.ctrl && !press.meta {
            match press.code {
                KeyCode::Char('s') => {
                    self.isearch_move(FORWARD);
                    return true;
                }
                KeyCode::Char('r') => {
                    self.isearch_move(BACKWARD);
                    return true;
                }
                KeyCode::Char('w') => {
                    let buffer = self.panes[&pane_id].buffer;
                    let state = self.isearch.as_mut().unwrap();
                    let buf = &self.buffers[&buffer];
                    state.extend_word(buf.text());
                    self.after_search_step();
                    return true;
                }
                _ => {}
            }
        }

        if press.code == KeyCode::Backspace && !press.ctrl && !press.meta {
            let buffer = self.panes[&pane_id].buffer;
            let state = self.isearch.as_mut().unwrap();
            let buf = &self.buffers[&buffer];
            state.backspace(buf.text());
            self.after_search_step();
            return true;
        }

        if press.is_plain_printable() {
            if let KeyCode::Char(c) = press.code {
                let mut bytes = [0u8; 4];
                let encoded = c.encode_utf8(&mut bytes).as_bytes().to_vec();
                let buffer = self.panes[&pane_id].buffer;
                let state = self.isearch.as_mut().unwrap();
                let buf = &self.buffers[&buffer];
                state.push_bytes(buf.text(), &encoded);
                self.after_search_step();
                return true;
            }
        }

        // Anything else exits the search and is processed normally
        self.exit_isearch_with_mark();
        false
    }

    /// Advance the active search in `dir`
    pub(super) fn isearch_move(&mut self, dir: i32) {
        let pane_id = self.isearch.as_ref().unwrap().pane;
        let buffer = self.panes[&pane_id].buffer;
        {
            let state = self.isearch.as_mut().unwrap();
            let buf = &self.buffers[&buffer];
            state.advance(buf.text(), dir);
        }
        self.after_search_step();
    }

    /// Sync cursor and echo after any search-state change
    fn after_search_step(&mut self) {
        let state = self.isearch.as_ref().unwrap();
        let pane_id = state.pane;
        let pattern = String::from_utf8_lossy(&state.pattern).into_owned();
        let (target, failing) = match state.matched {
            Some(m) => {
                let end = m + state.pattern.len();
                (Some(if state.dir == FORWARD { end } else { m }), state.wrap_pending)
            }
            None => (None, !state.pattern.is_empty()),
        };
        let backward = state.dir == BACKWARD;

        if let Some(pos) = target {
            self.panes.get_mut(&pane_id).unwrap().cursor = pos;
            self.contain_pane_cursor(pane_id);
        }
        let label = if failing {
            format!("Failing search: {}", pattern)
        } else if backward {
            format!("I-search backward: {}", pattern)
        } else {
            format!("I-search: {}", pattern)
        };
        self.cur_frame_mut().echo.prompt(label);
    }

    /// Leave search mode, pushing the origin as a mark
    pub(super) fn exit_isearch_with_mark(&mut self) {
        if let Some(state) = self.isearch.take() {
            if !state.pattern.is_empty() {
                self.prev_search = state.pattern.clone();
            }
            let buffer = self.panes[&state.pane].buffer;
            if let Some(buf) = self.buffers.get_mut(&buffer) {
                buf.marks.push(state.origin);
            }
        }
    }

    fn popup_key(&mut self, press: KeyPress) {
        if is_ctrl_g(&press) || press.code == KeyCode::Escape {
            if let Some(mut popup) = self.popup.take() {
                popup.provider.exit(self);
            }
            return;
        }
        match press.code {
            KeyCode::Up => {
                if let Some(popup) = self.popup.as_mut() {
                    popup.up();
                }
            }
            KeyCode::Down => {
                if let Some(popup) = self.popup.as_mut() {
                    popup.down();
                }
            }
            KeyCode::Enter => {
                if let Some(mut popup) = self.popup.take() {
                    let chosen = popup.selected;
                    if let Err(err) = popup.provider.submit(self, chosen) {
                        self.report(err);
                    }
                    popup.provider.exit(self);
                }
            }
            _ => {}
        }
    }
}
