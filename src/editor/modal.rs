//! Mini-query routing and the query-replace driver
//!
//! A mini-query's meaning lives in its `QueryKind`; submission funnels
//! through one interpreter here. Query-replace layers over search: each
//! match raises a letter-mode disposition query, and the `!`/`i` answers
//! drain the rest in a loop that pumps the event queue periodically so
//! clipboard requests stay serviced.

use std::path::PathBuf;

use tracing::debug;

use crate::buffer::BufferId;
use crate::constants::{errors, replace as replace_consts};
use crate::error::{ErrorType, QuillError, Result};
use crate::file_ops;
use crate::host::HostEnv;
use crate::key::{KeyCode, KeyPress};
use crate::query::{MiniQuery, QueryKind, QueryType};
use crate::search::{self, ReplaceState, FORWARD};

use super::Editor;

impl<H: HostEnv> Editor<H> {
    /// Open a mini-query owned by the current pane
    pub fn open_query(
        &mut self,
        prompt: impl Into<String>,
        initial: impl Into<String>,
        qtype: QueryType,
        kind: QueryKind,
    ) {
        let pane = self.cur_pane_id();
        let query = MiniQuery::new(pane, prompt, initial, qtype, kind);
        self.cur_frame_mut().echo.prompt(String::new());
        self.query = Some(query);
    }

    /// Ctrl+G or focus loss kills the dialog and restores the echo state
    pub fn abort_query(&mut self) {
        if let Some(query) = self.query.take() {
            // Per-dialog resources go with the dialog
            match query.kind {
                QueryKind::ConfirmFilter => {
                    self.pending_load = None;
                }
                QueryKind::ReplaceChoice | QueryKind::ReplaceFrom | QueryKind::ReplaceTo { .. } => {
                    self.finish_replace();
                }
                _ => {}
            }
            self.cur_frame_mut().echo.clear();
        }
    }

    pub fn query_key(&mut self, press: KeyPress) {
        let qtype = self.query.as_ref().unwrap().qtype;
        if press.ctrl && !press.meta && press.code == KeyCode::Char('g') {
            self.abort_query();
            self.echo_message("Quit");
            return;
        }
        match qtype {
            QueryType::Letter => self.letter_query_key(press),
            QueryType::Str => self.string_query_key(press),
        }
    }

    fn letter_query_key(&mut self, press: KeyPress) {
        let c = match press.code {
            KeyCode::Char(c) if press.is_plain_printable() => c,
            KeyCode::Enter => '\r',
            KeyCode::Backspace => '\x08',
            KeyCode::Delete => '\x7f',
            _ => {
                self.flash();
                return;
            }
        };
        if let Err(err) = self.submit_letter(c) {
            self.report(err);
        }
    }

    fn string_query_key(&mut self, press: KeyPress) {
        let Some(query) = self.query.as_mut() else {
            return;
        };
        if press.ctrl && !press.meta {
            match press.code {
                KeyCode::Char('b') => query.left(),
                KeyCode::Char('f') => query.right(),
                KeyCode::Char('a') => query.home(),
                KeyCode::Char('e') => query.end(),
                KeyCode::Char('d') => query.delete_forward(),
                KeyCode::Char('k') => {
                    let mut q = self.query.take().unwrap();
                    q.kill_to_end(&mut self.kill_ring);
                    self.query = Some(q);
                }
                KeyCode::Char('y') => {
                    let mut q = self.query.take().unwrap();
                    q.yank(&mut self.kill_ring);
                    self.query = Some(q);
                }
                KeyCode::Char('u') => query.clear(),
                _ => self.flash(),
            }
            return;
        }
        if press.meta && !press.ctrl {
            match press.code {
                KeyCode::Char('f') => query.word_right(),
                KeyCode::Char('b') => query.word_left(),
                KeyCode::Char('d') => query.delete_word_forward(),
                KeyCode::Backspace => query.delete_word_back(),
                KeyCode::Char('y') => {
                    let mut q = self.query.take().unwrap();
                    if !q.yank_pop(&mut self.kill_ring) {
                        self.query = Some(q);
                        self.flash();
                        return;
                    }
                    self.query = Some(q);
                }
                _ => self.flash(),
            }
            return;
        }
        match press.code {
            KeyCode::Char(c) if press.is_plain_printable() => query.insert_char(c),
            KeyCode::Left => query.left(),
            KeyCode::Right => query.right(),
            KeyCode::Home => query.home(),
            KeyCode::End => query.end(),
            KeyCode::Backspace => query.delete_back(),
            KeyCode::Delete => query.delete_forward(),
            KeyCode::Tab => self.complete_query(),
            KeyCode::Enter => {
                let query = self.query.take().unwrap();
                self.cur_frame_mut().echo.clear();
                if let Err(err) = self.submit_string(query.kind, query.response) {
                    self.report(err);
                }
            }
            _ => self.flash(),
        }
    }

    /// Auto-complete rewrites the response from a kind-specific lookup
    fn complete_query(&mut self) {
        let Some(query) = self.query.as_mut() else {
            return;
        };
        let completed = match &query.kind {
            QueryKind::NamedCommand => self.registry.complete(&query.response),
            QueryKind::SwitchBuffer | QueryKind::KillBuffer => {
                complete_from(&query.response, self.buffers.values().map(|b| b.file_name.as_str()))
            }
            QueryKind::SetOption { name: None } => {
                complete_from(&query.response, crate::settings::Settings::names().iter().copied())
            }
            QueryKind::FindFile { .. } | QueryKind::InsertFile | QueryKind::WriteFile => {
                complete_path(&query.response)
            }
            _ => None,
        };
        match completed {
            Some(extended) => {
                query.response = extended;
                query.end();
            }
            None => self.flash(),
        }
    }

    // ------------------------------------------------------------------
    // Submission

    fn submit_letter(&mut self, c: char) -> Result<()> {
        let kind = self.query.as_ref().unwrap().kind.clone();
        match kind {
            QueryKind::ReplaceChoice => self.replace_choice(c),
            QueryKind::ConfirmFilter => match c {
                'y' | 'n' => {
                    self.query = None;
                    let pending = self.pending_load.take().ok_or_else(state_error)?;
                    self.finish_load(pending.path, pending.bytes, c == 'y', pending.new_frame)
                }
                _ => {
                    self.flash();
                    Ok(())
                }
            },
            QueryKind::ConfirmOverwriteFiltered { path } => match c {
                'y' => {
                    self.query = None;
                    self.write_current_buffer(&path)
                }
                'n' => {
                    self.query = None;
                    self.echo_message("Save cancelled");
                    Ok(())
                }
                _ => {
                    self.flash();
                    Ok(())
                }
            },
            QueryKind::ConfirmKillBuffer { buffer } => match c {
                'y' => {
                    self.query = None;
                    self.kill_buffer_now(buffer)
                }
                'n' => {
                    self.query = None;
                    self.echo_message("Kept buffer");
                    Ok(())
                }
                _ => {
                    self.flash();
                    Ok(())
                }
            },
            QueryKind::ConfirmSaveSome { queue, then_quit } => {
                self.save_some_step(c, queue, then_quit)
            }
            _ => {
                self.flash();
                Ok(())
            }
        }
    }

    fn submit_string(&mut self, kind: QueryKind, response: String) -> Result<()> {
        match kind {
            QueryKind::FindFile { new_frame } => {
                if response.is_empty() {
                    return Ok(());
                }
                self.open_path(&PathBuf::from(response), new_frame)
            }
            QueryKind::InsertFile => {
                let loaded = file_ops::read_file(&PathBuf::from(response))?;
                let pane = self.cur_pane_id();
                self.insert_text(pane, &loaded.bytes)
            }
            QueryKind::WriteFile => {
                let path = PathBuf::from(response);
                self.write_current_buffer(&path)
            }
            QueryKind::SwitchBuffer => {
                let target = self
                    .buffers
                    .values()
                    .find(|b| b.file_name == response || b.display_name() == response)
                    .map(|b| b.id)
                    .ok_or_else(|| {
                        QuillError::new(
                            ErrorType::Dialog,
                            errors::BAD_RESPONSE,
                            format!("No buffer named {}", response),
                        )
                    })?;
                let pane = self.cur_pane_id();
                self.show_buffer_in_pane(pane, target);
                Ok(())
            }
            QueryKind::KillBuffer => {
                let target = self
                    .buffers
                    .values()
                    .find(|b| b.file_name == response || b.display_name() == response)
                    .map(|b| (b.id, b.is_modified()))
                    .ok_or_else(|| {
                        QuillError::new(
                            ErrorType::Dialog,
                            errors::BAD_RESPONSE,
                            format!("No buffer named {}", response),
                        )
                    })?;
                if target.1 {
                    self.open_query(
                        format!("{} is modified; kill anyway? [y n] ", response),
                        "",
                        QueryType::Letter,
                        QueryKind::ConfirmKillBuffer { buffer: target.0 },
                    );
                    Ok(())
                } else {
                    self.kill_buffer_now(target.0)
                }
            }
            QueryKind::GotoLine => {
                let line: usize = response.parse().map_err(|_| bad_number(&response))?;
                let pane = self.cur_pane_id();
                let buffer = self.panes[&pane].buffer;
                let pos = {
                    let text = self.buffers[&buffer].text();
                    let mut pos = 0;
                    for _ in 1..line.max(1) {
                        let end = text.line_end(pos);
                        if end >= text.len() {
                            pos = text.line_start(text.len());
                            break;
                        }
                        pos = end + 1;
                    }
                    pos
                };
                self.panes.get_mut(&pane).unwrap().cursor = pos;
                self.contain_pane_cursor(pane);
                Ok(())
            }
            QueryKind::GotoChar => {
                let at: usize = response.parse().map_err(|_| bad_number(&response))?;
                let pane = self.cur_pane_id();
                let len = self.buffer_of(pane).len();
                self.panes.get_mut(&pane).unwrap().cursor = at.min(len);
                self.contain_pane_cursor(pane);
                Ok(())
            }
            QueryKind::NamedCommand => {
                if response.is_empty() {
                    return Ok(());
                }
                self.execute_named(&response)
            }
            QueryKind::SetOption { name: None } => {
                if response.is_empty() {
                    return Ok(());
                }
                self.open_query(
                    format!("Set {} to: ", response),
                    "",
                    QueryType::Str,
                    QueryKind::SetOption {
                        name: Some(response),
                    },
                );
                Ok(())
            }
            QueryKind::SetOption { name: Some(name) } => self
                .settings
                .set(&name, &response)
                .map_err(|msg| QuillError::new(ErrorType::Dialog, errors::BAD_RESPONSE, msg)),
            QueryKind::ReplaceFrom => {
                let from = if response.is_empty() {
                    self.prev_from.clone()
                } else {
                    response
                };
                if from.is_empty() {
                    return Ok(());
                }
                let initial = self.prev_to.clone();
                self.open_query(
                    format!("Replace {} with: ", from),
                    initial,
                    QueryType::Str,
                    QueryKind::ReplaceTo { from },
                );
                Ok(())
            }
            QueryKind::ReplaceTo { from } => {
                self.prev_from = from.clone();
                self.prev_to = response.clone();
                let pane = self.cur_pane_id();
                self.qreplace = Some(ReplaceState::new(
                    pane,
                    from.into_bytes(),
                    response.into_bytes(),
                ));
                self.replace_advance();
                Ok(())
            }
            QueryKind::ReplaceChoice
            | QueryKind::ConfirmFilter
            | QueryKind::ConfirmOverwriteFiltered { .. }
            | QueryKind::ConfirmKillBuffer { .. }
            | QueryKind::ConfirmSaveSome { .. } => Err(state_error()),
        }
    }

    // ------------------------------------------------------------------
    // Buffer bookkeeping used by submissions

    /// Write the current pane's buffer to `path` and mark it saved
    pub fn write_current_buffer(&mut self, path: &std::path::Path) -> Result<()> {
        let pane = self.cur_pane_id();
        let buffer = self.panes[&pane].buffer;
        {
            let buf = &self.buffers[&buffer];
            let parts = buf.text().slices(0, buf.len());
            file_ops::write_file(path, parts)?;
        }
        let (name, dir) = file_ops::split_path(path);
        let buf = self.buffers.get_mut(&buffer).unwrap();
        buf.file_name = name;
        buf.dir_path = dir;
        buf.filtered = false;
        buf.note_saved();
        self.echo_message(format!("Wrote {}", path.display()));
        Ok(())
    }

    /// Destroy a buffer; panes showing it fall back to a scratch buffer
    pub fn kill_buffer_now(&mut self, buffer: BufferId) -> Result<()> {
        let showing: Vec<_> = self
            .panes
            .values()
            .filter(|p| p.buffer == buffer)
            .map(|p| p.id)
            .collect();
        if !showing.is_empty() {
            let scratch = self.create_buffer();
            for pane in showing {
                self.show_buffer_in_pane(pane, scratch);
            }
        }
        self.buffers.remove(&buffer);
        self.clipboard.note_buffer_killed(&mut self.host, buffer);
        debug!(buffer, "killed buffer");
        Ok(())
    }

    /// One y/n step of save-some-files
    fn save_some_step(
        &mut self,
        c: char,
        mut queue: Vec<BufferId>,
        then_quit: bool,
    ) -> Result<()> {
        let Some(&head) = queue.first() else {
            self.query = None;
            return Ok(());
        };
        match c {
            'y' => {
                queue.remove(0);
                self.query = None;
                let path = self
                    .buffers
                    .get(&head)
                    .and_then(|b| b.dir_path.clone().map(|d| d.join(&b.file_name)));
                if let Some(path) = path {
                    // Saving goes through the current pane's buffer, so
                    // point the helper at it directly
                    let parts_ok = {
                        let buf = &self.buffers[&head];
                        file_ops::write_file(&path, buf.text().slices(0, buf.len()))
                    };
                    parts_ok?;
                    self.buffers.get_mut(&head).unwrap().note_saved();
                }
            }
            'n' => {
                queue.remove(0);
                self.query = None;
            }
            _ => {
                self.flash();
                return Ok(());
            }
        }
        self.continue_save_some(queue, then_quit);
        Ok(())
    }

    /// Prompt for the next modified buffer, or finish (and maybe quit)
    pub fn continue_save_some(&mut self, queue: Vec<BufferId>, then_quit: bool) {
        match queue.first() {
            Some(&head) => {
                let name = self
                    .buffers
                    .get(&head)
                    .map(|b| b.display_name())
                    .unwrap_or_default();
                self.open_query(
                    format!("Save {}? [y n] ", name),
                    "",
                    QueryType::Letter,
                    QueryKind::ConfirmSaveSome { queue, then_quit },
                );
            }
            None => {
                self.echo_message("Done");
                if then_quit {
                    self.request_quit();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Query-replace

    /// Move to the next match of the from-string; prompt or finish
    pub fn replace_advance(&mut self) {
        let Some(state) = self.qreplace.as_ref() else {
            return;
        };
        let pane = state.pane;
        let from = state.from.clone();
        let buffer = self.panes[&pane].buffer;
        let cursor = self.panes[&pane].cursor;
        let found = {
            let text = self.buffers[&buffer].text();
            let fold = !from.iter().any(|b| b.is_ascii_uppercase());
            search::find(text, &from, cursor, FORWARD, fold)
        };
        match found {
            Some(at) => {
                self.panes.get_mut(&pane).unwrap().cursor = at + from.len();
                self.contain_pane_cursor(pane);
                self.open_query(
                    "Replace? [y n ! . <Ret>] ",
                    "",
                    QueryType::Letter,
                    QueryKind::ReplaceChoice,
                );
                if let Some(q) = self.qreplace.as_mut() {
                    q.at = Some(at);
                }
            }
            None => self.finish_replace(),
        }
    }

    fn replace_choice(&mut self, c: char) -> Result<()> {
        match c {
            'y' | ' ' => {
                self.query = None;
                self.replace_current()?;
                self.replace_advance();
                Ok(())
            }
            'n' | '\x08' | '\x7f' => {
                self.query = None;
                self.replace_advance();
                Ok(())
            }
            '.' => {
                self.query = None;
                self.replace_current()?;
                self.finish_replace();
                Ok(())
            }
            '!' => {
                self.query = None;
                if let Some(q) = self.qreplace.as_mut() {
                    q.replace_all = true;
                }
                self.replace_current()?;
                self.replace_rest(false)
            }
            'i' => {
                self.query = None;
                self.replace_current()?;
                self.replace_rest(true)
            }
            '\r' => {
                self.query = None;
                self.finish_replace();
                Ok(())
            }
            _ => {
                self.flash();
                Ok(())
            }
        }
    }

    /// Replace the match the prompt was standing on
    fn replace_current(&mut self) -> Result<()> {
        let (pane, from, to, at, first) = {
            let state = self.qreplace.as_ref().ok_or_else(state_error)?;
            let at = state.at.ok_or_else(state_error)?;
            (
                state.pane,
                state.from.clone(),
                state.to.clone(),
                at,
                state.count == 0,
            )
        };
        if first {
            // The from-string enters the kill ring once per session
            self.kill_ring.kill(&from);
        }
        let buffer = self.panes[&pane].buffer;
        self.buffers
            .get_mut(&buffer)
            .unwrap()
            .replace(at, from.len(), &to, !first)?;
        let delta_old = from.len();
        self.clipboard.note_delete(&mut self.host, buffer, at, delta_old);
        self.clipboard.note_insert(&mut self.host, buffer, at, to.len());
        self.adjust_replace_panes(buffer, at, delta_old, to.len());
        let state = self.qreplace.as_mut().unwrap();
        state.count += 1;
        state.at = None;
        let pane_ref = self.panes.get_mut(&pane).unwrap();
        pane_ref.cursor = at + to.len();
        self.refresh_buffer_panes(buffer);
        Ok(())
    }

    pub fn adjust_replace_panes(&mut self, buffer: BufferId, at: usize, old: usize, new: usize) {
        // A replace is a delete plus an insert at one position
        for pane in self.panes.values_mut() {
            if pane.buffer != buffer {
                continue;
            }
            for slot in [&mut pane.viewport, &mut pane.cursor] {
                if *slot >= at + old {
                    *slot = *slot - old + new;
                } else if *slot > at {
                    *slot = at;
                }
            }
            pane.invalidate_rows();
        }
    }

    /// Replace every remaining match. `show_each` redraws per replacement;
    /// either way the event queue is pumped periodically
    fn replace_rest(&mut self, show_each: bool) -> Result<()> {
        loop {
            let (pane, from) = {
                let state = self.qreplace.as_ref().ok_or_else(state_error)?;
                (state.pane, state.from.clone())
            };
            let buffer = self.panes[&pane].buffer;
            let cursor = self.panes[&pane].cursor;
            let found = {
                let text = self.buffers[&buffer].text();
                let fold = !from.iter().any(|b| b.is_ascii_uppercase());
                search::find(text, &from, cursor, FORWARD, fold)
            };
            let Some(at) = found else {
                break;
            };
            if let Some(q) = self.qreplace.as_mut() {
                q.at = Some(at);
            }
            self.replace_current()?;

            let count = self.qreplace.as_ref().map(|q| q.count).unwrap_or(0);
            if show_each {
                let _ = self.draw();
            }
            if count % replace_consts::YIELD_EVERY == 0 {
                self.pump_events();
            }
        }
        self.finish_replace();
        Ok(())
    }

    /// Close the replace session and report the tally
    pub fn finish_replace(&mut self) {
        if let Some(state) = self.qreplace.take() {
            self.echo_message(format!(
                "Replaced {} occurrence{}",
                state.count,
                if state.count == 1 { "" } else { "s" }
            ));
        }
    }
}

fn state_error() -> QuillError {
    QuillError::new(
        ErrorType::Internal,
        errors::INTERNAL_ERROR,
        "Dialog state out of step",
    )
}

fn bad_number(s: &str) -> QuillError {
    QuillError::new(
        ErrorType::Dialog,
        errors::BAD_RESPONSE,
        format!("Not a number: {}", s),
    )
}

fn complete_from<'a>(prefix: &str, names: impl Iterator<Item = &'a str>) -> Option<String> {
    let matches: Vec<&str> = names.filter(|n| n.starts_with(prefix)).collect();
    let first = matches.first()?;
    let mut common = first.len();
    for name in &matches[1..] {
        common = common.min(
            first
                .bytes()
                .zip(name.bytes())
                .take_while(|(a, b)| a == b)
                .count(),
        );
    }
    Some(first[..common].to_string())
}

/// Extend a path response by directory listing
fn complete_path(partial: &str) -> Option<String> {
    let path = PathBuf::from(partial);
    let (dir, stem) = if partial.ends_with('/') {
        (path.clone(), String::new())
    } else {
        (
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")),
            path.file_name()?.to_string_lossy().into_owned(),
        )
    };
    let entries: Vec<String> = std::fs::read_dir(&dir)
        .ok()?
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(&stem))
        .collect();
    let joined = complete_from(&stem, entries.iter().map(|s| s.as_str()))?;
    let mut out = dir.join(joined).to_string_lossy().into_owned();
    if std::path::Path::new(&out).is_dir() && !out.ends_with('/') {
        out.push('/');
    }
    Some(out)
}
