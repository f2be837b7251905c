//! Mini-query: the single-line prompt/response editor in the echo line
//!
//! Letter-mode queries submit every keypress immediately; string-mode
//! queries edit a response with the usual cursor, word, kill, and yank
//! commands, sharing the global kill ring. What a submitted response
//! *means* is a `QueryKind` the editor interprets. Horizontal auto-scroll
//! keeps the cursor visible with a small context margin on either side.

use std::path::PathBuf;

use crate::buffer::BufferId;
use crate::constants::query::SCROLL_CONTEXT;
use crate::kill_ring::KillRing;
use crate::pane::PaneId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// Single letters, submitted as they are typed
    Letter,
    /// A full string, submitted with Return
    Str,
}

/// What the editor does with the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    FindFile { new_frame: bool },
    InsertFile,
    WriteFile,
    SwitchBuffer,
    KillBuffer,
    GotoLine,
    GotoChar,
    NamedCommand,
    SetOption { name: Option<String> },
    ReplaceFrom,
    ReplaceTo { from: String },
    /// Per-match disposition inside query-replace
    ReplaceChoice,
    /// y/n overwrite confirmation for a filtered buffer
    ConfirmOverwriteFiltered { path: PathBuf },
    /// y/n kill confirmation for a modified buffer
    ConfirmKillBuffer { buffer: BufferId },
    /// y/n per-buffer prompt of save-some-files
    ConfirmSaveSome { queue: Vec<BufferId>, then_quit: bool },
    /// y/n filter offer after loading a file with CR/TAB bytes
    ConfirmFilter,
}

/// The last mini-query command, for yank-pop detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrCmd {
    Yank,
    Other,
}

pub struct MiniQuery {
    pub pane: PaneId,
    pub prompt: String,
    pub response: String,
    pub qtype: QueryType,
    pub kind: QueryKind,
    /// Byte index into the response
    pub cursor: usize,
    /// First visible character
    pub scroll: usize,
    pub last_cmd: Option<QrCmd>,
    /// Position and byte length of the last yank, for yank-pop
    pub last_yank: Option<(usize, usize)>,
}

impl MiniQuery {
    pub fn new(
        pane: PaneId,
        prompt: impl Into<String>,
        initial: impl Into<String>,
        qtype: QueryType,
        kind: QueryKind,
    ) -> Self {
        let response = initial.into();
        let cursor = response.len();
        MiniQuery {
            pane,
            prompt: prompt.into(),
            response,
            qtype,
            kind,
            cursor,
            scroll: 0,
            last_cmd: None,
            last_yank: None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.response.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.note(QrCmd::Other);
    }

    pub fn left(&mut self) {
        self.cursor = prev_char(&self.response, self.cursor);
        self.note(QrCmd::Other);
    }

    pub fn right(&mut self) {
        self.cursor = next_char(&self.response, self.cursor);
        self.note(QrCmd::Other);
    }

    pub fn word_left(&mut self) {
        self.cursor = prev_word(&self.response, self.cursor);
        self.note(QrCmd::Other);
    }

    pub fn word_right(&mut self) {
        self.cursor = next_word(&self.response, self.cursor);
        self.note(QrCmd::Other);
    }

    pub fn home(&mut self) {
        self.cursor = 0;
        self.note(QrCmd::Other);
    }

    pub fn end(&mut self) {
        self.cursor = self.response.len();
        self.note(QrCmd::Other);
    }

    pub fn delete_back(&mut self) {
        let prev = prev_char(&self.response, self.cursor);
        if prev < self.cursor {
            self.response.drain(prev..self.cursor);
            self.cursor = prev;
        }
        self.note(QrCmd::Other);
    }

    pub fn delete_forward(&mut self) {
        let next = next_char(&self.response, self.cursor);
        if next > self.cursor {
            self.response.drain(self.cursor..next);
        }
        self.note(QrCmd::Other);
    }

    /// Delete back one word; the removed text is not killed
    pub fn delete_word_back(&mut self) {
        let at = prev_word(&self.response, self.cursor);
        self.response.drain(at..self.cursor);
        self.cursor = at;
        self.note(QrCmd::Other);
    }

    pub fn delete_word_forward(&mut self) {
        let to = next_word(&self.response, self.cursor);
        self.response.drain(self.cursor..to);
        self.note(QrCmd::Other);
    }

    /// Kill to end of response, saving to the shared kill ring
    pub fn kill_to_end(&mut self, ring: &mut KillRing) {
        if self.cursor < self.response.len() {
            let tail: String = self.response.drain(self.cursor..).collect();
            ring.kill(tail.as_bytes());
        }
        self.note(QrCmd::Other);
    }

    pub fn clear(&mut self) {
        self.response.clear();
        self.cursor = 0;
        self.note(QrCmd::Other);
    }

    /// Insert the kill-ring top at the cursor
    pub fn yank(&mut self, ring: &mut KillRing) {
        ring.rewind_yank();
        let Some(bytes) = ring.yank() else {
            self.note(QrCmd::Other);
            return;
        };
        let s = String::from_utf8_lossy(bytes).into_owned();
        self.response.insert_str(self.cursor, &s);
        self.last_yank = Some((self.cursor, s.len()));
        self.cursor += s.len();
        self.note(QrCmd::Yank);
    }

    /// Replace the last yank with the next older kill; only runs straight
    /// after a yank
    pub fn yank_pop(&mut self, ring: &mut KillRing) -> bool {
        if self.last_cmd != Some(QrCmd::Yank) {
            return false;
        }
        let Some((at, old_len)) = self.last_yank else {
            return false;
        };
        let Some(bytes) = ring.yank_pop().map(|b| b.to_vec()) else {
            return false;
        };
        let s = String::from_utf8_lossy(&bytes).into_owned();
        self.response.drain(at..at + old_len);
        self.response.insert_str(at, &s);
        self.last_yank = Some((at, s.len()));
        self.cursor = at + s.len();
        self.note(QrCmd::Yank);
        true
    }

    fn note(&mut self, cmd: QrCmd) {
        self.last_cmd = Some(cmd);
    }

    /// Visible character window and hidden-text tick marks for a response
    /// area `width` columns wide. Keeps a margin of context around the
    /// cursor and returns (first_char, tick_left, tick_right).
    pub fn scroll_window(&mut self, width: usize) -> (usize, bool, bool) {
        let total: usize = self.response.chars().count();
        let cursor_chars = self.response[..self.cursor].chars().count();
        if width == 0 {
            return (0, false, total > 0);
        }
        let margin = SCROLL_CONTEXT.min(width / 2);

        if cursor_chars < self.scroll + margin {
            self.scroll = cursor_chars.saturating_sub(margin);
        } else if cursor_chars + margin > self.scroll + width {
            self.scroll = cursor_chars + margin - width;
        }
        if self.scroll + width > total {
            self.scroll = total.saturating_sub(width).min(self.scroll);
        }
        (self.scroll, self.scroll > 0, self.scroll + width < total)
    }
}

fn next_char(s: &str, at: usize) -> usize {
    if at >= s.len() {
        return s.len();
    }
    let mut next = at + 1;
    while !s.is_char_boundary(next) {
        next += 1;
    }
    next
}

fn prev_char(s: &str, at: usize) -> usize {
    if at == 0 {
        return 0;
    }
    let mut prev = at - 1;
    while !s.is_char_boundary(prev) {
        prev -= 1;
    }
    prev
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || !c.is_ascii()
}

/// Next word boundary going forward
fn next_word(s: &str, at: usize) -> usize {
    let mut pos = at;
    // Skip to the start of the next word, then through it
    while pos < s.len() {
        let c = s[pos..].chars().next().unwrap();
        if is_word(c) {
            break;
        }
        pos += c.len_utf8();
    }
    while pos < s.len() {
        let c = s[pos..].chars().next().unwrap();
        if !is_word(c) {
            break;
        }
        pos += c.len_utf8();
    }
    pos
}

/// Previous word boundary going backward
fn prev_word(s: &str, at: usize) -> usize {
    let mut pos = at;
    while pos > 0 {
        let prev = prev_char(s, pos);
        let c = s[prev..].chars().next().unwrap();
        if is_word(c) {
            break;
        }
        pos = prev;
    }
    while pos > 0 {
        let prev = prev_char(s, pos);
        let c = s[prev..].chars().next().unwrap();
        if !is_word(c) {
            break;
        }
        pos = prev;
    }
    pos
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
