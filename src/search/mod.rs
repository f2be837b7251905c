//! Incremental search and query-replace state
//!
//! The scanner is a byte-literal comparison that walks positions one at a
//! time, naturally skipping over the gap. Case folding is ASCII-only and
//! switches off automatically the moment the pattern contains an
//! uppercase ASCII letter. Search state tracks the current match, the
//! alternative match immediately after it (so hiliting does not clash
//! with the cursor), the origin, and a wrap-pending flag armed by a
//! failed scan and consumed by the next attempt.

use crate::buffer::gap::GapBuffer;
use crate::pane::PaneId;

/// Scan direction
pub const FORWARD: i32 = 1;
pub const BACKWARD: i32 = -1;

/// Find `pattern` from `start`, walking in `dir`. `fold` compares
/// ASCII-case-insensitively. Returns the match position or None at the
/// buffer boundary.
pub fn find(
    text: &GapBuffer,
    pattern: &[u8],
    start: usize,
    dir: i32,
    fold: bool,
) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > text.len() {
        return None;
    }
    let last = text.len() - pattern.len();
    let mut pos = start;
    if dir == FORWARD {
        while pos <= last {
            if matches_at(text, pattern, pos, fold) {
                return Some(pos);
            }
            pos += 1;
        }
        None
    } else {
        let mut pos = pos.min(last);
        loop {
            if matches_at(text, pattern, pos, fold) {
                return Some(pos);
            }
            if pos == 0 {
                return None;
            }
            pos -= 1;
        }
    }
}

fn matches_at(text: &GapBuffer, pattern: &[u8], pos: usize, fold: bool) -> bool {
    for (i, &pb) in pattern.iter().enumerate() {
        let tb = text.byte_at(pos + i);
        let equal = if fold {
            tb.eq_ignore_ascii_case(&pb)
        } else {
            tb == pb
        };
        if !equal {
            return false;
        }
    }
    true
}

/// Incremental search, active while the user drives it key by key
pub struct SearchState {
    pub pane: PaneId,
    pub dir: i32,
    pub pattern: Vec<u8>,
    /// Pattern reused when advancing with an empty pattern
    pub prev_pattern: Vec<u8>,
    /// Current main match position
    pub matched: Option<usize>,
    /// Where the next scan starts
    pub next_start: usize,
    /// A match starting exactly at the end of the main match
    pub alt_match: Option<usize>,
    /// Where the search began; pushed as a mark on exit
    pub origin: usize,
    /// A failing scan arms this; the next attempt wraps around
    pub wrap_pending: bool,
}

impl SearchState {
    pub fn start(pane: PaneId, dir: i32, origin: usize, prev_pattern: Vec<u8>) -> Self {
        SearchState {
            pane,
            dir,
            pattern: Vec::new(),
            prev_pattern,
            matched: None,
            next_start: origin,
            alt_match: None,
            origin,
            wrap_pending: false,
        }
    }

    /// Case folding is on until the pattern carries an uppercase ASCII byte
    #[must_use]
    pub fn folds_case(&self) -> bool {
        !self.pattern.iter().any(|b| b.is_ascii_uppercase())
    }

    /// End position of the current match
    #[must_use]
    pub fn match_end(&self) -> Option<usize> {
        self.matched.map(|pos| pos + self.pattern.len())
    }

    /// Append pattern bytes (a typed character) and rescan from the
    /// current anchor
    pub fn push_bytes(&mut self, text: &GapBuffer, bytes: &[u8]) {
        self.pattern.extend_from_slice(bytes);
        self.wrap_pending = false;
        let anchor = self.matched.unwrap_or(self.next_start);
        self.scan(text, anchor);
    }

    /// Shorten the pattern by one character
    pub fn backspace(&mut self, text: &GapBuffer) {
        // Pop a whole UTF-8 character
        while let Some(b) = self.pattern.pop() {
            if !crate::buffer::gap::is_continuation(b) {
                break;
            }
        }
        self.wrap_pending = false;
        if self.pattern.is_empty() {
            self.matched = None;
            self.alt_match = None;
            return;
        }
        let anchor = self.origin.min(self.matched.unwrap_or(self.origin));
        self.scan(text, anchor);
    }

    /// Extend the pattern by the next word (or one non-word character)
    /// starting at the current match end
    pub fn extend_word(&mut self, text: &GapBuffer) {
        let mut pos = match self.match_end() {
            Some(end) => end,
            None => self.next_start,
        };
        let len = text.len();
        if pos >= len {
            return;
        }
        let mut grabbed = Vec::new();
        if crate::buffer::gap::is_word_byte(text.byte_at(pos)) {
            while pos < len && crate::buffer::gap::is_word_byte(text.byte_at(pos)) {
                let next = text.step_forward(pos);
                grabbed.extend(text.copy_range(pos, next - pos));
                pos = next;
            }
        } else {
            let next = text.step_forward(pos);
            grabbed.extend(text.copy_range(pos, next - pos));
        }
        self.pattern.extend_from_slice(&grabbed);
        if let Some(m) = self.matched {
            self.scan(text, m);
        }
    }

    /// Advance to the next match in `dir`. With an empty pattern, the
    /// previous search's pattern is revived. Consumes a pending wrap.
    pub fn advance(&mut self, text: &GapBuffer, dir: i32) -> bool {
        self.dir = dir;
        if self.pattern.is_empty() {
            if self.prev_pattern.is_empty() {
                return false;
            }
            self.pattern = self.prev_pattern.clone();
        }

        let start = if self.wrap_pending {
            self.wrap_pending = false;
            if dir == FORWARD {
                0
            } else {
                text.len().saturating_sub(self.pattern.len())
            }
        } else {
            match self.matched {
                Some(m) => {
                    if dir == FORWARD {
                        m + self.pattern.len()
                    } else if m == 0 {
                        // Nothing can precede a match at the very start
                        self.wrap_pending = true;
                        self.alt_match = None;
                        return false;
                    } else {
                        m - 1
                    }
                }
                None => self.next_start,
            }
        };
        self.scan(text, start)
    }

    /// Run one scan; updates the match, the alternative, and wrap-pending
    fn scan(&mut self, text: &GapBuffer, start: usize) -> bool {
        let fold = self.folds_case();
        match find(text, &self.pattern, start, self.dir, fold) {
            Some(pos) => {
                self.matched = Some(pos);
                // The adjacent alternative gets its own slot so the cursor
                // at the main match end has a sane blinker pen
                self.alt_match = {
                    let end = pos + self.pattern.len();
                    if end <= text.len() && matches_at_checked(text, &self.pattern, end, fold) {
                        Some(end)
                    } else {
                        None
                    }
                };
                true
            }
            None => {
                self.wrap_pending = true;
                self.alt_match = None;
                false
            }
        }
    }
}

fn matches_at_checked(text: &GapBuffer, pattern: &[u8], pos: usize, fold: bool) -> bool {
    pos + pattern.len() <= text.len() && matches_at(text, pattern, pos, fold)
}

/// Query-replace, layered over incremental search
pub struct ReplaceState {
    pub pane: PaneId,
    pub from: Vec<u8>,
    pub to: Vec<u8>,
    pub count: usize,
    /// Suppress per-match updates (`!` disposition)
    pub replace_all: bool,
    /// Match the disposition prompt is standing on
    pub at: Option<usize>,
}

impl ReplaceState {
    pub fn new(pane: PaneId, from: Vec<u8>, to: Vec<u8>) -> Self {
        ReplaceState {
            pane,
            from,
            to,
            count: 0,
            replace_all: false,
            at: None,
        }
    }
}
