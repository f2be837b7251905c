//! Pane: one view of a buffer inside a frame
//!
//! A pane owns its cursor and viewport positions plus the derived geometry
//! used for drawing: cursor row/column inside the pane, buffer rows before
//! the viewport, a cached total row count, and scroll-bar state. Panes
//! stack vertically in a frame; every pane except the lowest carries a
//! mode-line row at its bottom.

use crate::buffer::gap::GapBuffer;
use crate::buffer::BufferId;
use crate::layout;

pub type PaneId = u64;
pub type FrameId = u64;

/// Scroll-bar state derived from the viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollBar {
    /// Rows hidden above the viewport
    pub top: usize,
    /// Rows visible in the pane
    pub thumb: usize,
    /// Total buffer rows the bar spans
    pub scale: usize,
}

pub struct Pane {
    pub id: PaneId,
    pub frame: FrameId,
    pub buffer: BufferId,
    /// Cursor position, a byte index into the buffer
    pub cursor: usize,
    /// Viewport start; always a row-starting position
    pub viewport: usize,
    /// Cursor cell, pane-relative
    pub cursor_row: usize,
    pub cursor_col: usize,
    /// Buffer rows above the viewport start
    pub rows_before_view: usize,
    /// Cached total buffer rows at the current frame width
    pub buf_rows: Option<usize>,
    /// Topmost frame row of this pane
    pub top_row: usize,
    /// Height in rows, including the mode line when present
    pub rows: usize,
    /// The pane shows a mode line (every pane but the lowest in its frame)
    pub mode_line: bool,
    /// Fractional height, 32.32 fixed point, preserves ratios across resizes
    pub frac: u64,
    pub scroll: ScrollBar,
}

impl Pane {
    pub fn new(id: PaneId, frame: FrameId, buffer: BufferId, rows: usize) -> Self {
        Pane {
            id,
            frame,
            buffer,
            cursor: 0,
            viewport: 0,
            cursor_row: 0,
            cursor_col: 0,
            rows_before_view: 0,
            buf_rows: None,
            top_row: 0,
            rows,
            mode_line: false,
            frac: (rows as u64) << 32,
            scroll: ScrollBar::default(),
        }
    }

    /// Rows available for buffer content
    #[must_use]
    pub fn content_rows(&self) -> usize {
        if self.mode_line {
            self.rows.saturating_sub(1)
        } else {
            self.rows
        }
    }

    /// Sync `rows` with the integer part of the fractional height
    pub fn take_frac_rows(&mut self) {
        self.rows = (self.frac >> 32) as usize;
    }

    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows;
        self.frac = (rows as u64) << 32;
    }

    /// Recompute cursor row/column and scroll the viewport the minimal
    /// amount needed to keep the cursor inside the pane.
    pub fn contain_cursor(&mut self, text: &GapBuffer, row_chars: usize) {
        if self.cursor < self.viewport {
            let loc = layout::find_location(text, 0, self.cursor, row_chars);
            self.viewport = loc.row_start;
            self.rows_before_view = loc.row;
            self.cursor_row = 0;
            self.cursor_col = loc.col;
            self.refresh_scroll(text, row_chars);
            return;
        }

        let loc = layout::find_location(text, self.viewport, self.cursor, row_chars);
        let visible = self.content_rows();
        if loc.row >= visible {
            // Scroll down just enough for the cursor to land on the last row
            let overshoot = loc.row + 1 - visible;
            let (new_view, moved) =
                layout::pos_plus_rows(text, self.viewport, overshoot, row_chars);
            self.viewport = new_view;
            self.rows_before_view += moved;
            self.cursor_row = loc.row - moved;
        } else {
            self.cursor_row = loc.row;
        }
        self.cursor_col = loc.col;
        self.refresh_scroll(text, row_chars);
    }

    /// Center the cursor's row in the pane (`recenter-page`)
    pub fn recenter(&mut self, text: &GapBuffer, row_chars: usize) {
        let loc = layout::find_location(text, 0, self.cursor, row_chars);
        let half = self.content_rows() / 2;
        let (view, moved) = layout::pos_minus_rows(text, loc.row_start, half, row_chars);
        self.viewport = view;
        self.rows_before_view = loc.row - moved;
        self.cursor_row = moved;
        self.cursor_col = loc.col;
        self.refresh_scroll(text, row_chars);
    }

    /// Recompute the cached row count and scroll-bar state
    pub fn refresh_scroll(&mut self, text: &GapBuffer, row_chars: usize) {
        let total = *self
            .buf_rows
            .get_or_insert_with(|| layout::total_rows(text, row_chars));
        self.scroll = ScrollBar {
            top: self.rows_before_view,
            thumb: self.content_rows().min(total),
            scale: total,
        };
    }

    /// Invalidate cached row counts after a buffer or width change
    pub fn invalidate_rows(&mut self) {
        self.buf_rows = None;
    }

    /// Re-anchor the viewport after the frame width changes
    pub fn rewrap(&mut self, text: &GapBuffer, old_row_chars: usize, new_row_chars: usize) {
        self.viewport = layout::rewrap_start(text, self.viewport, old_row_chars, new_row_chars);
        self.rows_before_view = layout::rows_between(text, 0, self.viewport, new_row_chars);
        self.invalidate_rows();
        self.contain_cursor(text, new_row_chars);
    }
}
