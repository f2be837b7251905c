//! Redraw walk
//!
//! Renders the current frame: each pane's rows, its mode line, the scroll
//! bar column, hilites for the selection and search matches, the echo
//! line (or the active mini-query), and the cursor. Every cell the frame
//! owns is painted on every pass; the host buffers and flushes.

use crate::error::Result;
use crate::host::{HostEnv, Pen};
use crate::pane::PaneId;

use super::Editor;

impl<H: HostEnv> Editor<H> {
    pub fn draw(&mut self) -> Result<()> {
        let frame_id = self.current_frame;
        let pane_ids = self.frames[&frame_id].panes.clone();
        for pane_id in &pane_ids {
            self.draw_pane(*pane_id);
        }
        self.draw_echo();
        self.draw_popup();
        self.place_cursor();
        self.host.present()
    }

    /// Cheap pass for the blink tick: cursor only
    pub fn draw_cursor_only(&mut self) {
        self.place_cursor();
        let _ = self.host.present();
    }

    fn place_cursor(&mut self) {
        if self.query.is_some() {
            // The mini-query owns the cursor; draw_echo computed its cell
            return;
        }
        let pane = &self.panes[&self.cur_pane_id()];
        let row = pane.top_row + pane.cursor_row;
        let col = pane.cursor_col;
        self.host.set_cursor(row, col, self.blink_visible());
    }

    fn blink_visible(&self) -> bool {
        self.blink_on
    }

    fn draw_pane(&mut self, pane_id: PaneId) {
        let row_chars = self.row_chars();
        let (viewport, top_row, content_rows, mode_line, buffer_id, scroll) = {
            let pane = &self.panes[&pane_id];
            (
                pane.viewport,
                pane.top_row,
                pane.content_rows(),
                pane.mode_line,
                pane.buffer,
                pane.scroll,
            )
        };

        // Overlay ranges: the selection and the search hilites
        let overlays = self.overlays_for(pane_id);

        let mut row_start = viewport;
        for row in 0..content_rows {
            let (line, end_pos, next_start) = {
                let text = self.buffers[&buffer_id].text();
                row_text(text, row_start, row_chars)
            };
            let frame_row = top_row + row;
            self.host.draw_text(frame_row, 0, &line, Pen::Text);
            let drawn = line.chars().count();
            if drawn < row_chars + 1 {
                self.host
                    .fill(frame_row, drawn, row_chars + 1 - drawn, Pen::Text);
            }

            for &(start, end, pen) in &overlays {
                let lo = start.max(row_start);
                let hi = end.min(end_pos);
                if lo < hi {
                    let text = self.buffers[&buffer_id].text();
                    let col = count_cols(text, row_start, lo);
                    let seg: String = slice_string(text, lo, hi);
                    self.host.draw_text(frame_row, col, &seg, pen);
                }
            }

            // Scroll bar cell for this row
            let bar_col = row_chars + 1;
            let (thumb_at, thumb_len) = thumb_extent(scroll, content_rows);
            let pen = if row >= thumb_at && row < thumb_at + thumb_len {
                Pen::ScrollThumb
            } else {
                Pen::ScrollBar
            };
            self.host.fill(frame_row, bar_col, 1, pen);

            row_start = next_start;
        }

        if mode_line {
            let label = self.mode_line_text(buffer_id);
            let frame_row = top_row + content_rows;
            let cols = self.cur_frame().cols;
            let mut line = label;
            while line.chars().count() < cols {
                line.push('-');
            }
            self.host.draw_text(frame_row, 0, &line, Pen::ModeLine);
        }
    }

    fn mode_line_text(&self, buffer_id: crate::buffer::BufferId) -> String {
        let buf = &self.buffers[&buffer_id];
        let flag = if buf.is_modified() { "**" } else { "--" };
        let ro = if buf.read_only { " RO" } else { "" };
        let filt = if buf.filtered { " F" } else { "" };
        format!("--{} {}{}{} ", flag, buf.display_name(), ro, filt)
    }

    /// Byte ranges to re-paint with hilite pens, in paint order
    fn overlays_for(&self, pane_id: PaneId) -> Vec<(usize, usize, Pen)> {
        let mut out = Vec::new();
        if let Some(sel) = self.selection {
            if sel.pane == pane_id {
                let cursor = self.panes[&pane_id].cursor;
                let (start, end) = sel.range(cursor);
                if start < end {
                    out.push((start, end, Pen::Selection));
                }
            }
        }
        if let Some(state) = &self.isearch {
            if state.pane == pane_id {
                if let Some(m) = state.matched {
                    out.push((m, m + state.pattern.len(), Pen::MatchMain));
                }
                if let Some(alt) = state.alt_match {
                    out.push((alt, alt + state.pattern.len(), Pen::MatchAlt));
                }
            }
        }
        out
    }

    fn draw_echo(&mut self) {
        let (rows, cols) = {
            let frame = self.cur_frame();
            (frame.rows, frame.cols)
        };
        let echo_row = rows.saturating_sub(1);

        if self.query.is_some() {
            self.draw_query(echo_row, cols);
            return;
        }

        let (text, pen) = {
            let echo = &self.cur_frame().echo;
            let pen = match echo.mode {
                crate::echo::EchoMode::Error => Pen::EchoError,
                _ => Pen::Echo,
            };
            (echo.text.clone(), pen)
        };
        self.host.draw_text(echo_row, 0, &text, pen);
        let drawn = text.chars().count();
        if drawn < cols {
            self.host.fill(echo_row, drawn, cols - drawn, Pen::Echo);
        }
    }

    fn draw_query(&mut self, echo_row: usize, cols: usize) {
        let mut query = self.query.take().unwrap();

        // Clip an oversized prompt; the response gets what is left
        let prompt_cols = query.prompt.chars().count().min(cols.saturating_sub(2));
        let prompt: String = query.prompt.chars().take(prompt_cols).collect();
        let response_cols = cols.saturating_sub(prompt_cols + 1);

        self.host.draw_text(echo_row, 0, &prompt, Pen::Echo);

        if response_cols == 0 {
            // No room: strike the response area out; commands other than
            // abort will flash
            self.host.fill(echo_row, prompt_cols, cols - prompt_cols, Pen::EchoError);
            self.query = Some(query);
            return;
        }

        let (first, tick_left, tick_right) = query.scroll_window(response_cols);
        let visible: String = query
            .response
            .chars()
            .skip(first)
            .take(response_cols)
            .collect();
        self.host.draw_text(echo_row, prompt_cols, &visible, Pen::Echo);
        let drawn = visible.chars().count();
        if prompt_cols + drawn < cols {
            self.host
                .fill(echo_row, prompt_cols + drawn, cols - prompt_cols - drawn, Pen::Echo);
        }
        // Ticks mark hidden text at either side
        if tick_left {
            self.host.draw_text(echo_row, prompt_cols, "<", Pen::EchoError);
        }
        if tick_right {
            self.host
                .draw_text(echo_row, cols.saturating_sub(1), ">", Pen::EchoError);
        }

        let cursor_chars = query.response[..query.cursor].chars().count();
        let cursor_col = prompt_cols + cursor_chars.saturating_sub(first);
        self.host
            .set_cursor(echo_row, cursor_col.min(cols.saturating_sub(1)), self.blink_on);
        self.query = Some(query);
    }

    fn draw_popup(&mut self) {
        let Some(popup) = self.popup.take() else {
            return;
        };
        let title = popup.provider.title().to_string();
        let at = self.cur_frame().last_popup;
        self.host.draw_text(at.0, at.1, &title, Pen::ModeLine);
        for (i, item) in popup.items.iter().enumerate() {
            let pen = if i == popup.selected {
                Pen::Selection
            } else {
                Pen::Echo
            };
            self.host.draw_text(at.0 + 1 + i, at.1, item, pen);
        }
        self.popup = Some(popup);
    }
}

/// One display row starting at `row_start`: its text, end position, and
/// the next row's start
fn row_text(
    text: &crate::buffer::gap::GapBuffer,
    row_start: usize,
    row_chars: usize,
) -> (String, usize, usize) {
    let mut out = String::new();
    let mut pos = row_start;
    let mut col = 0;
    let len = text.len();
    while pos < len {
        let byte = text.byte_at(pos);
        if byte == b'\n' {
            return (out, pos, pos + 1);
        }
        if col == row_chars {
            return (out, pos, pos);
        }
        match text.char_at(pos) {
            Some(c) if !c.is_control() => out.push(c),
            _ => out.push(' '),
        }
        pos = text.step_forward(pos);
        col += 1;
    }
    (out, len, len)
}

fn count_cols(text: &crate::buffer::gap::GapBuffer, from: usize, to: usize) -> usize {
    let mut pos = from;
    let mut n = 0;
    while pos < to {
        pos = text.step_forward(pos);
        n += 1;
    }
    n
}

fn slice_string(text: &crate::buffer::gap::GapBuffer, from: usize, to: usize) -> String {
    let bytes = text.copy_range(from, to - from);
    String::from_utf8_lossy(&bytes).into_owned()
}

fn thumb_extent(scroll: crate::pane::ScrollBar, content_rows: usize) -> (usize, usize) {
    if scroll.scale == 0 {
        return (0, content_rows);
    }
    let at = scroll.top * content_rows / scroll.scale;
    let len = (scroll.thumb * content_rows / scroll.scale).max(1);
    (at, len.min(content_rows))
}
