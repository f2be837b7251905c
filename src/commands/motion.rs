//! Cursor motion commands
//!
//! All of these carry the shift-select capability: a shifted press
//! extends the selection, a plain one cancels it. Negative prefixes run
//! the opposite direction. Hitting a buffer end reports the boundary and
//! leaves everything else untouched.

use crate::constants::errors;
use crate::editor::Editor;
use crate::error::{QuillError, Result};
use crate::host::HostEnv;
use crate::layout;
use crate::pane::PaneId;
use crate::query::{QueryKind, QueryType};
use crate::registry::CommandCtx;

fn end_of_buffer() -> QuillError {
    QuillError::boundary(errors::MSG_END_OF_BUFFER)
}

fn start_of_buffer() -> QuillError {
    QuillError::boundary(errors::MSG_BEGIN_OF_BUFFER)
}

/// Wrap up after any motion: containment and selection bookkeeping
fn settle<H: HostEnv>(ed: &mut Editor<H>, pane: PaneId) {
    ed.contain_pane_cursor(pane);
    if ed.dispatch.shift {
        ed.sync_primary_to_selection();
    }
}

fn move_chars<H: HostEnv>(ed: &mut Editor<H>, pane: PaneId, n: usize, forward: bool) -> Result<()> {
    let buffer = ed.pane(pane).buffer;
    let (cursor, hit_end) = {
        let text = ed.buffers[&buffer].text();
        let mut cursor = ed.pane(pane).cursor;
        let mut hit_end = false;
        for _ in 0..n {
            if forward {
                if cursor >= text.len() {
                    hit_end = true;
                    break;
                }
                cursor = text.step_forward(cursor);
            } else {
                if cursor == 0 {
                    hit_end = true;
                    break;
                }
                cursor = text.step_backward(cursor);
            }
        }
        (cursor, hit_end)
    };
    ed.panes.get_mut(&pane).unwrap().cursor = cursor;
    settle(ed, pane);
    if hit_end {
        return Err(if forward { end_of_buffer() } else { start_of_buffer() });
    }
    Ok(())
}

pub fn forward_char<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let n = ctx.prefix.amount();
    move_chars(ed, ctx.pane, n.unsigned_abs() as usize, n >= 0)
}

pub fn backward_char<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let n = ctx.prefix.amount();
    move_chars(ed, ctx.pane, n.unsigned_abs() as usize, n < 0)
}

pub fn forward_word<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let pane = ctx.pane;
    let buffer = ed.pane(pane).buffer;
    let n = ctx.prefix.amount();
    let mut cursor = ed.pane(pane).cursor;
    {
        let text = ed.buffers[&buffer].text();
        for _ in 0..n.unsigned_abs() {
            cursor = if n >= 0 {
                super::motion_word_end(text, cursor)
            } else {
                super::motion_word_start(text, cursor)
            };
        }
    }
    ed.panes.get_mut(&pane).unwrap().cursor = cursor;
    settle(ed, pane);
    Ok(())
}

pub fn backward_word<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let pane = ctx.pane;
    let buffer = ed.pane(pane).buffer;
    let n = ctx.prefix.amount();
    let mut cursor = ed.pane(pane).cursor;
    {
        let text = ed.buffers[&buffer].text();
        for _ in 0..n.unsigned_abs() {
            cursor = if n >= 0 {
                super::motion_word_start(text, cursor)
            } else {
                super::motion_word_end(text, cursor)
            };
        }
    }
    ed.panes.get_mut(&pane).unwrap().cursor = cursor;
    settle(ed, pane);
    Ok(())
}

/// Vertical motion preserving the column where possible
fn move_rows<H: HostEnv>(ed: &mut Editor<H>, pane: PaneId, n: usize, down: bool) -> Result<()> {
    let row_chars = ed.row_chars();
    let buffer = ed.pane(pane).buffer;
    let cursor = ed.pane(pane).cursor;
    let (new_cursor, moved) = {
        let text = ed.buffers[&buffer].text();
        let loc = layout::find_location(text, 0, cursor, row_chars);
        let (start, moved) = if down {
            layout::pos_plus_rows(text, loc.row_start, n, row_chars)
        } else {
            layout::pos_minus_rows(text, loc.row_start, n, row_chars)
        };
        let (pos, _) = layout::find_position(text, start, 0, loc.col, row_chars);
        (pos, moved)
    };
    ed.panes.get_mut(&pane).unwrap().cursor = new_cursor;
    settle(ed, pane);
    if moved < n {
        return Err(if down { end_of_buffer() } else { start_of_buffer() });
    }
    Ok(())
}

pub fn forward_row<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let n = ctx.prefix.amount();
    move_rows(ed, ctx.pane, n.unsigned_abs() as usize, n >= 0)
}

pub fn backward_row<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let n = ctx.prefix.amount();
    move_rows(ed, ctx.pane, n.unsigned_abs() as usize, n < 0)
}

pub fn forward_page<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let page = ed.pane(ctx.pane).content_rows().saturating_sub(2).max(1);
    let n = ctx.prefix.amount().unsigned_abs() as usize * page;
    move_rows(ed, ctx.pane, n, ctx.prefix.amount() >= 0)
}

pub fn backward_page<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let page = ed.pane(ctx.pane).content_rows().saturating_sub(2).max(1);
    let n = ctx.prefix.amount().unsigned_abs() as usize * page;
    move_rows(ed, ctx.pane, n, ctx.prefix.amount() < 0)
}

pub fn goto_start_of_line<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let pane = ctx.pane;
    let buffer = ed.pane(pane).buffer;
    let cursor = ed.pane(pane).cursor;
    let pos = ed.buffers[&buffer].text().line_start(cursor);
    ed.panes.get_mut(&pane).unwrap().cursor = pos;
    settle(ed, pane);
    Ok(())
}

pub fn goto_end_of_line<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let pane = ctx.pane;
    let buffer = ed.pane(pane).buffer;
    let cursor = ed.pane(pane).cursor;
    let pos = ed.buffers[&buffer].text().line_end(cursor);
    ed.panes.get_mut(&pane).unwrap().cursor = pos;
    settle(ed, pane);
    Ok(())
}

pub fn goto_start<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let pane = ctx.pane;
    let buffer = ed.pane(pane).buffer;
    let cursor = ed.pane(pane).cursor;
    ed.buffers.get_mut(&buffer).unwrap().marks.push(cursor);
    ed.panes.get_mut(&pane).unwrap().cursor = 0;
    settle(ed, pane);
    Ok(())
}

pub fn goto_end<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    ed.shift_select_pre(ctx.pane);
    let pane = ctx.pane;
    let buffer = ed.pane(pane).buffer;
    let cursor = ed.pane(pane).cursor;
    let len = ed.buffers[&buffer].len();
    ed.buffers.get_mut(&buffer).unwrap().marks.push(cursor);
    ed.panes.get_mut(&pane).unwrap().cursor = len;
    settle(ed, pane);
    Ok(())
}

pub fn recenter_page<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let row_chars = ed.row_chars();
    let buffer = ed.pane(pane).buffer;
    let buf = ed.buffers.get(&buffer).unwrap();
    let pane_ref = ed.panes.get_mut(&pane).unwrap();
    pane_ref.recenter(buf.text(), row_chars);
    Ok(())
}

pub fn goto_line<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    if ctx.prefix.explicit {
        // An explicit prefix names the line directly
        let line = ctx.prefix.amount().max(1) as usize;
        return jump_to_line(ed, ctx.pane, line);
    }
    ed.open_query("Goto line: ", "", QueryType::Str, QueryKind::GotoLine);
    Ok(())
}

fn jump_to_line<H: HostEnv>(ed: &mut Editor<H>, pane: PaneId, line: usize) -> Result<()> {
    let buffer = ed.pane(pane).buffer;
    let pos = {
        let text = ed.buffers[&buffer].text();
        let mut pos = 0;
        for _ in 1..line {
            let end = text.line_end(pos);
            if end >= text.len() {
                break;
            }
            pos = end + 1;
        }
        pos
    };
    ed.panes.get_mut(&pane).unwrap().cursor = pos;
    ed.contain_pane_cursor(pane);
    Ok(())
}

pub fn goto_char<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    if ctx.prefix.explicit {
        let pane = ctx.pane;
        let at = ctx.prefix.amount().max(0) as usize;
        let len = ed.buffer_of(pane).len();
        ed.panes.get_mut(&pane).unwrap().cursor = at.min(len);
        ed.contain_pane_cursor(pane);
        return Ok(());
    }
    ed.open_query("Goto char: ", "", QueryType::Str, QueryKind::GotoChar);
    Ok(())
}
