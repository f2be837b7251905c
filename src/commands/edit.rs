//! Editing commands: deletion, whitespace, case changes
//!
//! Word deletions kill into the ring and coalesce across repeats; plain
//! character deletes do not touch the ring. Case changes record a chained
//! Del+Add pair so one undo restores the word.

use crate::buffer::gap::is_word_byte;
use crate::constants::errors;
use crate::editor::Editor;
use crate::error::{QuillError, Result};
use crate::host::HostEnv;
use crate::kill_ring::KillEnd;
use crate::layout;
use crate::pane::PaneId;
use crate::registry::CommandCtx;
use crate::undo::flags;

pub fn insert_newline<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let n = ctx.prefix.amount().max(1) as usize;
    let bytes = vec![b'\n'; n];
    ed.insert_text(ctx.pane, &bytes)
}

pub fn insert_tab<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let row_chars = ed.row_chars();
    let tab = ed.settings.tab_stop;
    let col = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        let start = text.line_start(cursor);
        layout::find_location(text, start, cursor, row_chars.max(cursor + 1)).col
    };
    let pad = tab - (col % tab);
    let spaces = vec![b' '; pad];
    ed.insert_text(pane, &spaces)
}

pub fn delete_forward<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    if delete_selection_if_any(ed, pane)? {
        return Ok(());
    }
    let n = ctx.prefix.amount().max(1) as usize;
    let (pos, len) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        if cursor >= text.len() {
            return Err(QuillError::boundary(errors::MSG_END_OF_BUFFER));
        }
        let mut end = cursor;
        for _ in 0..n {
            if end >= text.len() {
                break;
            }
            end = text.step_forward(end);
        }
        (cursor, end - cursor)
    };
    ed.delete_text(pane, pos, len, false, 0)?;
    Ok(())
}

pub fn delete_backward<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    if delete_selection_if_any(ed, pane)? {
        return Ok(());
    }
    let n = ctx.prefix.amount().max(1) as usize;
    let (pos, len) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        if cursor == 0 {
            return Err(QuillError::boundary(errors::MSG_BEGIN_OF_BUFFER));
        }
        let mut start = cursor;
        for _ in 0..n {
            if start == 0 {
                break;
            }
            start = text.step_backward(start);
        }
        (start, cursor - start)
    };
    ed.delete_text(pane, pos, len, true, 0)?;
    ed.panes.get_mut(&pane).unwrap().cursor = pos;
    ed.contain_pane_cursor(pane);
    Ok(())
}

/// An active selection absorbs the first delete
fn delete_selection_if_any<H: HostEnv>(ed: &mut Editor<H>, pane: PaneId) -> Result<bool> {
    if let Some(sel) = ed.selection {
        if sel.pane == pane {
            let cursor = ed.pane(pane).cursor;
            let (start, end) = sel.range(cursor);
            ed.selection = None;
            if start < end {
                ed.delete_text(pane, start, end - start, false, flags::CHUNK)?;
                ed.panes.get_mut(&pane).unwrap().cursor = start;
                ed.contain_pane_cursor(pane);
                return Ok(true);
            }
        }
    }
    Ok(false)
}


pub fn delete_word_forward<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let n = ctx.prefix.amount().max(1) as usize;
    let (pos, end) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        let mut end = cursor;
        for _ in 0..n {
            end = super::motion_word_end(text, end);
        }
        (cursor, end)
    };
    if end == pos {
        return Err(QuillError::boundary(errors::MSG_END_OF_BUFFER));
    }
    let joins = super::last_was_kill(ed);
    let data = ed.delete_text(pane, pos, end - pos, false, 0)?;
    if joins {
        ed.kill_ring.extend(&data, KillEnd::Append);
    } else {
        ed.kill_ring.kill(&data);
    }
    ed.claim_clipboard_top();
    Ok(())
}

pub fn delete_word_backward<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let n = ctx.prefix.amount().max(1) as usize;
    let (start, cursor) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        let mut start = cursor;
        for _ in 0..n {
            start = super::motion_word_start(text, start);
        }
        (start, cursor)
    };
    if start == cursor {
        return Err(QuillError::boundary(errors::MSG_BEGIN_OF_BUFFER));
    }
    let joins = super::last_was_kill(ed);
    let data = ed.delete_text(pane, start, cursor - start, true, 0)?;
    ed.panes.get_mut(&pane).unwrap().cursor = start;
    ed.contain_pane_cursor(pane);
    if joins {
        ed.kill_ring.extend(&data, KillEnd::Prepend);
    } else {
        ed.kill_ring.kill(&data);
    }
    ed.claim_clipboard_top();
    Ok(())
}

pub fn delete_horiz_space<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let (start, end) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        let mut start = cursor;
        while start > 0 && matches!(text.byte_at(start - 1), b' ' | b'\t') {
            start -= 1;
        }
        let mut end = cursor;
        while end < text.len() && matches!(text.byte_at(end), b' ' | b'\t') {
            end += 1;
        }
        (start, end)
    };
    if start < end {
        ed.delete_text(pane, start, end - start, false, flags::CHUNK)?;
        ed.panes.get_mut(&pane).unwrap().cursor = start;
        ed.contain_pane_cursor(pane);
    }
    Ok(())
}

/// Join this line to the previous one with a single space between
pub fn join_lines<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let (start, end, needs_space) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        let line_start = text.line_start(cursor);
        if line_start == 0 {
            return Err(QuillError::boundary(errors::MSG_BEGIN_OF_BUFFER));
        }
        // Eat the newline plus surrounding horizontal space
        let mut start = line_start - 1;
        while start > 0 && matches!(text.byte_at(start - 1), b' ' | b'\t') {
            start -= 1;
        }
        let mut end = line_start;
        while end < text.len() && matches!(text.byte_at(end), b' ' | b'\t') {
            end += 1;
        }
        let needs_space = start > 0 && text.byte_at(start - 1) != b'\n';
        (start, end, needs_space)
    };
    let buffer = ed.pane(pane).buffer;
    let joined = if needs_space { b" ".to_vec() } else { Vec::new() };
    ed.buffers
        .get_mut(&buffer)
        .unwrap()
        .replace(start, end - start, &joined, false)?;
    ed.clipboard.note_delete(&mut ed.host, buffer, start, end - start);
    ed.clipboard.note_insert(&mut ed.host, buffer, start, joined.len());
    ed.adjust_replace_panes(buffer, start, end - start, joined.len());
    ed.panes.get_mut(&pane).unwrap().cursor = start + joined.len();
    ed.refresh_buffer_panes(buffer);
    Ok(())
}

#[derive(Clone, Copy)]
enum CaseChange {
    Down,
    Up,
    Capitalize,
}

fn change_word_case<H: HostEnv>(ed: &mut Editor<H>, pane: PaneId, change: CaseChange) -> Result<()> {
    let (start, end, replacement) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        let len = text.len();
        let mut start = cursor;
        while start < len && !is_word_byte(text.byte_at(start)) {
            start = text.step_forward(start);
        }
        let mut end = start;
        while end < len && is_word_byte(text.byte_at(end)) {
            end = text.step_forward(end);
        }
        if start == end {
            return Err(QuillError::boundary(errors::MSG_END_OF_BUFFER));
        }
        let word = String::from_utf8_lossy(&text.copy_range(start, end - start)).into_owned();
        let changed = match change {
            CaseChange::Down => word.to_lowercase(),
            CaseChange::Up => word.to_uppercase(),
            CaseChange::Capitalize => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => word.clone(),
                }
            }
        };
        (start, end, changed.into_bytes())
    };
    let buffer = ed.pane(pane).buffer;
    ed.buffers
        .get_mut(&buffer)
        .unwrap()
        .replace(start, end - start, &replacement, false)?;
    ed.clipboard.note_delete(&mut ed.host, buffer, start, end - start);
    ed.clipboard.note_insert(&mut ed.host, buffer, start, replacement.len());
    ed.adjust_replace_panes(buffer, start, end - start, replacement.len());
    ed.panes.get_mut(&pane).unwrap().cursor = start + replacement.len();
    ed.refresh_buffer_panes(buffer);
    Ok(())
}

pub fn downcase_word<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    change_word_case(ed, ctx.pane, CaseChange::Down)
}

pub fn upcase_word<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    change_word_case(ed, ctx.pane, CaseChange::Up)
}

pub fn capitalize_word<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    change_word_case(ed, ctx.pane, CaseChange::Capitalize)
}
