//! Marks, selection, and the kill/yank commands

use crate::constants::errors;
use crate::editor::Editor;
use crate::error::{ErrorType, QuillError, Result};
use crate::file_ops;
use crate::host::HostEnv;
use crate::kill_ring::KillEnd;
use crate::pane::PaneId;
use crate::registry::CommandCtx;
use crate::undo::flags;

pub fn set_mark<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let buffer = ed.pane(pane).buffer;
    let cursor = ed.pane(pane).cursor;
    ed.buffers.get_mut(&buffer).unwrap().marks.push(cursor);
    ed.set_selection(pane, cursor);
    ed.echo_message("Mark set");
    Ok(())
}

pub fn exchange_point_and_mark<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let buffer = ed.pane(pane).buffer;
    let cursor = ed.pane(pane).cursor;
    let mark = ed.buffers.get_mut(&buffer).unwrap().marks.swap(cursor);
    ed.panes.get_mut(&pane).unwrap().cursor = mark.min(ed.buffers[&buffer].len());
    ed.contain_pane_cursor(pane);
    Ok(())
}

pub fn select_line<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    run_select_line(ed, ctx.pane)
}

/// Select the whole line under the cursor, newline included
pub fn run_select_line<H: HostEnv>(ed: &mut Editor<H>, pane: PaneId) -> Result<()> {
    let (start, end) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        let start = text.line_start(cursor);
        let mut end = text.line_end(cursor);
        if end < text.len() {
            end += 1;
        }
        (start, end)
    };
    ed.set_selection(pane, start);
    ed.panes.get_mut(&pane).unwrap().cursor = end;
    ed.contain_pane_cursor(pane);
    ed.sync_primary_to_selection();
    Ok(())
}

/// Begin a selection at the cursor; the cursor end then tracks motion
pub fn select_area<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let cursor = ed.pane(pane).cursor;
    ed.set_selection(pane, cursor);
    Ok(())
}

pub fn select_all<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let len = ed.buffer_of(pane).len();
    ed.set_selection(pane, 0);
    ed.panes.get_mut(&pane).unwrap().cursor = len;
    ed.contain_pane_cursor(pane);
    ed.sync_primary_to_selection();
    Ok(())
}

pub fn kill_line<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let n = ctx.prefix.amount().max(1) as usize;
    let (pos, end) = {
        let buffer = ed.pane(pane).buffer;
        let cursor = ed.pane(pane).cursor;
        let text = ed.buffers[&buffer].text();
        if cursor >= text.len() {
            return Err(QuillError::boundary(errors::MSG_END_OF_BUFFER));
        }
        let mut end = cursor;
        for _ in 0..n {
            let line_end = text.line_end(end);
            // At the end of a line the newline itself is killed
            end = if end == line_end && line_end < text.len() {
                line_end + 1
            } else {
                line_end
            };
            if end >= text.len() {
                break;
            }
        }
        (cursor, end)
    };
    if end == pos {
        return Ok(());
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

fn selection_range<H: HostEnv>(ed: &Editor<H>, pane: PaneId) -> Result<(usize, usize)> {
    let sel = ed.selection.ok_or_else(|| {
        QuillError::new(ErrorType::Boundary, errors::BAD_RESPONSE, "No selection")
    })?;
    if sel.pane != pane {
        return Err(QuillError::new(
            ErrorType::Boundary,
            errors::BAD_RESPONSE,
            "Selection is in another pane",
        ));
    }
    let cursor = ed.pane(pane).cursor;
    Ok(sel.range(cursor))
}

pub fn kill_region<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let (start, end) = selection_range(ed, pane)?;
    ed.selection = None;
    if start == end {
        return Ok(());
    }
    let joins = super::last_was_kill(ed);
    let data = ed.delete_text(pane, start, end - start, false, flags::CHUNK)?;
    ed.panes.get_mut(&pane).unwrap().cursor = start;
    ed.contain_pane_cursor(pane);
    if joins {
        ed.kill_ring.extend(&data, KillEnd::Append);
    } else {
        ed.kill_ring.kill(&data);
    }
    ed.claim_clipboard_top();
    Ok(())
}

pub fn copy_region<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let (start, end) = selection_range(ed, pane)?;
    if start == end {
        return Ok(());
    }
    let buffer = ed.pane(pane).buffer;
    let data = ed.buffers[&buffer].text().copy_range(start, end - start);
    ed.kill_ring.kill(&data);
    ed.selection = None;
    ed.claim_clipboard_top();
    Ok(())
}

pub fn yank<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;

    // When another client owns the clipboard, yank imports from it
    if !ed.clipboard.clipboard_owned {
        let imported = ed.clipboard.import(&mut ed.host);
        match imported {
            Ok((bytes, mut deferred)) if !bytes.is_empty() => {
                for event in deferred.drain(..) {
                    ed.handle_event(event);
                }
                let filtered = if bytes.iter().any(|&b| b == b'\r' || b == b'\t') {
                    file_ops::filter(&bytes, ed.settings.tab_stop)
                } else {
                    bytes
                };
                // A mark remembers where the external text landed
                let at = ed.pane(pane).cursor;
                let buffer = ed.pane(pane).buffer;
                ed.buffers.get_mut(&buffer).unwrap().marks.push(at);
                ed.insert_text(pane, &filtered)?;
                ed.last_yank = Some((pane, at, filtered.len()));
                // The ring grows only at the observable moment of a pop
                ed.pending_external_yank = Some(filtered);
                return Ok(());
            }
            Ok(_) => {}
            Err(err) => {
                ed.report(err);
            }
        }
    }

    ed.pending_external_yank = None;
    ed.kill_ring.rewind_yank();
    let Some(data) = ed.kill_ring.yank().map(|d| d.to_vec()) else {
        return Err(QuillError::new(
            ErrorType::Boundary,
            errors::BAD_RESPONSE,
            "Kill ring is empty",
        ));
    };
    let at = ed.pane(pane).cursor;
    ed.insert_text(pane, &data)?;
    ed.last_yank = Some((pane, at, data.len()));
    Ok(())
}

pub fn yank_pop<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let repeatable = matches!(
        ed.dispatch.last_command,
        Some(last) if last == ed.known.yank || last == ed.known.yank_pop
    );
    let last = ed.last_yank.filter(|(p, _, _)| *p == pane);
    let (_, at, len) = match (repeatable, last) {
        (true, Some(entry)) => entry,
        _ => {
            return Err(QuillError::new(
                ErrorType::Boundary,
                errors::BAD_RESPONSE,
                "Previous command was not a yank",
            ));
        }
    };

    // External content enters the ring now, at the moment of the pop
    if let Some(external) = ed.pending_external_yank.take() {
        ed.kill_ring.kill(&external);
    }

    let Some(data) = ed.kill_ring.yank_pop().map(|d| d.to_vec()) else {
        return Err(QuillError::new(
            ErrorType::Boundary,
            errors::BAD_RESPONSE,
            "Kill ring is empty",
        ));
    };
    ed.delete_text(pane, at, len, false, flags::CHUNK)?;
    ed.panes.get_mut(&pane).unwrap().cursor = at;
    // The replacement chains with the deletion as one operation
    ed.insert_text_bits(pane, &data, flags::CHAIN)?;
    ed.last_yank = Some((pane, at, data.len()));
    Ok(())
}
