//! Search, replace, and undo commands

use crate::editor::Editor;
use crate::error::Result;
use crate::host::HostEnv;
use crate::query::{QueryKind, QueryType};
use crate::registry::CommandCtx;
use crate::search::{SearchState, BACKWARD, FORWARD};

fn start_search<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx, dir: i32) {
    let pane = ctx.pane;
    let origin = ed.pane(pane).cursor;
    let prev = ed.prev_search.clone();
    ed.isearch = Some(SearchState::start(pane, dir, origin, prev));
    let label = if dir == FORWARD {
        "I-search: "
    } else {
        "I-search backward: "
    };
    ed.cur_frame_mut().echo.prompt(label);
}

pub fn search_forward<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    start_search(ed, ctx, FORWARD);
    Ok(())
}

pub fn search_backward<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    start_search(ed, ctx, BACKWARD);
    Ok(())
}

pub fn query_replace<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    let initial = ed.prev_from.clone();
    ed.open_query("Replace: ", initial, QueryType::Str, QueryKind::ReplaceFrom);
    Ok(())
}

pub fn undo<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let continuing = ed.dispatch.last_command == Some(ed.known.undo);
    let buffer = ed.pane(pane).buffer;
    let n = ctx.prefix.amount().max(1) as usize;
    let mut outcome = None;
    for i in 0..n {
        let step = ed
            .buffers
            .get_mut(&buffer)
            .unwrap()
            .undo_step(continuing || i > 0);
        match step {
            Ok(result) => outcome = Some(result),
            Err(err) => {
                if outcome.is_none() {
                    return Err(err);
                }
                break;
            }
        }
    }
    if let Some(result) = outcome {
        let len = ed.buffers[&buffer].len();
        ed.panes.get_mut(&pane).unwrap().cursor = result.cursor.min(len);
        // Every view of this buffer shifted under the undo; clamp and
        // re-anchor viewports on hard line starts
        let row_chars = ed.row_chars();
        let ids: Vec<_> = ed
            .panes
            .values()
            .filter(|p| p.buffer == buffer)
            .map(|p| p.id)
            .collect();
        for id in ids {
            let (cursor, viewport, before) = {
                let text = ed.buffers[&buffer].text();
                let p = &ed.panes[&id];
                let viewport = text.line_start(p.viewport.min(len));
                (
                    p.cursor.min(len),
                    viewport,
                    crate::layout::rows_between(text, 0, viewport, row_chars),
                )
            };
            let p = ed.panes.get_mut(&id).unwrap();
            p.cursor = cursor;
            p.viewport = viewport;
            p.rows_before_view = before;
            p.invalidate_rows();
        }
        ed.refresh_buffer_panes(buffer);
        if result.now_clean {
            ed.echo_message("Undo! (unmodified)");
        } else {
            ed.echo_message("Undo!");
        }
    }
    Ok(())
}

pub fn reset_undo<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let buffer = ed.pane(ctx.pane).buffer;
    ed.buffers.get_mut(&buffer).unwrap().undo.reset();
    ed.echo_message("Undo history cleared");
    Ok(())
}

pub fn disable_undo<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let buffer = ed.pane(ctx.pane).buffer;
    ed.buffers.get_mut(&buffer).unwrap().undo.disable();
    ed.echo_message("Undo disabled in this buffer");
    Ok(())
}
