//! Pane and frame commands

use crate::editor::Editor;
use crate::error::Result;
use crate::host::HostEnv;
use crate::registry::CommandCtx;

pub fn split_pane<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let frame_id = ed.current_frame;
    let new_id = ed.next_pane_id();
    let mut frame = ed.frames.remove(&frame_id).unwrap();
    let result = frame.split(&mut ed.panes, ctx.pane, new_id);
    ed.frames.insert(frame_id, frame);
    let new_pane = result?;
    // The new pane views the same buffer
    let buffer = ed.pane(ctx.pane).buffer;
    ed.buffers.get_mut(&buffer).unwrap().pane_refs += 1;
    ed.panes.get_mut(&new_pane).unwrap().frame = frame_id;
    // Both halves re-check their smaller viewports
    ed.contain_pane_cursor(ctx.pane);
    ed.contain_pane_cursor(new_pane);
    Ok(())
}

pub fn kill_pane<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let frame_id = ed.current_frame;
    if ed.frames[&frame_id].panes.len() <= 1 {
        // Killing the only pane kills the frame
        ed.destroy_frame(frame_id);
        return Ok(());
    }
    let mut frame = ed.frames.remove(&frame_id).unwrap();
    let result = frame.kill_pane(&mut ed.panes, ctx.pane);
    ed.frames.insert(frame_id, frame);
    let removed = result?;
    if let Some(sel) = ed.selection {
        if sel.pane == removed.id {
            ed.selection = None;
        }
    }
    ed.drop_pane_buffer(&removed);
    let current = ed.cur_pane_id();
    ed.contain_pane_cursor(current);
    Ok(())
}

pub fn kill_other_panes<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let frame_id = ed.current_frame;
    let others: Vec<_> = ed.frames[&frame_id]
        .panes
        .iter()
        .copied()
        .filter(|&id| id != ctx.pane)
        .collect();
    for pane_id in others {
        let mut frame = ed.frames.remove(&frame_id).unwrap();
        let result = frame.kill_pane(&mut ed.panes, pane_id);
        ed.frames.insert(frame_id, frame);
        if let Ok(removed) = result {
            if ed.selection.map(|s| s.pane) == Some(removed.id) {
                ed.selection = None;
            }
            ed.drop_pane_buffer(&removed);
        }
    }
    ed.contain_pane_cursor(ctx.pane);
    Ok(())
}

pub fn other_pane<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let frame = ed.cur_frame_mut();
    frame.current = frame.next_pane(ctx.pane);
    Ok(())
}

pub fn new_frame<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let (rows, cols) = {
        let frame = ed.cur_frame();
        (frame.rows, frame.cols)
    };
    let buffer = ed.pane(ctx.pane).buffer;
    let frame = ed.create_frame(rows, cols);
    ed.current_frame = frame;
    ed.add_pane(frame, buffer);
    Ok(())
}

pub fn other_frame<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    // Frames cycle in creation order; switching parks the selection
    if let Some(at) = ed.frame_order.iter().position(|&f| f == ed.current_frame) {
        if let Some(sel) = ed.selection.take() {
            ed.last_selection = Some(sel);
        }
        let next = ed.frame_order[(at + 1) % ed.frame_order.len()];
        ed.current_frame = next;
    }
    Ok(())
}

pub fn delete_frame<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    ed.destroy_frame(ed.current_frame);
    Ok(())
}

pub fn delete_other_frames<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    let keep = ed.current_frame;
    let others: Vec<_> = ed.frame_order.iter().copied().filter(|&f| f != keep).collect();
    for frame in others {
        ed.destroy_frame(frame);
    }
    Ok(())
}
