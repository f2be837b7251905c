//! File and buffer commands

use crate::editor::Editor;
use crate::error::Result;
use crate::host::HostEnv;
use crate::query::{QueryKind, QueryType};
use crate::registry::CommandCtx;

pub fn find_file<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    let initial = default_dir(ed);
    ed.open_query(
        "Find file: ",
        initial,
        QueryType::Str,
        QueryKind::FindFile { new_frame: false },
    );
    Ok(())
}

pub fn insert_file<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    let initial = default_dir(ed);
    ed.open_query("Insert file: ", initial, QueryType::Str, QueryKind::InsertFile);
    Ok(())
}

pub fn write_file<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    let initial = default_dir(ed);
    ed.open_query("Write file: ", initial, QueryType::Str, QueryKind::WriteFile);
    Ok(())
}

pub fn save_file<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let (path, filtered, modified) = {
        let buf = ed.buffer_of(pane);
        (
            buf.dir_path.clone().map(|d| d.join(&buf.file_name)),
            buf.filtered,
            buf.is_modified(),
        )
    };
    let Some(path) = path else {
        // No file behind this buffer yet: fall back to write-file
        return write_file(ed, ctx);
    };
    if !modified {
        ed.echo_message("No changes need saving");
        return Ok(());
    }
    if filtered {
        // The filter rewrote the bytes; overwriting the original needs a nod
        ed.open_query(
            format!("{} was filtered on load; overwrite? [y n] ", path.display()),
            "",
            QueryType::Letter,
            QueryKind::ConfirmOverwriteFiltered { path },
        );
        return Ok(());
    }
    ed.write_current_buffer(&path)
}

pub fn save_some_files<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    let queue = modified_file_buffers(ed);
    if queue.is_empty() {
        ed.echo_message("No modified file buffers");
        return Ok(());
    }
    ed.continue_save_some(queue, false);
    Ok(())
}

pub fn save_and_quit<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    let queue = modified_file_buffers(ed);
    if queue.is_empty() {
        ed.request_quit();
        return Ok(());
    }
    ed.continue_save_some(queue, true);
    Ok(())
}

pub fn quit<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    ed.request_quit();
    Ok(())
}

pub fn switch_to_buffer<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    ed.open_query("Switch to buffer: ", "", QueryType::Str, QueryKind::SwitchBuffer);
    Ok(())
}

pub fn kill_buffer<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let current = ed.buffer_of(ctx.pane).file_name.clone();
    ed.open_query("Kill buffer: ", current, QueryType::Str, QueryKind::KillBuffer);
    Ok(())
}

pub fn pwd<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let dir = ed
        .buffer_of(ctx.pane)
        .dir_path
        .clone()
        .or_else(|| std::env::current_dir().ok());
    match dir {
        Some(dir) => ed.echo_message(format!("Directory {}", dir.display())),
        None => ed.echo_message("No working directory"),
    }
    Ok(())
}

fn default_dir<H: HostEnv>(ed: &Editor<H>) -> String {
    ed.buffer_of(ed.cur_pane_id())
        .dir_path
        .as_ref()
        .map(|d| {
            let mut s = d.display().to_string();
            if !s.ends_with('/') {
                s.push('/');
            }
            s
        })
        .unwrap_or_default()
}

fn modified_file_buffers<H: HostEnv>(ed: &Editor<H>) -> Vec<crate::buffer::BufferId> {
    let mut queue: Vec<_> = ed
        .buffers
        .values()
        .filter(|b| b.is_modified() && b.dir_path.is_some() && !b.info_only)
        .map(|b| b.id)
        .collect();
    queue.sort_unstable();
    queue
}
