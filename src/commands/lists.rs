//! Pop-up lists, help, and small odds and ends

use crate::editor::Editor;
use crate::error::Result;
use crate::host::HostEnv;
use crate::layout;
use crate::pane::PaneId;
use crate::popup::{ActivePopup, ListProvider};
use crate::query::{QueryKind, QueryType};
use crate::registry::CommandCtx;

pub fn execute_named_command<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    ed.open_query("M-x ", "", QueryType::Str, QueryKind::NamedCommand);
    Ok(())
}

pub fn set_option<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    ed.open_query("Option: ", "", QueryType::Str, QueryKind::SetOption { name: None });
    Ok(())
}

pub fn unmodify<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let buffer = ed.pane(ctx.pane).buffer;
    ed.buffers.get_mut(&buffer).unwrap().unmodify();
    ed.echo_message("Modification flag cleared");
    Ok(())
}

pub fn cursor_info<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let pane = ctx.pane;
    let row_chars = ed.row_chars();
    let (pos, len, line, col) = {
        let buf = ed.buffer_of(pane);
        let cursor = ed.pane(pane).cursor;
        let text = buf.text();
        let line = {
            let (a, b) = text.slices(0, cursor);
            a.iter().filter(|&&c| c == b'\n').count()
                + b.iter().filter(|&&c| c == b'\n').count()
                + 1
        };
        let start = text.line_start(cursor);
        let col = layout::find_location(text, start, cursor, row_chars.max(1)).col;
        (cursor, buf.len(), line, col)
    };
    ed.echo_message(format!(
        "Char {} of {}, line {}, column {}",
        pos, len, line, col
    ));
    Ok(())
}

/// Open an info-only buffer listing every command and its bindings
pub fn help<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    let mut text = String::from("Quill commands\n\n");
    let names: Vec<&str> = ed.registry.names().collect();
    for name in names {
        let id = ed.registry.find(name).unwrap();
        let seqs: Vec<String> = ed
            .registry
            .bindings_of(id)
            .map(|b| crate::dispatch::format_seq(&b.seq))
            .collect();
        if seqs.is_empty() {
            text.push_str(&format!("{:<28} M-x {}\n", name, name));
        } else {
            text.push_str(&format!("{:<28} {}\n", name, seqs.join(", ")));
        }
    }
    let id = ed.create_buffer();
    {
        let buf = ed.buffers.get_mut(&id).unwrap();
        *buf = crate::buffer::Buffer::from_bytes(id, text.as_bytes(), false);
        buf.file_name = "*help*".to_string();
        buf.info_only = true;
        buf.read_only = true;
        buf.unmodify();
    }
    ed.show_buffer_in_pane(ctx.pane, id);
    Ok(())
}

// ----------------------------------------------------------------------
// Pop-up list providers

struct MarkList {
    pane: PaneId,
}

impl<H: HostEnv> ListProvider<Editor<H>> for MarkList {
    fn title(&self) -> &str {
        "Marks"
    }

    fn draw(&self, ed: &Editor<H>) -> Vec<String> {
        let buf = ed.buffer_of(self.pane);
        let mut seen = Vec::new();
        for pos in buf.marks.iter_recent() {
            if seen.contains(&pos) {
                continue;
            }
            seen.push(pos);
        }
        seen.iter()
            .map(|&pos| {
                let end = buf.text().line_end(pos).min(pos + 32);
                let ctx = String::from_utf8_lossy(&buf.text().copy_range(pos, end - pos))
                    .into_owned();
                format!("{:>8}  {}", pos, ctx)
            })
            .collect()
    }

    fn submit(&mut self, ed: &mut Editor<H>, index: usize) -> Result<()> {
        let target = {
            let buf = ed.buffer_of(self.pane);
            let mut seen = Vec::new();
            for pos in buf.marks.iter_recent() {
                if !seen.contains(&pos) {
                    seen.push(pos);
                }
            }
            seen.get(index).map(|&pos| pos.min(buf.len()))
        };
        if let Some(pos) = target {
            ed.panes.get_mut(&self.pane).unwrap().cursor = pos;
            ed.contain_pane_cursor(self.pane);
        }
        Ok(())
    }

    fn exit(&mut self, _ed: &mut Editor<H>) {}
}

struct KillList {
    pane: PaneId,
}

impl<H: HostEnv> ListProvider<Editor<H>> for KillList {
    fn title(&self) -> &str {
        "Kill ring"
    }

    fn draw(&self, ed: &Editor<H>) -> Vec<String> {
        ed.kill_ring
            .iter_recent()
            .map(|entry| {
                let preview = String::from_utf8_lossy(&entry[..entry.len().min(48)])
                    .replace('\n', "\\n");
                format!("{:>4}  {}", entry.len(), preview)
            })
            .collect()
    }

    fn submit(&mut self, ed: &mut Editor<H>, index: usize) -> Result<()> {
        let data: Option<Vec<u8>> = ed.kill_ring.iter_recent().nth(index).map(|e| e.to_vec());
        if let Some(data) = data {
            ed.insert_text(self.pane, &data)?;
        }
        Ok(())
    }

    fn exit(&mut self, _ed: &mut Editor<H>) {}
}

struct CommandList;

impl<H: HostEnv> ListProvider<Editor<H>> for CommandList {
    fn title(&self) -> &str {
        "Commands"
    }

    fn draw(&self, ed: &Editor<H>) -> Vec<String> {
        ed.registry
            .names()
            .map(|name| {
                let id = ed.registry.find(name).unwrap();
                let binding = ed
                    .registry
                    .bindings_of(id)
                    .next()
                    .map(|b| crate::dispatch::format_seq(&b.seq))
                    .unwrap_or_default();
                format!("{:<28} {}", name, binding)
            })
            .collect()
    }

    fn submit(&mut self, ed: &mut Editor<H>, index: usize) -> Result<()> {
        let name: Option<&str> = ed.registry.names().nth(index);
        if let Some(name) = name {
            let name = name.to_string();
            ed.execute_named(&name)?;
        }
        Ok(())
    }

    fn exit(&mut self, _ed: &mut Editor<H>) {}
}

struct BufferList {
    pane: PaneId,
}

impl<H: HostEnv> ListProvider<Editor<H>> for BufferList {
    fn title(&self) -> &str {
        "Buffers"
    }

    fn draw(&self, ed: &Editor<H>) -> Vec<String> {
        sorted_buffers(ed)
            .into_iter()
            .map(|id| {
                let buf = &ed.buffers[&id];
                format!(
                    "{}{} {:<24} {:>8}",
                    if buf.is_modified() { '*' } else { ' ' },
                    if buf.read_only { '%' } else { ' ' },
                    buf.display_name(),
                    buf.len()
                )
            })
            .collect()
    }

    fn submit(&mut self, ed: &mut Editor<H>, index: usize) -> Result<()> {
        if let Some(&id) = sorted_buffers(ed).get(index) {
            ed.show_buffer_in_pane(self.pane, id);
        }
        Ok(())
    }

    fn exit(&mut self, _ed: &mut Editor<H>) {}
}

fn sorted_buffers<H: HostEnv>(ed: &Editor<H>) -> Vec<crate::buffer::BufferId> {
    let mut ids: Vec<_> = ed.buffers.keys().copied().collect();
    ids.sort_unstable();
    ids
}

fn open_popup<H: HostEnv>(ed: &mut Editor<H>, provider: Box<dyn ListProvider<Editor<H>>>) {
    let popup = ActivePopup::new(provider, ed);
    let at = {
        let pane = &ed.panes[&ed.cur_pane_id()];
        (pane.top_row, 2)
    };
    ed.cur_frame_mut().last_popup = at;
    ed.popup = Some(popup);
}

pub fn popup_mark_list<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    open_popup(ed, Box::new(MarkList { pane: ctx.pane }));
    Ok(())
}

pub fn popup_kill_list<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    open_popup(ed, Box::new(KillList { pane: ctx.pane }));
    Ok(())
}

pub fn popup_command_list<H: HostEnv>(ed: &mut Editor<H>, _ctx: &CommandCtx) -> Result<()> {
    open_popup(ed, Box::new(CommandList));
    Ok(())
}

pub fn popup_buffer_list<H: HostEnv>(ed: &mut Editor<H>, ctx: &CommandCtx) -> Result<()> {
    open_popup(ed, Box::new(BufferList { pane: ctx.pane }));
    Ok(())
}
