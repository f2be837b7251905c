//! Editor core
//!
//! Owns every arena (buffers, panes, frames) and every process-wide value:
//! the kill ring, the registry, dispatch state, the single selection, the
//! clipboard bridge, and whichever modal subsystem is active. The event
//! loop drains host events, runs commands to completion, then redraws; the
//! blink tick rides the event timeout. Ctrl+G aborts the active modal in
//! precedence order: mini-query, query-replace, incremental search,
//! command in progress.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::buffer::{Buffer, BufferId};
use crate::clipboard::{ClipboardBridge, PrimarySource};
use crate::constants::{errors, timing};
use crate::dispatch::DispatchState;
use crate::error::{ErrorSeverity, ErrorType, QuillError, Result};
use crate::file_ops;
use crate::frame::Frame;
use crate::host::{ClipSelection, HostEnv, HostEvent, MouseEvent, MouseKind, RequestId};
use crate::kill_ring::KillRing;
use crate::layout;
use crate::pane::{FrameId, Pane, PaneId};
use crate::query::{MiniQuery, QueryKind, QueryType};
use crate::registry::{CommandCtx, CommandId, Registry};
use crate::search::{ReplaceState, SearchState};
use crate::selection::Selection;
use crate::settings::Settings;
use crate::undo::flags;

mod draw;
mod input;
mod modal;

/// Ids of commands the core consults for repeat detection
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnown {
    pub undo: CommandId,
    pub yank: CommandId,
    pub yank_pop: CommandId,
    pub kill_line: CommandId,
    pub kill_region: CommandId,
    pub delete_word_forward: CommandId,
    pub delete_word_backward: CommandId,
    pub execute_named: CommandId,
}

/// A loaded file waiting on the filter confirmation
pub struct PendingLoad {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub new_frame: bool,
}

pub struct Editor<H: HostEnv> {
    pub host: H,
    pub buffers: HashMap<BufferId, Buffer>,
    pub panes: HashMap<PaneId, Pane>,
    pub frames: HashMap<FrameId, Frame>,
    /// Frames in creation order
    pub frame_order: Vec<FrameId>,
    pub current_frame: FrameId,
    next_buffer: BufferId,
    next_pane: PaneId,
    next_frame: FrameId,
    pub kill_ring: KillRing,
    pub registry: Registry<Editor<H>>,
    pub known: WellKnown,
    pub dispatch: DispatchState,
    pub selection: Option<Selection>,
    pub last_selection: Option<Selection>,
    pub clipboard: ClipboardBridge,
    pub query: Option<MiniQuery>,
    pub isearch: Option<SearchState>,
    pub qreplace: Option<ReplaceState>,
    pub popup: Option<crate::popup::ActivePopup<Editor<H>>>,
    /// Defaults for the next query-replace prompts
    pub prev_from: String,
    pub prev_to: String,
    /// Pattern of the last finished incremental search
    pub prev_search: Vec<u8>,
    pub settings: Settings,
    pub should_quit: bool,
    pub pending_load: Option<PendingLoad>,
    /// Pane, position, and length of the last yank, for yank-pop
    pub last_yank: Option<(PaneId, usize, usize)>,
    /// External clipboard text yanked but not yet entered into the ring
    pub pending_external_yank: Option<Vec<u8>>,
    blink_on: bool,
    last_click: Option<Instant>,
    click_count: u8,
    /// Pane whose mode line is being dragged to resize
    drag_resize: Option<PaneId>,
    /// Queued events deferred by a clipboard handshake
    replay: Vec<HostEvent>,
}

impl<H: HostEnv> Editor<H> {
    pub fn new(mut host: H) -> Result<Self> {
        host.init()?;
        let (rows, cols) = host.size();

        let mut editor = Editor {
            host,
            buffers: HashMap::new(),
            panes: HashMap::new(),
            frames: HashMap::new(),
            frame_order: Vec::new(),
            current_frame: 0,
            next_buffer: 1,
            next_pane: 1,
            next_frame: 1,
            kill_ring: KillRing::new(),
            registry: Registry::new(),
            known: WellKnown::default(),
            dispatch: DispatchState::new(),
            selection: None,
            last_selection: None,
            clipboard: ClipboardBridge::new(),
            query: None,
            isearch: None,
            qreplace: None,
            popup: None,
            prev_from: String::new(),
            prev_to: String::new(),
            prev_search: Vec::new(),
            settings: Settings::default(),
            should_quit: false,
            pending_load: None,
            last_yank: None,
            pending_external_yank: None,
            blink_on: true,
            last_click: None,
            click_count: 0,
            drag_resize: None,
            replay: Vec::new(),
        };
        crate::commands::install(&mut editor.registry, &mut editor.known);

        let frame = editor.create_frame(rows, cols);
        editor.current_frame = frame;
        let buffer = editor.create_buffer();
        editor.add_pane(frame, buffer);
        info!(rows, cols, "editor ready");
        Ok(editor)
    }

    /// Open the command-line files: the first replaces the initial buffer,
    /// the rest each get a frame of their own
    pub fn open_initial_files(&mut self, paths: &[String]) {
        let mut first = true;
        for raw in paths {
            if raw.is_empty() || raw.starts_with('-') {
                continue;
            }
            let path = PathBuf::from(raw);
            if let Err(err) = self.open_path(&path, !first) {
                self.report(err);
            }
            first = false;
        }
    }

    // ------------------------------------------------------------------
    // Arena management

    pub fn create_buffer(&mut self) -> BufferId {
        let id = self.next_buffer;
        self.next_buffer += 1;
        self.buffers.insert(id, Buffer::new(id));
        id
    }

    /// Claim the next pane id; used by split
    pub fn next_pane_id(&mut self) -> PaneId {
        let id = self.next_pane;
        self.next_pane += 1;
        id
    }

    pub fn create_frame(&mut self, rows: usize, cols: usize) -> FrameId {
        let id = self.next_frame;
        self.next_frame += 1;
        self.frames.insert(id, Frame::new(id, rows, cols));
        self.frame_order.push(id);
        id
    }

    /// Add a pane showing `buffer`, filling the frame
    pub fn add_pane(&mut self, frame: FrameId, buffer: BufferId) -> PaneId {
        let id = self.next_pane;
        self.next_pane += 1;
        let budget = self.frames[&frame].pane_budget();
        let mut pane = Pane::new(id, frame, buffer, budget);
        let buf = self.buffers.get_mut(&buffer).unwrap();
        buf.pane_refs += 1;
        pane.cursor = buf.last_cursor.min(buf.len());
        pane.viewport = buf.last_viewport.min(buf.len());
        self.panes.insert(id, pane);
        let frame = self.frames.get_mut(&frame).unwrap();
        frame.panes.push(id);
        frame.current = id;
        let f = frame.id;
        self.frames[&f].renumber(&mut self.panes);
        id
    }

    /// Detach a pane from its buffer, caching view state and destroying
    /// refcount-zero buffers that are not worth keeping
    pub fn drop_pane_buffer(&mut self, pane: &Pane) {
        if let Some(buf) = self.buffers.get_mut(&pane.buffer) {
            buf.pane_refs = buf.pane_refs.saturating_sub(1);
            buf.last_cursor = pane.cursor;
            buf.last_viewport = pane.viewport;
            if buf.pane_refs == 0 && buf.info_only {
                let id = buf.id;
                self.buffers.remove(&id);
                self.clipboard.note_buffer_killed(&mut self.host, id);
            }
        }
    }

    /// Destroy a frame and its panes; the last frame quits the program
    pub fn destroy_frame(&mut self, frame: FrameId) {
        if let Some(f) = self.frames.remove(&frame) {
            for pane_id in f.panes {
                if let Some(pane) = self.panes.remove(&pane_id) {
                    self.drop_pane_buffer(&pane);
                }
            }
        }
        self.frame_order.retain(|&id| id != frame);
        match self.frame_order.last() {
            Some(&next) => {
                if self.current_frame == frame {
                    self.current_frame = next;
                }
            }
            None => {
                self.should_quit = true;
            }
        }
    }

    // ------------------------------------------------------------------
    // Current-object accessors

    #[must_use]
    pub fn cur_frame(&self) -> &Frame {
        &self.frames[&self.current_frame]
    }

    pub fn cur_frame_mut(&mut self) -> &mut Frame {
        self.frames.get_mut(&self.current_frame).unwrap()
    }

    #[must_use]
    pub fn cur_pane_id(&self) -> PaneId {
        self.cur_frame().current
    }

    #[must_use]
    pub fn pane(&self, id: PaneId) -> &Pane {
        &self.panes[&id]
    }

    #[must_use]
    pub fn buffer_of(&self, pane: PaneId) -> &Buffer {
        &self.buffers[&self.panes[&pane].buffer]
    }

    #[must_use]
    pub fn row_chars(&self) -> usize {
        self.cur_frame().row_chars()
    }

    pub fn echo_message(&mut self, text: impl Into<String>) {
        self.cur_frame_mut().echo.message(text);
    }

    pub fn echo_error(&mut self, text: impl Into<String>) {
        self.cur_frame_mut().echo.error(text);
    }

    /// Route an error to the echo line; flashes where the taxonomy says so
    pub fn report(&mut self, err: QuillError) {
        debug!(%err, "command reported");
        if err.flashes() {
            self.flash();
            return;
        }
        match err.severity {
            ErrorSeverity::Info => self.echo_message(err.message),
            _ => self.echo_error(format!("{} ({})", err.message, err.code)),
        }
    }

    /// Short error flash in the echo line
    pub fn flash(&mut self) {
        self.cur_frame_mut().echo.flash();
        // The flash is visible for its whole interval; a clean sleep keeps
        // the handshake windows serviced often enough
        let _ = self.draw();
        std::thread::sleep(std::time::Duration::from_millis(timing::FLASH_MS));
        self.cur_frame_mut().echo.clear();
    }

    // ------------------------------------------------------------------
    // Buffer mutation entry points used by every command

    /// Insert at the pane's cursor. An active selection in that pane is
    /// deleted first, chained with the insertion as one undo operation.
    pub fn insert_text(&mut self, pane_id: PaneId, bytes: &[u8]) -> Result<()> {
        let mut chain = false;
        if let Some(sel) = self.selection {
            if sel.pane == pane_id {
                let cursor = self.pane(pane_id).cursor;
                let (start, end) = sel.range(cursor);
                if start < end {
                    self.delete_text(pane_id, start, end - start, false, flags::CHUNK)?;
                    chain = true;
                }
                self.selection = None;
            }
        }

        let bits = if chain { flags::CHAIN } else { 0 };
        self.insert_text_bits(pane_id, bytes, bits)
    }

    /// Insert at the pane's cursor with explicit undo flag bits
    pub fn insert_text_bits(&mut self, pane_id: PaneId, bytes: &[u8], bits: u8) -> Result<()> {
        let pos = self.pane(pane_id).cursor;
        let buffer_id = self.pane(pane_id).buffer;
        self.buffers
            .get_mut(&buffer_id)
            .unwrap()
            .insert(pos, bytes, bits)?;
        self.clipboard
            .note_insert(&mut self.host, buffer_id, pos, bytes.len());
        self.adjust_panes_insert(buffer_id, pos, bytes.len());
        let pane = self.panes.get_mut(&pane_id).unwrap();
        pane.cursor = pos + bytes.len();
        self.refresh_buffer_panes(buffer_id);
        Ok(())
    }

    /// Delete a range from the pane's buffer; returns the removed bytes
    pub fn delete_text(
        &mut self,
        pane_id: PaneId,
        pos: usize,
        len: usize,
        backward: bool,
        bits: u8,
    ) -> Result<Vec<u8>> {
        let buffer_id = self.pane(pane_id).buffer;
        let data = self
            .buffers
            .get_mut(&buffer_id)
            .unwrap()
            .delete(pos, len, bits, backward)?;
        self.clipboard
            .note_delete(&mut self.host, buffer_id, pos, len);
        self.adjust_panes_delete(buffer_id, pos, len);
        self.refresh_buffer_panes(buffer_id);
        Ok(data)
    }

    /// Slide every pane on `buffer` across an insertion
    fn adjust_panes_insert(&mut self, buffer: BufferId, pos: usize, n: usize) {
        for pane in self.panes.values_mut() {
            if pane.buffer != buffer {
                continue;
            }
            if pane.viewport >= pos {
                pane.viewport += n;
            }
            if pane.cursor >= pos {
                pane.cursor += n;
            }
            pane.invalidate_rows();
        }
        if let Some(sel) = self.selection.as_mut() {
            if self.panes.get(&sel.pane).map(|p| p.buffer) == Some(buffer)
                && sel.mark_pos >= pos
            {
                sel.mark_pos += n;
            }
        }
    }

    /// Slide every pane on `buffer` across a deletion
    fn adjust_panes_delete(&mut self, buffer: BufferId, pos: usize, n: usize) {
        let clamp = |v: usize| {
            if v >= pos + n {
                v - n
            } else if v > pos {
                pos
            } else {
                v
            }
        };
        for pane in self.panes.values_mut() {
            if pane.buffer != buffer {
                continue;
            }
            pane.viewport = clamp(pane.viewport);
            pane.cursor = clamp(pane.cursor);
            pane.invalidate_rows();
        }
        if let Some(sel) = self.selection.as_mut() {
            if self.panes.get(&sel.pane).map(|p| p.buffer) == Some(buffer) {
                sel.mark_pos = clamp(sel.mark_pos);
            }
        }
    }

    /// Re-run cursor containment for every pane showing `buffer`
    pub fn refresh_buffer_panes(&mut self, buffer: BufferId) {
        let ids: Vec<PaneId> = self
            .panes
            .values()
            .filter(|p| p.buffer == buffer)
            .map(|p| p.id)
            .collect();
        for id in ids {
            self.contain_pane_cursor(id);
        }
    }

    pub fn contain_pane_cursor(&mut self, pane_id: PaneId) {
        let Some(pane) = self.panes.get(&pane_id) else {
            return;
        };
        let frame = pane.frame;
        let row_chars = self.frames[&frame].row_chars();
        let buffer = pane.buffer;
        let buf = self.buffers.get(&buffer).unwrap();
        let pane = self.panes.get_mut(&pane_id).unwrap();
        pane.contain_cursor(buf.text(), row_chars);
    }

    // ------------------------------------------------------------------
    // Selection

    /// Install a selection with its mark at `mark_pos`
    pub fn set_selection(&mut self, pane_id: PaneId, mark_pos: usize) {
        let row_chars = self.row_chars();
        let buf = self.buffer_of(pane_id);
        let loc = layout::find_location(buf.text(), 0, mark_pos, row_chars);
        self.selection = Some(Selection::new(pane_id, mark_pos, loc.row, loc.col));
        let source = PrimarySource::Range {
            buffer: self.pane(pane_id).buffer,
            pos: mark_pos,
            len: 0,
        };
        self.clipboard.claim_primary(&mut self.host, source);
    }

    /// Refresh the primary claim to the selection's current extent
    pub fn sync_primary_to_selection(&mut self) {
        if let Some(sel) = self.selection {
            let cursor = self.pane(sel.pane).cursor;
            let (start, end) = sel.range(cursor);
            let source = PrimarySource::Range {
                buffer: self.pane(sel.pane).buffer,
                pos: start,
                len: end - start,
            };
            self.clipboard.claim_primary(&mut self.host, source);
        }
    }

    /// Claim the clipboard selection and publish the kill-ring top to
    /// push-style hosts
    pub fn claim_clipboard_top(&mut self) {
        self.clipboard.claim_clipboard(&mut self.host);
        let data = self.kill_ring.top_bytes().to_vec();
        self.host.publish_selection(ClipSelection::Clipboard, &data);
    }

    /// Movement commands call this before moving: shifted presses extend
    /// the selection, plain ones cancel it
    pub fn shift_select_pre(&mut self, pane_id: PaneId) {
        if self.dispatch.shift {
            if self.selection.is_none() {
                let cursor = self.pane(pane_id).cursor;
                self.set_selection(pane_id, cursor);
            }
        } else {
            self.selection = None;
        }
    }

    // ------------------------------------------------------------------
    // Files

    /// Open a path into the current frame or a new one
    pub fn open_path(&mut self, path: &Path, new_frame: bool) -> Result<()> {
        let loaded = file_ops::read_file(path)?;
        if loaded.wants_filter && self.settings.offer_filter {
            self.pending_load = Some(PendingLoad {
                path: path.to_path_buf(),
                bytes: loaded.bytes,
                new_frame,
            });
            let pane = self.cur_pane_id();
            self.query = Some(MiniQuery::new(
                pane,
                "Convert CR/TAB bytes on load? [y n] ",
                "",
                QueryType::Letter,
                QueryKind::ConfirmFilter,
            ));
            return Ok(());
        }
        self.finish_load(path.to_path_buf(), loaded.bytes, false, new_frame)
    }

    /// Install loaded bytes as a buffer in a pane
    pub fn finish_load(
        &mut self,
        path: PathBuf,
        bytes: Vec<u8>,
        filtered: bool,
        new_frame: bool,
    ) -> Result<()> {
        let bytes = if filtered {
            file_ops::filter(&bytes, self.settings.tab_stop)
        } else {
            bytes
        };
        let id = self.next_buffer;
        self.next_buffer += 1;
        let mut buffer = Buffer::from_bytes(id, &bytes, filtered);
        let (name, dir) = file_ops::split_path(&path);
        // Mark name collisions both ways
        for other in self.buffers.values_mut() {
            if other.file_name == name {
                other.collision = true;
                buffer.collision = true;
            }
        }
        buffer.file_name = name;
        buffer.dir_path = dir;
        self.buffers.insert(id, buffer);

        if new_frame {
            let (rows, cols) = {
                let f = self.cur_frame();
                (f.rows, f.cols)
            };
            let frame = self.create_frame(rows, cols);
            self.current_frame = frame;
            self.add_pane(frame, id);
        } else {
            self.show_buffer_in_pane(self.cur_pane_id(), id);
        }
        self.echo_message(format!("Read {}", path.display()));
        Ok(())
    }

    /// Point a pane at a different buffer, caching the old view state
    pub fn show_buffer_in_pane(&mut self, pane_id: PaneId, buffer: BufferId) {
        let old = self.panes.get(&pane_id).map(|p| (p.buffer, p.cursor, p.viewport));
        if let Some((old_buf, cursor, viewport)) = old {
            if old_buf == buffer {
                return;
            }
            if let Some(buf) = self.buffers.get_mut(&old_buf) {
                buf.pane_refs = buf.pane_refs.saturating_sub(1);
                buf.last_cursor = cursor;
                buf.last_viewport = viewport;
            }
            let kill_old = self
                .buffers
                .get(&old_buf)
                .map(|b| b.pane_refs == 0 && b.info_only)
                .unwrap_or(false);
            if kill_old {
                self.buffers.remove(&old_buf);
                self.clipboard.note_buffer_killed(&mut self.host, old_buf);
            }
        }
        let (last_cursor, last_viewport) = {
            let buf = self.buffers.get_mut(&buffer).unwrap();
            buf.pane_refs += 1;
            (buf.last_cursor, buf.last_viewport)
        };
        let len = self.buffers[&buffer].len();
        let pane = self.panes.get_mut(&pane_id).unwrap();
        pane.buffer = buffer;
        pane.cursor = last_cursor.min(len);
        pane.viewport = last_viewport.min(len);
        pane.invalidate_rows();
        self.contain_pane_cursor(pane_id);
    }

    // ------------------------------------------------------------------
    // Command execution

    pub fn execute(&mut self, id: CommandId, pane: PaneId) {
        let ctx = CommandCtx {
            pane,
            prefix: self.dispatch.prefix(),
            id,
        };
        let run = self.registry.run_of(id);
        let result = run(self, &ctx);
        self.dispatch.reset();

        // The named-execute dispatch is transparent for repeat detection:
        // its target already recorded itself
        if id != self.known.execute_named {
            self.dispatch.last_command = Some(id);
        }
        if id != self.known.undo {
            let buffer = self.panes.get(&pane).map(|p| p.buffer);
            if let Some(buf) = buffer.and_then(|b| self.buffers.get_mut(&b)) {
                buf.undo.end_read();
            }
        }
        if let Err(err) = result {
            self.report(err);
        }
    }

    /// Run a command by name (`execute-named-command` and tests)
    pub fn execute_named(&mut self, name: &str) -> Result<()> {
        let id = self.registry.find(name).ok_or_else(|| {
            QuillError::new(
                ErrorType::Boundary,
                errors::UNDEFINED_KEY,
                format!("No command named {}", name),
            )
        })?;
        let pane = self.cur_pane_id();
        self.execute(id, pane);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event loop

    pub fn run(&mut self) -> Result<i32> {
        self.draw()?;
        while !self.should_quit {
            let event = match self.host.wait_event(self.settings.blink_ms) {
                Ok(event) => event,
                Err(err) => {
                    self.report(err);
                    continue;
                }
            };
            match event {
                Some(event) => self.handle_event(event),
                None => {
                    self.blink_on = !self.blink_on;
                    self.draw_cursor_only();
                }
            }
            while let Some(event) = self.pop_replay() {
                self.handle_event(event);
            }
            if !self.should_quit {
                let _ = self.draw();
            }
        }
        self.host.deinit();
        Ok(0)
    }

    fn pop_replay(&mut self) -> Option<HostEvent> {
        if self.replay.is_empty() {
            None
        } else {
            Some(self.replay.remove(0))
        }
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Key(press) => {
                // Typing keeps the blinker solid
                self.blink_on = true;
                self.handle_key(press);
            }
            HostEvent::Mouse(mouse) => self.handle_mouse(mouse),
            HostEvent::Resize { rows, cols } => self.handle_resize(rows, cols),
            HostEvent::FocusIn => {
                if let Some(sel) = self.last_selection.take() {
                    if self.panes.contains_key(&sel.pane) {
                        self.selection = Some(sel);
                    }
                }
            }
            HostEvent::FocusOut => {
                if self.query.is_some() {
                    self.abort_query();
                }
                if let Some(sel) = self.selection.take() {
                    self.last_selection = Some(sel);
                }
            }
            HostEvent::SelectionRequest { which, req } => {
                self.serve_selection(which, req);
            }
            HostEvent::SelectionCleared { which } => self.clipboard.lost(which),
            HostEvent::ChunkAck { .. }
            | HostEvent::PasteData { .. }
            | HostEvent::PasteRefused => {
                // Transfer answers outside a handshake are stale; drop them
            }
            HostEvent::Quit => self.should_quit = true,
        }
    }

    fn handle_resize(&mut self, rows: usize, cols: usize) {
        let frame_id = self.current_frame;
        let old_row_chars = self.frames[&frame_id].row_chars();
        {
            let frame = self.frames.get_mut(&frame_id).unwrap();
            frame.rows = rows;
            frame.cols = cols;
        }
        let min_rows = self.settings.pane_min_rows;
        let pane_ids = self.frames[&frame_id].panes.clone();
        {
            // Height: rescale the stack
            let mut frame = self.frames.remove(&frame_id).unwrap();
            frame.apply_height(&mut self.panes, min_rows);
            self.frames.insert(frame_id, frame);
        }
        let new_row_chars = self.frames[&frame_id].row_chars();
        if new_row_chars != old_row_chars {
            for pane_id in pane_ids {
                let buffer = self.panes[&pane_id].buffer;
                let buf = self.buffers.get(&buffer).unwrap();
                let pane = self.panes.get_mut(&pane_id).unwrap();
                pane.rewrap(buf.text(), old_row_chars, new_row_chars);
            }
        } else {
            for pane_id in pane_ids {
                self.contain_pane_cursor(pane_id);
            }
        }
    }

    /// Serve a clipboard request for a selection we own
    fn serve_selection(&mut self, which: ClipSelection, req: RequestId) {
        let data: Option<Vec<u8>> = match which {
            ClipSelection::Primary => match self.clipboard.primary {
                Some(PrimarySource::Range { buffer, pos, len }) => self
                    .buffers
                    .get(&buffer)
                    .map(|b| b.text().copy_range(pos, len.min(b.len().saturating_sub(pos)))),
                Some(PrimarySource::KillTop) => Some(self.kill_ring.top_bytes().to_vec()),
                None => None,
            },
            ClipSelection::Clipboard => {
                if self.clipboard.clipboard_owned {
                    Some(self.kill_ring.top_bytes().to_vec())
                } else {
                    None
                }
            }
        };
        let Some(data) = data else { return };
        match self.clipboard.export(&mut self.host, req, &data) {
            Ok(mut deferred) => self.replay.append(&mut deferred),
            Err(err) => self.report(err),
        }
    }

    /// Pump the event loop once without blocking; used by replace-all so
    /// clipboard requests stay serviced
    pub fn pump_events(&mut self) {
        if let Ok(Some(event)) = self.host.wait_event(0) {
            // Modal-safe subset only: clipboard service and focus
            match event {
                HostEvent::SelectionRequest { which, req } => self.serve_selection(which, req),
                HostEvent::SelectionCleared { which } => self.clipboard.lost(which),
                other => self.replay.push(other),
            }
        }
    }

    // ------------------------------------------------------------------
    // Mouse

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let frame_id = self.current_frame;
        let Some(pane_id) = self.frames[&frame_id].pane_at_row(&self.panes, mouse.row) else {
            return;
        };
        match mouse.kind {
            MouseKind::Press => {
                // Grabbing a mode line starts a boundary drag
                let on_mode_line = {
                    let pane = &self.panes[&pane_id];
                    pane.mode_line && mouse.row == pane.top_row + pane.rows - 1
                };
                if on_mode_line {
                    self.drag_resize = Some(pane_id);
                    return;
                }
                self.frames.get_mut(&frame_id).unwrap().current = pane_id;

                let now = Instant::now();
                let window = timing::DOUBLE_CLICK_MS
                    + timing::CLICK_EXTEND_MS * self.click_count as u64;
                let run_continues = self
                    .last_click
                    .map(|at| now.duration_since(at).as_millis() as u64 <= window)
                    .unwrap_or(false);
                self.click_count = if run_continues {
                    self.click_count.saturating_add(1)
                } else {
                    1
                };
                self.last_click = Some(now);

                self.place_cursor_at_cell(pane_id, mouse.row, mouse.col);
                match self.click_count {
                    1 => {
                        let cursor = self.pane(pane_id).cursor;
                        self.selection = None;
                        self.set_selection(pane_id, cursor);
                    }
                    2 => self.select_word_at_cursor(pane_id),
                    _ => {
                        let _ = crate::commands::run_select_line(self, pane_id);
                    }
                }
            }
            MouseKind::Drag => {
                if let Some(upper) = self.drag_resize {
                    self.drag_boundary_to(upper, mouse.row);
                    return;
                }
                self.place_cursor_at_cell(pane_id, mouse.row, mouse.col);
            }
            MouseKind::Release => {
                if self.drag_resize.take().is_some() {
                    return;
                }
                if let Some(sel) = self.selection {
                    let cursor = self.pane(sel.pane).cursor;
                    if sel.is_empty(cursor) {
                        // A selection collapses when mark and cursor meet
                        self.selection = None;
                        self.clipboard.release_primary(&mut self.host);
                    } else {
                        self.sync_primary_to_selection();
                    }
                }
            }
            MouseKind::WheelUp => self.scroll_pane(pane_id, -3),
            MouseKind::WheelDown => self.scroll_pane(pane_id, 3),
        }
    }

    /// Drag the boundary under a mode line to a new frame row
    fn drag_boundary_to(&mut self, upper: PaneId, row: usize) {
        let frame_id = self.current_frame;
        let boundary = {
            let pane = &self.panes[&upper];
            pane.top_row + pane.rows - 1
        };
        let delta = row as isize - boundary as isize;
        if delta == 0 {
            return;
        }
        let min_rows = self.settings.pane_min_rows;
        let mut frame = self.frames.remove(&frame_id).unwrap();
        let moved = frame.resize_boundary(&mut self.panes, upper, delta, min_rows);
        self.frames.insert(frame_id, frame);
        if moved.is_ok() {
            let below = self.frames[&frame_id].next_pane(upper);
            self.contain_pane_cursor(upper);
            self.contain_pane_cursor(below);
        }
    }

    /// Move a pane's cursor to a clicked cell
    fn place_cursor_at_cell(&mut self, pane_id: PaneId, row: usize, col: usize) {
        let row_chars = self.row_chars();
        let (viewport, top_row, content_rows, buffer) = {
            let pane = self.pane(pane_id);
            (pane.viewport, pane.top_row, pane.content_rows(), pane.buffer)
        };
        let pane_row = row.saturating_sub(top_row).min(content_rows.saturating_sub(1));
        // In the overflow column of the last pane row the cursor may not
        // fall off the bottom
        let col = if pane_row + 1 == content_rows {
            col.min(row_chars)
        } else {
            col
        };
        let buf = self.buffers.get(&buffer).unwrap();
        let (pos, _) = layout::find_position(buf.text(), viewport, pane_row, col, row_chars);
        let pane = self.panes.get_mut(&pane_id).unwrap();
        pane.cursor = pos;
        self.contain_pane_cursor(pane_id);
    }

    fn select_word_at_cursor(&mut self, pane_id: PaneId) {
        let (start, end) = {
            let buf = self.buffer_of(pane_id);
            let text = buf.text();
            let cursor = self.pane(pane_id).cursor;
            let mut start = cursor;
            while start > 0 && crate::buffer::gap::is_word_byte(text.byte_at(start - 1)) {
                start = text.step_backward(start);
            }
            let mut end = cursor;
            while end < text.len() && crate::buffer::gap::is_word_byte(text.byte_at(end)) {
                end = text.step_forward(end);
            }
            (start, end)
        };
        if start < end {
            self.set_selection(pane_id, start);
            self.panes.get_mut(&pane_id).unwrap().cursor = end;
            self.sync_primary_to_selection();
        }
    }

    pub fn scroll_pane(&mut self, pane_id: PaneId, rows: isize) {
        let row_chars = self.row_chars();
        let buffer = self.pane(pane_id).buffer;
        let buf = self.buffers.get(&buffer).unwrap();
        let pane = self.panes.get_mut(&pane_id).unwrap();
        if rows >= 0 {
            let (view, moved) =
                layout::pos_plus_rows(buf.text(), pane.viewport, rows as usize, row_chars);
            pane.viewport = view;
            pane.rows_before_view += moved;
        } else {
            let (view, moved) =
                layout::pos_minus_rows(buf.text(), pane.viewport, (-rows) as usize, row_chars);
            pane.viewport = view;
            pane.rows_before_view = pane.rows_before_view.saturating_sub(moved);
        }
        // Keep the cursor inside the scrolled view
        let visible = pane.content_rows();
        let cursor_ok = pane.cursor >= pane.viewport && {
            let loc = layout::find_location(buf.text(), pane.viewport, pane.cursor, row_chars);
            loc.row < visible
        };
        if !cursor_ok {
            let (pos, _) = layout::find_position(buf.text(), pane.viewport, 0, 0, row_chars);
            pane.cursor = pos;
        }
        self.contain_pane_cursor(pane_id);
    }

    // ------------------------------------------------------------------
    // Quit paths

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
