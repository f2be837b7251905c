//! Buffer: one editable document
//!
//! Owns the gap buffer, the mark ring, the undo log, and the document's
//! identity (name, path, flags). All mutation funnels through `insert` and
//! `delete` so that undo records, mark adjustment, and the modified flag
//! stay in step; a command either completes through here or fails before
//! touching anything.

use std::path::PathBuf;

use tracing::trace;

use crate::constants::{errors, ui};
use crate::error::{ErrorType, QuillError, Result};
use crate::undo::{flags, BlockKind, UndoLog};

pub mod gap;
pub mod mark_ring;

pub use gap::GapBuffer;
pub use mark_ring::MarkRing;

pub type BufferId = u64;

/// Outcome of one undo invocation
#[derive(Debug)]
pub struct UndoOutcome {
    /// Where the cursor should land
    pub cursor: usize,
    /// The buffer returned to its last clean state
    pub now_clean: bool,
}

pub struct Buffer {
    pub id: BufferId,
    text: GapBuffer,
    pub marks: MarkRing,
    pub undo: UndoLog,
    /// File name without its directory
    pub file_name: String,
    pub dir_path: Option<PathBuf>,
    /// Another live buffer shares this file name
    pub collision: bool,
    /// Panes currently displaying this buffer
    pub pane_refs: u32,
    modified: bool,
    pub read_only: bool,
    /// The load filter rewrote CR/TAB bytes
    pub filtered: bool,
    /// Transient informational buffer, destroyed at zero refs
    pub info_only: bool,
    /// Cursor and viewport remembered for the next pane that shows this
    pub last_cursor: usize,
    pub last_viewport: usize,
}

impl Buffer {
    pub fn new(id: BufferId) -> Self {
        Buffer {
            id,
            text: GapBuffer::new(),
            marks: MarkRing::new(),
            undo: UndoLog::new(),
            file_name: ui::NO_NAME.to_string(),
            dir_path: None,
            collision: false,
            pane_refs: 0,
            modified: false,
            read_only: false,
            filtered: false,
            info_only: false,
            last_cursor: 0,
            last_viewport: 0,
        }
    }

    /// Create from loaded file bytes; the filter has already run if wanted
    pub fn from_bytes(id: BufferId, bytes: &[u8], filtered: bool) -> Self {
        let mut buf = Self::new(id);
        buf.text = GapBuffer::from_bytes(bytes);
        buf.filtered = filtered;
        buf.modified = filtered;
        buf
    }

    #[must_use]
    pub fn text(&self) -> &GapBuffer {
        &self.text
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Name shown in mode lines; collision-tagged names carry the directory
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.collision {
            if let Some(dir) = &self.dir_path {
                return format!("{} ({})", self.file_name, dir.display());
            }
        }
        self.file_name.clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(QuillError::new(
                ErrorType::Policy,
                errors::READ_ONLY,
                "Buffer is read-only",
            ));
        }
        Ok(())
    }

    /// The FIRSTMOD bit for the next record after a clean state
    fn mod_flags(&self, flag_bits: u8) -> u8 {
        if self.modified {
            flag_bits
        } else {
            flag_bits | flags::FIRSTMOD
        }
    }

    /// Insert bytes at a position, recording undo and adjusting marks
    pub fn insert(&mut self, pos: usize, bytes: &[u8], flag_bits: u8) -> Result<()> {
        self.check_writable()?;
        if bytes.is_empty() {
            return Ok(());
        }
        let flag_bits = self.mod_flags(flag_bits);
        self.text.insert(pos, bytes);
        self.undo.record_add(pos, bytes.len(), flag_bits);
        self.marks.adjust(pos, bytes.len() as isize);
        self.modified = true;
        trace!(pos, len = bytes.len(), "insert");
        Ok(())
    }

    /// Delete a range, recording undo and adjusting marks. Returns the
    /// removed bytes for the kill ring. `backward` steers Del coalescing.
    pub fn delete(
        &mut self,
        pos: usize,
        len: usize,
        flag_bits: u8,
        backward: bool,
    ) -> Result<Vec<u8>> {
        self.check_writable()?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let flag_bits = self.mod_flags(flag_bits);
        let data = self.text.copy_range(pos, len);
        self.text.delete(pos, len);
        self.undo.record_del(pos, &data, flag_bits, backward);
        self.marks.adjust(pos, -(len as isize));
        self.modified = true;
        trace!(pos, len, "delete");
        Ok(data)
    }

    /// Replace a range: chained Del + Add recorded as one logical operation.
    /// With `chain_prev` the pair extends the previous operation instead of
    /// starting a new one, so a whole replace-all undoes in one step.
    pub fn replace(
        &mut self,
        pos: usize,
        len: usize,
        bytes: &[u8],
        chain_prev: bool,
    ) -> Result<Vec<u8>> {
        let first_bits = if chain_prev { flags::CHAIN } else { flags::CHUNK };
        let removed = self.delete(pos, len, first_bits, false)?;
        self.text.insert(pos, bytes);
        self.undo.record_add(pos, bytes.len(), flags::CHAIN);
        self.marks.adjust(pos, bytes.len() as isize);
        Ok(removed)
    }

    /// Record a successful save: clean state plus a Save marker
    pub fn note_saved(&mut self) {
        self.modified = false;
        self.undo.record_save();
    }

    /// Drop the modified flag without saving (`unmodify`)
    pub fn unmodify(&mut self) {
        self.modified = false;
    }

    /// Mark modified without an undo record; used by the load filter
    pub fn force_modified(&mut self) {
        self.modified = true;
    }

    /// Apply one undo invocation. `continuing` is true when the previous
    /// command was also undo, keeping the read position.
    pub fn undo_step(&mut self, continuing: bool) -> Result<UndoOutcome> {
        if !self.undo.is_enabled() {
            return Err(QuillError::new(
                ErrorType::Resource,
                errors::UNDO_DISABLED,
                "Undo is disabled in this buffer",
            ));
        }
        if !continuing || !self.undo.mid_read() {
            self.undo.begin_read();
        }
        let run = self.undo.next_run().ok_or_else(|| {
            QuillError::info(ErrorType::Boundary, errors::UNDO_EXHAUSTED, errors::MSG_NO_UNDO)
        })?;

        let was_clean = !self.modified;
        let mut cursor = 0;
        let mut hit_firstmod = false;

        // Inverse records, built as (kind, pos, len, data)
        let mut inverse: Vec<(BlockKind, usize, usize, Vec<u8>)> = Vec::new();

        for op in &run {
            match op.kind {
                BlockKind::Add => {
                    // Undoing an insertion deletes its extent
                    let data = self.text.copy_range(op.pos, op.len);
                    self.text.delete(op.pos, op.len);
                    self.marks.adjust(op.pos, -(op.len as isize));
                    cursor = op.pos;
                    inverse.push((BlockKind::Del, op.pos, op.len, data));
                }
                BlockKind::Del => {
                    // Undoing a deletion re-inserts the saved bytes
                    self.text.insert(op.pos, &op.data);
                    self.marks.adjust(op.pos, op.data.len() as isize);
                    cursor = op.pos + op.data.len();
                    // Adds carry no data; chained re-inserts at one position
                    // merge into a single extent
                    match inverse.last_mut() {
                        Some((BlockKind::Add, prev_pos, prev_len, _))
                            if *prev_pos == op.pos =>
                        {
                            *prev_len += op.data.len();
                        }
                        _ => inverse.push((BlockKind::Add, op.pos, op.data.len(), Vec::new())),
                    }
                }
                BlockKind::Save => {}
            }
            if op.flags & flags::FIRSTMOD != 0 {
                hit_firstmod = true;
            }
        }

        // Record the inverse as one standalone chained group
        for (i, (kind, pos, len, data)) in inverse.iter().enumerate() {
            let mut bits = if i == 0 { flags::CHUNK } else { flags::CHAIN };
            if i == 0 && was_clean {
                bits |= flags::FIRSTMOD;
            }
            match kind {
                BlockKind::Add => self.undo.record_add(*pos, *len, bits),
                BlockKind::Del => self.undo.record_del(*pos, data, bits, false),
                BlockKind::Save => {}
            }
        }

        // The save barrier: reaching the first modification returns the
        // buffer to clean, unless a Save marker was crossed this run
        let now_clean = hit_firstmod && !self.undo.seen_save();
        self.modified = !now_clean;

        Ok(UndoOutcome { cursor, now_clean })
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
