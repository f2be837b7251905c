//! Undo operation log
//!
//! A chain of fixed-capacity slabs, each holding a packed sequence of
//! variable-size blocks: Add (extent only), Del (extent plus the deleted
//! bytes), and Save markers. Typed-character Adds and adjacent Dels
//! coalesce; CHUNK blocks never do. A logical operation too large for one
//! slab spills into a CHAIN continuation in the next. Old slabs are dropped
//! wholesale under memory pressure, escalating through four levels.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::constants::undo::{
    L2_MEM_MAX, MIN_DATA, SLAB_HEADROOM, SLAB_L0_TARGET, SLAB_L1_TARGET, SLAB_MAX, SLAB_SIZE,
    TYPED_RUN_MAX,
};

pub mod flags {
    /// Stand-alone block; disables coalescing
    pub const CHUNK: u8 = 1 << 0;
    /// Continuation of the previous block as one logical operation
    pub const CHAIN: u8 = 1 << 1;
    /// First modification after the last clean state
    pub const FIRSTMOD: u8 = 1 << 2;
}

/// Accounting cost of a block header inside its slab
const HEADER_COST: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Add,
    Del,
    Save,
}

#[derive(Debug, Clone)]
struct Block {
    kind: BlockKind,
    flags: u8,
    pos: usize,
    len: usize,
    data_off: usize,
    data_len: usize,
}

struct Slab {
    cap: usize,
    used: usize,
    data: Vec<u8>,
    blocks: Vec<Block>,
}

impl Slab {
    fn new(cap: usize) -> Self {
        Slab {
            cap,
            used: 0,
            data: Vec::with_capacity(cap),
            blocks: Vec::new(),
        }
    }

    fn remaining(&self) -> usize {
        self.cap.saturating_sub(self.used)
    }

    fn push_block(&mut self, kind: BlockKind, flags: u8, pos: usize, len: usize, data: &[u8]) {
        let data_off = self.data.len();
        self.data.extend_from_slice(data);
        self.used += HEADER_COST + data.len();
        self.blocks.push(Block {
            kind,
            flags,
            pos,
            len,
            data_off,
            data_len: data.len(),
        });
    }
}

/// One consumed block of an undo run, data copied out
pub struct RunOp {
    pub kind: BlockKind,
    pub pos: usize,
    pub len: usize,
    pub data: Vec<u8>,
    pub flags: u8,
}

/// Escalation levels for dropping undo memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GcLevel {
    L0,
    L1,
    L2,
    L3,
}

pub struct UndoLog {
    /// Oldest slab at the front
    slabs: VecDeque<Slab>,
    enabled: bool,
    /// (slab, block) of the next block an in-progress undo will consume
    read: Option<(usize, usize)>,
    /// Sticky once a Save marker is seen during the current undo run
    seen_save: bool,
}

impl UndoLog {
    pub fn new() -> Self {
        UndoLog {
            slabs: VecDeque::new(),
            enabled: true,
            read: None,
            seen_save: false,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop all history and refuse further records
    pub fn disable(&mut self) {
        self.slabs.clear();
        self.read = None;
        self.enabled = false;
    }

    /// Drop all history but keep recording
    pub fn reset(&mut self) {
        self.slabs.clear();
        self.read = None;
        self.seen_save = false;
        self.enabled = true;
    }

    #[must_use]
    pub fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Total payload bytes across all slabs
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.slabs.iter().map(|s| s.used).sum()
    }

    #[must_use]
    pub fn seen_save(&self) -> bool {
        self.seen_save
    }

    /// Record an insertion of `len` bytes at `pos`
    pub fn record_add(&mut self, pos: usize, len: usize, flag_bits: u8) {
        if !self.enabled {
            return;
        }
        self.collect_l0();

        // Coalesce a typed run into the previous Add
        if flag_bits & (flags::CHUNK | flags::CHAIN | flags::FIRSTMOD) == 0 {
            if let Some(last) = self.last_block_mut() {
                if last.kind == BlockKind::Add
                    && last.flags & flags::CHUNK == 0
                    && last.pos + last.len == pos
                    && last.len + len <= TYPED_RUN_MAX
                {
                    last.len += len;
                    return;
                }
            }
        }

        self.slab_for(0).push_block(BlockKind::Add, flag_bits, pos, len, &[]);
    }

    /// Record a deletion, keeping the removed bytes. `backward` tells the
    /// coalescer which direction an adjacent earlier Del may extend.
    pub fn record_del(&mut self, pos: usize, data: &[u8], flag_bits: u8, backward: bool) {
        if !self.enabled {
            return;
        }
        self.collect_l0();
        let len = data.len();

        // Coalesce with the previous Del when contiguous
        if flag_bits & (flags::CHUNK | flags::CHAIN | flags::FIRSTMOD) == 0 {
            if let Some(slab) = self.slabs.back_mut() {
                if let Some(last) = slab.blocks.last() {
                    let tail_is_last_data =
                        last.data_off + last.data_len == slab.data.len();
                    if last.kind == BlockKind::Del
                        && last.flags & flags::CHUNK == 0
                        && tail_is_last_data
                        && slab.remaining() >= len
                    {
                        if !backward && pos == last.pos {
                            // Forward deletes eat rightward: append data
                            slab.data.extend_from_slice(data);
                            slab.used += len;
                            let last = slab.blocks.last_mut().unwrap();
                            last.len += len;
                            last.data_len += len;
                            return;
                        }
                        if backward && pos + len == last.pos {
                            // Backward deletes eat leftward: reserve space at
                            // the front of the block's data
                            let off = last.data_off;
                            let mut spliced = Vec::with_capacity(last.data_len + len);
                            spliced.extend_from_slice(data);
                            spliced.extend_from_slice(&slab.data[off..]);
                            slab.data.truncate(off);
                            slab.data.extend_from_slice(&spliced);
                            slab.used += len;
                            let last = slab.blocks.last_mut().unwrap();
                            last.pos = pos;
                            last.len += len;
                            last.data_len += len;
                            return;
                        }
                    }
                }
            }
        }

        // Fill the current slab, chaining the remainder into a fresh one
        let first_fit = {
            let slab = self.slab_for(len);
            slab.remaining().saturating_sub(HEADER_COST).min(len)
        };
        if first_fit >= len {
            self.slabs
                .back_mut()
                .unwrap()
                .push_block(BlockKind::Del, flag_bits, pos, len, data);
            return;
        }

        debug!(len, first_fit, "splitting oversized delete across slabs");
        self.slabs.back_mut().unwrap().push_block(
            BlockKind::Del,
            flag_bits,
            pos,
            first_fit,
            &data[..first_fit],
        );
        let rest = &data[first_fit..];
        let mut slab = Slab::new(SLAB_SIZE.max(rest.len() + SLAB_HEADROOM));
        slab.push_block(BlockKind::Del, flag_bits | flags::CHAIN, pos, rest.len(), rest);
        self.slabs.push_back(slab);
    }

    /// Record a successful save
    pub fn record_save(&mut self) {
        if !self.enabled {
            return;
        }
        self.collect_l0();
        self.slab_for(0).push_block(BlockKind::Save, 0, 0, 0, &[]);
    }

    /// Pick the slab the next block lands in, allocating as needed
    fn slab_for(&mut self, wanted_data: usize) -> &mut Slab {
        let need_new = match self.slabs.back() {
            None => true,
            Some(slab) => {
                let remaining = slab.remaining();
                remaining < MIN_DATA + HEADER_COST && remaining < wanted_data + HEADER_COST
            }
        };
        if need_new {
            self.slabs
                .push_back(Slab::new(SLAB_SIZE.max(wanted_data + SLAB_HEADROOM)));
        }
        self.slabs.back_mut().unwrap()
    }

    fn last_block_mut(&mut self) -> Option<&mut Block> {
        self.slabs.back_mut().and_then(|s| s.blocks.last_mut())
    }

    /// Point the read head at the newest block; call when an undo run starts
    pub fn begin_read(&mut self) {
        self.seen_save = false;
        self.read = self.newest_block();
    }

    /// Forget the undo position; call on any non-undo command
    pub fn end_read(&mut self) {
        self.read = None;
        self.seen_save = false;
    }

    fn newest_block(&self) -> Option<(usize, usize)> {
        for si in (0..self.slabs.len()).rev() {
            if !self.slabs[si].blocks.is_empty() {
                return Some((si, self.slabs[si].blocks.len() - 1));
            }
        }
        None
    }

    fn prev_block(&self, at: (usize, usize)) -> Option<(usize, usize)> {
        let (mut si, bi) = at;
        if bi > 0 {
            return Some((si, bi - 1));
        }
        while si > 0 {
            si -= 1;
            if !self.slabs[si].blocks.is_empty() {
                return Some((si, self.slabs[si].blocks.len() - 1));
            }
        }
        None
    }

    /// Consume the next logical operation, newest block first. Save markers
    /// encountered on the way set the sticky seen-save flag and are skipped.
    /// Returns None at end of history.
    pub fn next_run(&mut self) -> Option<Vec<RunOp>> {
        let mut at = self.read?;

        // Skip Save markers, remembering we saw one
        loop {
            let block = &self.slabs[at.0].blocks[at.1];
            if block.kind != BlockKind::Save {
                break;
            }
            trace!("save marker during undo run");
            self.seen_save = true;
            match self.prev_block(at) {
                Some(prev) => at = prev,
                None => {
                    self.read = None;
                    return None;
                }
            }
        }

        let mut ops = Vec::new();
        loop {
            let block = &self.slabs[at.0].blocks[at.1];
            let slab = &self.slabs[at.0];
            ops.push(RunOp {
                kind: block.kind,
                pos: block.pos,
                len: block.len,
                data: slab.data[block.data_off..block.data_off + block.data_len].to_vec(),
                flags: block.flags,
            });
            let chained = block.flags & flags::CHAIN != 0;
            let prev = self.prev_block(at);
            if chained {
                match prev {
                    Some(p) => at = p,
                    None => {
                        // A chain cut off by slab GC: stop at what remains
                        self.read = None;
                        return Some(ops);
                    }
                }
            } else {
                self.read = prev;
                return Some(ops);
            }
        }
    }

    /// L0 housekeeping, applied on every record
    fn collect_l0(&mut self) {
        if self.slabs.len() > SLAB_MAX {
            self.drop_oldest_to(SLAB_L0_TARGET);
        }
    }

    /// Run a collection pass; returns a user-visible message when one is due
    pub fn gc(&mut self, level: GcLevel) -> Option<&'static str> {
        use crate::constants::errors;
        match level {
            GcLevel::L0 => {
                self.collect_l0();
                None
            }
            GcLevel::L1 => {
                self.drop_oldest_to(SLAB_L1_TARGET);
                Some(errors::MSG_UNDO_CLEARED)
            }
            GcLevel::L2 => {
                while self.total_bytes() > L2_MEM_MAX && self.slabs.len() > 1 {
                    self.drop_oldest_to(self.slabs.len() - 1);
                }
                if self.slabs.is_empty() {
                    self.slabs.push_back(Slab::new(SLAB_SIZE));
                }
                Some(errors::MSG_UNDO_CLEARED)
            }
            GcLevel::L3 => {
                self.slabs.clear();
                self.read = None;
                self.enabled = false;
                Some(errors::MSG_UNDO_LOST)
            }
        }
    }

    fn drop_oldest_to(&mut self, target: usize) {
        while self.slabs.len() > target {
            self.slabs.pop_front();
            match self.read {
                Some((0, _)) => {
                    // The read head lived in the dropped slab
                    self.read = None;
                }
                Some((si, bi)) => self.read = Some((si - 1, bi)),
                None => {}
            }
        }
        debug!(slabs = self.slabs.len(), "dropped old undo slabs");
    }

    /// True while an undo run is in progress and more blocks remain
    #[must_use]
    pub fn mid_read(&self) -> bool {
        self.read.is_some()
    }
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
