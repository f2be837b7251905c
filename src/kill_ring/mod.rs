//! Global kill ring
//!
//! Sixteen entries over two byte stores: Top, the current kill, which grows
//! by coalesced appends and prepends; and Rest, older kills packed together
//! newest-first. Advancing the top pushes the old Top onto the front of
//! Rest and slides every other entry's offset. A separate yank cursor walks
//! the ring during yank-pop and snaps back to the top on each new kill.

use crate::constants::rings::KILL_SLOTS;

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    offset: usize,
    len: usize,
}

/// Which end of the top entry a coalescing kill grows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillEnd {
    /// Forward-deleting commands append
    Append,
    /// Backward-deleting commands prepend
    Prepend,
}

pub struct KillRing {
    /// Current kill, mutable at both ends
    top: Vec<u8>,
    /// Older kills, packed newest-first
    rest: Vec<u8>,
    entries: [Entry; KILL_SLOTS],
    /// Index of the top entry
    top_idx: usize,
    /// Number of live entries
    count: usize,
    /// Entry the next yank reads; walks backward on yank-pop
    yank_idx: usize,
}

impl KillRing {
    pub fn new() -> Self {
        KillRing {
            top: Vec::new(),
            rest: Vec::new(),
            entries: [Entry::default(); KILL_SLOTS],
            top_idx: 0,
            count: 0,
            yank_idx: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Start a fresh kill entry holding `bytes`
    pub fn kill(&mut self, bytes: &[u8]) {
        if self.count == 0 {
            self.count = 1;
        } else {
            self.advance_top();
        }
        self.top.clear();
        self.top.extend_from_slice(bytes);
        self.entries[self.top_idx] = Entry {
            offset: 0,
            len: self.top.len(),
        };
        self.yank_idx = self.top_idx;
    }

    /// Grow the top entry at the given end; used by sequential kills
    pub fn extend(&mut self, bytes: &[u8], end: KillEnd) {
        if self.count == 0 {
            self.kill(bytes);
            return;
        }
        match end {
            KillEnd::Append => self.top.extend_from_slice(bytes),
            KillEnd::Prepend => {
                // Reserve space at the front
                let mut grown = Vec::with_capacity(self.top.len() + bytes.len());
                grown.extend_from_slice(bytes);
                grown.extend_from_slice(&self.top);
                self.top = grown;
            }
        }
        self.entries[self.top_idx].len = self.top.len();
        self.yank_idx = self.top_idx;
    }

    /// Push the Top contents onto the start of Rest and claim the next slot
    fn advance_top(&mut self) {
        let moved = self.top.len();
        if moved > 0 {
            let mut slid = Vec::with_capacity(moved + self.rest.len());
            slid.extend_from_slice(&self.top);
            slid.extend_from_slice(&self.rest);
            self.rest = slid;
        }
        for i in 0..self.count {
            let idx = (self.top_idx + KILL_SLOTS - i) % KILL_SLOTS;
            if idx != self.top_idx {
                self.entries[idx].offset += moved;
            }
        }
        // The retiring top now lives at the front of Rest
        self.entries[self.top_idx] = Entry {
            offset: 0,
            len: moved,
        };

        self.top_idx = (self.top_idx + 1) % KILL_SLOTS;
        if self.count < KILL_SLOTS {
            self.count += 1;
        } else {
            // The slot being reclaimed held the oldest kill; its bytes are
            // the tail of Rest
            let oldest = self.entries[self.top_idx];
            self.rest.truncate(oldest.offset);
        }
    }

    /// Bytes of the entry the yank cursor points at
    #[must_use]
    pub fn yank(&self) -> Option<&[u8]> {
        self.entry_bytes(self.yank_idx)
    }

    /// Move the yank cursor one entry back and return its bytes
    pub fn yank_pop(&mut self) -> Option<&[u8]> {
        if self.count == 0 {
            return None;
        }
        let steps_back =
            (self.top_idx + KILL_SLOTS - self.yank_idx) % KILL_SLOTS;
        if steps_back + 1 >= self.count {
            // Wrapped all the way round; restart at the top
            self.yank_idx = self.top_idx;
        } else {
            self.yank_idx = (self.yank_idx + KILL_SLOTS - 1) % KILL_SLOTS;
        }
        self.entry_bytes(self.yank_idx)
    }

    /// Reset the yank cursor to the top without touching contents
    pub fn rewind_yank(&mut self) {
        self.yank_idx = self.top_idx;
    }

    #[must_use]
    pub fn top_bytes(&self) -> &[u8] {
        &self.top
    }

    fn entry_bytes(&self, idx: usize) -> Option<&[u8]> {
        if self.count == 0 {
            return None;
        }
        if idx == self.top_idx {
            return Some(&self.top);
        }
        let e = self.entries[idx];
        Some(&self.rest[e.offset..e.offset + e.len])
    }

    /// Entries newest-first, for the kill pop-up list
    pub fn iter_recent(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.count).filter_map(move |i| {
            let idx = (self.top_idx + KILL_SLOTS - i) % KILL_SLOTS;
            self.entry_bytes(idx)
        })
    }
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new()
    }
}
