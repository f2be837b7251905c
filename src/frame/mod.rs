//! Frame: a top-level window of vertically stacked panes plus an echo line
//!
//! The frame owns pane order and geometry: splitting, killing, boundary
//! resize, and scaling the whole stack when the frame height changes.
//! Fractional pane heights (32.32 fixed point) preserve relative sizes
//! across repeated resizes. The last frame row is always the echo line;
//! every pane except the lowest ends in a mode line.

use std::collections::HashMap;

use crate::constants::{panes as pane_consts, ui};
use crate::echo::EchoLine;
use crate::error::{ErrorType, QuillError, Result};
use crate::pane::{FrameId, Pane, PaneId};

pub struct Frame {
    pub id: FrameId,
    /// Panes top to bottom
    pub panes: Vec<PaneId>,
    /// The focused pane
    pub current: PaneId,
    /// Frame size in character cells
    pub rows: usize,
    pub cols: usize,
    pub echo: EchoLine,
    /// Cell where the last pop-up list appeared
    pub last_popup: (usize, usize),
}

impl Frame {
    pub fn new(id: FrameId, rows: usize, cols: usize) -> Self {
        Frame {
            id,
            panes: Vec::new(),
            current: 0,
            rows,
            cols,
            echo: EchoLine::new(),
            last_popup: (0, 0),
        }
    }

    /// Usable character columns per row: the frame width minus the
    /// cursor-overflow column and the scroll bar. Never zero; the row
    /// walkers need at least one column to make progress.
    #[must_use]
    pub fn row_chars(&self) -> usize {
        self.cols.saturating_sub(1 + ui::SCROLL_BAR_COLS).max(1)
    }

    /// Rows available to panes (everything above the echo line)
    #[must_use]
    pub fn pane_budget(&self) -> usize {
        self.rows.saturating_sub(1)
    }

    /// Recompute pane top rows and mode-line flags after any reshuffle
    pub fn renumber(&self, panes: &mut HashMap<PaneId, Pane>) {
        let mut top = 0;
        let last = *self.panes.last().unwrap_or(&0);
        for &id in &self.panes {
            if let Some(pane) = panes.get_mut(&id) {
                pane.top_row = top;
                pane.mode_line = id != last;
                top += pane.rows;
            }
        }
    }

    /// Split `target` in half; the new pane sits below and inherits the
    /// buffer, cursor, and viewport. Fails when the pane is too short.
    pub fn split(
        &mut self,
        panes: &mut HashMap<PaneId, Pane>,
        target: PaneId,
        new_id: PaneId,
    ) -> Result<PaneId> {
        let (buffer, cursor, viewport, rows, frac) = {
            let pane = panes.get(&target).ok_or_else(internal)?;
            (pane.buffer, pane.cursor, pane.viewport, pane.rows, pane.frac)
        };
        if rows < 2 * pane_consts::MIN_ROWS {
            return Err(QuillError::new(
                ErrorType::Boundary,
                crate::constants::errors::NO_PANE_ROOM,
                "Pane too small to split",
            ));
        }

        let upper_rows = rows / 2;
        let lower_rows = rows - upper_rows;
        {
            let pane = panes.get_mut(&target).unwrap();
            pane.rows = upper_rows;
            pane.frac = frac / 2;
        }
        let mut new_pane = Pane::new(new_id, self.id, buffer, lower_rows);
        new_pane.cursor = cursor;
        new_pane.viewport = viewport;
        new_pane.frac = frac - frac / 2;

        let at = self.index_of(target).ok_or_else(internal)?;
        self.panes.insert(at + 1, new_id);
        panes.insert(new_id, new_pane);
        self.renumber(panes);
        Ok(new_id)
    }

    /// Remove a pane, giving its rows to a neighbor. Returns the removed
    /// pane. Refuses to remove the only pane; killing that kills the frame.
    pub fn kill_pane(
        &mut self,
        panes: &mut HashMap<PaneId, Pane>,
        target: PaneId,
    ) -> Result<Pane> {
        if self.panes.len() <= 1 {
            return Err(QuillError::new(
                ErrorType::Boundary,
                crate::constants::errors::NO_PANE_ROOM,
                "Cannot kill the only pane",
            ));
        }
        let at = self.index_of(target).ok_or_else(internal)?;
        let removed = panes.remove(&target).ok_or_else(internal)?;
        self.panes.remove(at);

        // The pane above absorbs the space; the top pane gives it below
        let heir = if at > 0 {
            self.panes[at - 1]
        } else {
            self.panes[0]
        };
        if let Some(pane) = panes.get_mut(&heir) {
            pane.rows += removed.rows;
            pane.frac += removed.frac;
        }
        if self.current == target {
            self.current = heir;
        }
        self.renumber(panes);
        Ok(removed)
    }

    /// Move the boundary between `upper` and the pane below it by `delta`
    /// rows (positive grows the upper pane). Both sides refuse to shrink
    /// below the minimum; the lowest pane has no boundary of its own.
    pub fn resize_boundary(
        &mut self,
        panes: &mut HashMap<PaneId, Pane>,
        upper: PaneId,
        delta: isize,
        min_rows: usize,
    ) -> Result<()> {
        let at = self.index_of(upper).ok_or_else(internal)?;
        if at + 1 >= self.panes.len() {
            return Err(QuillError::new(
                ErrorType::Boundary,
                crate::constants::errors::NO_PANE_ROOM,
                "No pane below to resize against",
            ));
        }
        let lower = self.panes[at + 1];
        let upper_rows = panes[&upper].rows as isize;
        let lower_rows = panes[&lower].rows as isize;
        let new_upper = upper_rows + delta;
        let new_lower = lower_rows - delta;
        if new_upper < min_rows as isize || new_lower < min_rows as isize {
            return Err(QuillError::new(
                ErrorType::Boundary,
                crate::constants::errors::NO_PANE_ROOM,
                "Pane at minimum size",
            ));
        }
        panes.get_mut(&upper).unwrap().set_rows(new_upper as usize);
        panes.get_mut(&lower).unwrap().set_rows(new_lower as usize);
        self.renumber(panes);
        Ok(())
    }

    /// Rescale every pane to the current frame height. Growth first scales
    /// the stack up to a large sentinel and then compresses down, so growth
    /// and shrink run the same clamping loop.
    pub fn apply_height(&mut self, panes: &mut HashMap<PaneId, Pane>, min_rows: usize) {
        if self.panes.is_empty() {
            return;
        }
        let budget = self.pane_budget();
        let target = (budget as u128) << 32;
        let mut total: u128 = self.panes.iter().map(|id| panes[id].frac as u128).sum();
        if total == 0 {
            let each = budget / self.panes.len();
            for id in &self.panes {
                panes.get_mut(id).unwrap().set_rows(each.max(min_rows));
            }
            self.renumber(panes);
            return;
        }

        if target > total {
            let sentinel = (pane_consts::SCALE_SENTINEL as u128) << 32;
            for id in &self.panes {
                let pane = panes.get_mut(id).unwrap();
                pane.frac = ((pane.frac as u128) * sentinel / total) as u64;
            }
            total = self.panes.iter().map(|id| panes[id].frac as u128).sum();
        }

        // Compress: scale free panes toward the target, clamping any that
        // fall below the minimum and re-scaling the rest
        let min_frac = (min_rows as u128) << 32;
        let mut clamped: Vec<PaneId> = Vec::new();
        for _ in 0..self.panes.len() {
            let free: Vec<PaneId> = self
                .panes
                .iter()
                .copied()
                .filter(|id| !clamped.contains(id))
                .collect();
            if free.is_empty() {
                break;
            }
            let free_total: u128 = free.iter().map(|id| panes[id].frac as u128).sum();
            let free_target = target.saturating_sub(min_frac * clamped.len() as u128);
            let mut newly_clamped = false;
            for id in &free {
                let scaled = (panes[id].frac as u128) * free_target / free_total.max(1);
                if scaled < min_frac {
                    clamped.push(*id);
                    panes.get_mut(id).unwrap().frac = min_frac as u64;
                    newly_clamped = true;
                }
            }
            if newly_clamped {
                continue;
            }
            for id in &free {
                let pane = panes.get_mut(id).unwrap();
                pane.frac = ((pane.frac as u128) * free_target / free_total.max(1)) as u64;
            }
            break;
        }

        // Integer rows from the fractions; hand rounding slack to the last
        for id in &self.panes {
            panes.get_mut(id).unwrap().take_frac_rows();
        }
        let assigned: usize = self.panes.iter().map(|id| panes[id].rows).sum();
        if let Some(last) = self.panes.last() {
            let pane = panes.get_mut(last).unwrap();
            pane.rows = (pane.rows + budget).saturating_sub(assigned).max(min_rows);
        }
        self.renumber(panes);
    }

    /// The pane covering a frame row, for mouse dispatch
    #[must_use]
    pub fn pane_at_row(&self, panes: &HashMap<PaneId, Pane>, row: usize) -> Option<PaneId> {
        for &id in &self.panes {
            let pane = panes.get(&id)?;
            if row >= pane.top_row && row < pane.top_row + pane.rows {
                return Some(id);
            }
        }
        None
    }

    /// Pane after `id` in top-to-bottom order, wrapping
    #[must_use]
    pub fn next_pane(&self, id: PaneId) -> PaneId {
        match self.index_of(id) {
            Some(at) => self.panes[(at + 1) % self.panes.len()],
            None => id,
        }
    }

    fn index_of(&self, id: PaneId) -> Option<usize> {
        self.panes.iter().position(|&p| p == id)
    }
}

fn internal() -> QuillError {
    QuillError::new(
        ErrorType::Internal,
        crate::constants::errors::INTERNAL_ERROR,
        "Pane bookkeeping out of step",
    )
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
