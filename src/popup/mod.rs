//! Pop-up list capability
//!
//! The list widget itself belongs to the host side; the core only needs
//! the three-callback capability each list kind provides: produce the
//! items, act on a chosen one, and clean up on exit. Each list kind (mark,
//! kill, command, buffer) is a value implementing the trait.

use crate::error::Result;

/// What a pop-up list kind provides to the widget
pub trait ListProvider<C> {
    /// Title shown above the list
    fn title(&self) -> &str;

    /// Produce the current items
    fn draw(&self, ctx: &C) -> Vec<String>;

    /// The user chose item `index`
    fn submit(&mut self, ctx: &mut C, index: usize) -> Result<()>;

    /// The list is going away; free per-dialog resources
    fn exit(&mut self, ctx: &mut C);
}

/// An open pop-up list and its widget state
pub struct ActivePopup<C> {
    pub provider: Box<dyn ListProvider<C>>,
    pub items: Vec<String>,
    pub selected: usize,
}

impl<C> ActivePopup<C> {
    pub fn new(provider: Box<dyn ListProvider<C>>, ctx: &C) -> Self {
        let items = provider.draw(ctx);
        ActivePopup {
            provider,
            items,
            selected: 0,
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }
}
