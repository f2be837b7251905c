//! Host environment abstraction
//!
//! Everything the editor core needs from the windowing world, behind one
//! trait: a blocking event source with a timeout (driving the blink tick),
//! character-cell drawing primitives, and the clipboard capability with
//! its ownership and chunked-transfer messages. The core never talks to a
//! display directly, so it runs unchanged against the scripted test host.

use crate::error::Result;
use crate::key::KeyPress;

pub mod cell;
pub mod scripted;

/// Which host selection a clipboard message concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipSelection {
    Primary,
    Clipboard,
}

/// Identifies one in-flight selection transfer
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Press,
    Release,
    Drag,
    WheelUp,
    WheelDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub row: usize,
    pub col: usize,
}

/// Events delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Key(KeyPress),
    Mouse(MouseEvent),
    Resize { rows: usize, cols: usize },
    FocusIn,
    FocusOut,
    /// Another client wants a selection we own
    SelectionRequest { which: ClipSelection, req: RequestId },
    /// The requester consumed the previous incremental chunk
    ChunkAck { req: RequestId },
    /// Data arriving for our own paste request; `more` while chunks remain
    PasteData { data: Vec<u8>, more: bool },
    /// The owner refused our preferred paste format
    PasteRefused,
    /// Somebody else claimed a selection away from us
    SelectionCleared { which: ClipSelection },
    /// The window was closed from outside
    Quit,
}

/// Drawing pens; the host maps these to its palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pen {
    Text,
    Selection,
    ModeLine,
    Echo,
    EchoError,
    MatchMain,
    MatchAlt,
    ScrollBar,
    ScrollThumb,
}

pub trait HostEnv {
    /// Take over the display; called once before the event loop
    fn init(&mut self) -> Result<()>;

    /// Restore the display; safe to call more than once
    fn deinit(&mut self);

    /// Current size in character cells (rows, cols)
    fn size(&self) -> (usize, usize);

    /// Block for the next event, up to `timeout_ms`. None means the
    /// timeout lapsed (the blink tick).
    fn wait_event(&mut self, timeout_ms: u64) -> Result<Option<HostEvent>>;

    fn draw_text(&mut self, row: usize, col: usize, text: &str, pen: Pen);
    fn fill(&mut self, row: usize, col: usize, len: usize, pen: Pen);
    fn set_cursor(&mut self, row: usize, col: usize, visible: bool);

    /// Flush queued drawing to the display
    fn present(&mut self) -> Result<()>;

    // Clipboard capability
    fn claim_selection(&mut self, which: ClipSelection);
    /// Push-style hosts (terminals) publish the claimed text eagerly;
    /// pull-style hosts ignore this and answer `SelectionRequest`s instead
    fn publish_selection(&mut self, which: ClipSelection, data: &[u8]) {
        let _ = (which, data);
    }
    fn release_selection(&mut self, which: ClipSelection);
    /// Answer a request in one shot
    fn send_selection(&mut self, req: RequestId, data: &[u8]);
    /// Announce an incremental transfer
    fn begin_incr(&mut self, req: RequestId, total: usize);
    /// Send one incremental chunk; empty data terminates the transfer
    fn send_chunk(&mut self, req: RequestId, data: &[u8]);
    /// Ask the current selection owner for data, preferring UTF-8
    fn request_paste(&mut self, utf8: bool);
}
