//! Global constants for the Quill editor

pub mod gap {
    /// Initial byte capacity of a freshly created buffer
    pub const INITIAL_CAPACITY: usize = 4096;

    /// Extra free space added when a buffer reallocates
    pub const EXTRA_EXPAND: usize = 512;
}

pub mod rings {
    /// Number of slots in the per-buffer mark ring
    pub const MARK_SLOTS: usize = 16;

    /// Number of entries in the global kill ring
    pub const KILL_SLOTS: usize = 16;
}

pub mod undo {
    /// Minimum data space left in a slab before a new slab is allocated
    pub const MIN_DATA: usize = 35;

    /// Maximum merged length of a coalesced typed-character Add run
    pub const TYPED_RUN_MAX: usize = 35;

    /// Default payload capacity of a slab
    pub const SLAB_SIZE: usize = 4096;

    /// Headroom added when a slab is sized for an oversized request
    pub const SLAB_HEADROOM: usize = 256;

    /// L0: slab count that triggers dropping the oldest slabs
    pub const SLAB_MAX: usize = 64;
    /// L0: slab count to drop down to
    pub const SLAB_L0_TARGET: usize = 56;
    /// L1: slab count to drop down to
    pub const SLAB_L1_TARGET: usize = 16;
    /// L2: total payload bytes allowed after an L2 collection
    pub const L2_MEM_MAX: usize = 64 * 1024;
}

pub mod panes {
    /// Minimum rows a pane may shrink to (content + mode line)
    pub const MIN_ROWS: usize = 3;

    /// Sentinel height used to symmetrize frame growth and shrink
    pub const SCALE_SENTINEL: usize = 1 << 14;
}

pub mod timing {
    /// Cursor blink period in milliseconds
    pub const BLINK_MS: u64 = 500;

    /// Echo-line error flash duration in milliseconds
    pub const FLASH_MS: u64 = 100;

    /// Base double-click interval in milliseconds
    pub const DOUBLE_CLICK_MS: u64 = 500;
    /// Extra interval allowed per additional click in a multi-click run
    pub const CLICK_EXTEND_MS: u64 = 100;

    /// Per-step timeout for the chunked clipboard handshake
    pub const CLIP_STEP_MS: u64 = 2000;
}

pub mod keys {
    /// Modifier prefix bytes in a stored key sequence
    pub const CONTROL: u8 = 0x16;
    pub const META: u8 = 0x17;
    pub const SUPER: u8 = 0x18;
    pub const HYPER: u8 = 0x19;

    /// Prefix byte introducing an extended (function/arrow/editing) key
    pub const EXT: u8 = 0x15;

    // Second byte of an extended key
    pub const EXT_UP: u8 = 0x01;
    pub const EXT_DOWN: u8 = 0x02;
    pub const EXT_LEFT: u8 = 0x03;
    pub const EXT_RIGHT: u8 = 0x04;
    pub const EXT_HOME: u8 = 0x05;
    pub const EXT_END: u8 = 0x06;
    pub const EXT_PAGE_UP: u8 = 0x07;
    pub const EXT_PAGE_DOWN: u8 = 0x08;
    pub const EXT_DELETE: u8 = 0x09;
    /// Function keys F1..F12 occupy EXT_FN_BASE..EXT_FN_BASE+11
    pub const EXT_FN_BASE: u8 = 0x20;
}

pub mod prefix {
    /// Multiplier assumed for a bare Ctrl+U
    pub const CTRL_U_DEFAULT: i32 = 4;

    /// Maximum accumulated digits before the prefix errors out
    pub const MAX_DIGITS: u8 = 5;
}

pub mod query {
    /// Minimum visible columns kept on each side of the mini-query cursor
    pub const SCROLL_CONTEXT: usize = 5;
}

pub mod replace {
    /// Replace-all yields to the event loop every this many replacements
    pub const YIELD_EVERY: usize = 75;
}

pub mod files {
    /// Tab stops used by the load filter
    pub const TAB_STOP: usize = 8;

    /// Clipboard payloads above this size go through chunked transfer
    pub const CLIP_CHUNK: usize = 4096;
}

pub mod ui {
    /// Display name for buffers with no file behind them
    pub const NO_NAME: &str = "*scratch*";

    /// Columns reserved for the scroll bar at the right edge of a pane
    pub const SCROLL_BAR_COLS: usize = 1;
}

pub mod echo {
    /// Delay, in key presses, before an in-progress sequence is echoed
    pub const SEQ_DELAY: u8 = 2;
}

pub mod errors {
    // Error codes
    pub const LOAD_FAILED: &str = "LOAD_FAILED";
    pub const WRITE_FAILED: &str = "WRITE_FAILED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const READ_ONLY: &str = "READ_ONLY";
    pub const UNDEFINED_KEY: &str = "UNDEFINED_KEY";
    pub const PREFIX_OVERFLOW: &str = "PREFIX_OVERFLOW";
    pub const BOUNDARY: &str = "BOUNDARY";
    pub const SEARCH_FAILED: &str = "SEARCH_FAILED";
    pub const UNDO_EXHAUSTED: &str = "UNDO_EXHAUSTED";
    pub const UNDO_DISABLED: &str = "UNDO_DISABLED";
    pub const CLIP_TIMEOUT: &str = "CLIP_TIMEOUT";
    pub const BAD_RESPONSE: &str = "BAD_RESPONSE";
    pub const NO_PANE_ROOM: &str = "NO_PANE_ROOM";

    // Echo messages with fixed wording
    pub const MSG_END_OF_BUFFER: &str = "End of buffer";
    pub const MSG_BEGIN_OF_BUFFER: &str = "Beginning of buffer";
    pub const MSG_UNDO_CLEARED: &str = "Cleared old undo memory";
    pub const MSG_UNDO_LOST: &str = "Out of memory, undo history lost";
    pub const MSG_NO_UNDO: &str = "No further undo information";
}
