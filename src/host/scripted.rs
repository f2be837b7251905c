//! Scripted host for tests
//!
//! Feeds a prepared event stream to the editor and records every drawing
//! and clipboard operation, so end-to-end tests can drive whole command
//! sequences and assert on what reached the "screen".

use std::collections::VecDeque;

use crate::error::Result;

use super::{ClipSelection, HostEnv, HostEvent, Pen, RequestId};

/// One recorded host operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    Text { row: usize, col: usize, text: String, pen: Pen },
    Fill { row: usize, col: usize, len: usize, pen: Pen },
    Cursor { row: usize, col: usize, visible: bool },
    Present,
    Claim(ClipSelection),
    Publish { which: ClipSelection, data: Vec<u8> },
    Release(ClipSelection),
    SendSelection { req: RequestId, data: Vec<u8> },
    BeginIncr { req: RequestId, total: usize },
    SendChunk { req: RequestId, data: Vec<u8> },
    RequestPaste { utf8: bool },
}

pub struct ScriptedHost {
    pub rows: usize,
    pub cols: usize,
    events: VecDeque<HostEvent>,
    pub ops: Vec<HostOp>,
    /// Timeouts delivered when the script runs dry
    pub idle_ticks: usize,
}

impl ScriptedHost {
    pub fn new(rows: usize, cols: usize) -> Self {
        ScriptedHost {
            rows,
            cols,
            events: VecDeque::new(),
            ops: Vec::new(),
            idle_ticks: 0,
        }
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push_back(event);
    }

    pub fn push_keys(&mut self, presses: impl IntoIterator<Item = crate::key::KeyPress>) {
        for press in presses {
            self.events.push_back(HostEvent::Key(press));
        }
    }

    /// Text drawn since the last clear, concatenated row-major, for loose
    /// content assertions
    pub fn drawn_text(&self) -> String {
        let mut out = String::new();
        for op in &self.ops {
            if let HostOp::Text { text, .. } = op {
                out.push_str(text);
                out.push('\n');
            }
        }
        out
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Last recorded cursor placement
    pub fn cursor(&self) -> Option<(usize, usize)> {
        self.ops.iter().rev().find_map(|op| match op {
            HostOp::Cursor { row, col, .. } => Some((*row, *col)),
            _ => None,
        })
    }
}

impl HostEnv for ScriptedHost {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn deinit(&mut self) {}

    fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn wait_event(&mut self, _timeout_ms: u64) -> Result<Option<HostEvent>> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None => {
                self.idle_ticks += 1;
                Ok(None)
            }
        }
    }

    fn draw_text(&mut self, row: usize, col: usize, text: &str, pen: Pen) {
        self.ops.push(HostOp::Text {
            row,
            col,
            text: text.to_string(),
            pen,
        });
    }

    fn fill(&mut self, row: usize, col: usize, len: usize, pen: Pen) {
        self.ops.push(HostOp::Fill { row, col, len, pen });
    }

    fn set_cursor(&mut self, row: usize, col: usize, visible: bool) {
        self.ops.push(HostOp::Cursor { row, col, visible });
    }

    fn present(&mut self) -> Result<()> {
        self.ops.push(HostOp::Present);
        Ok(())
    }

    fn claim_selection(&mut self, which: ClipSelection) {
        self.ops.push(HostOp::Claim(which));
    }

    fn publish_selection(&mut self, which: ClipSelection, data: &[u8]) {
        self.ops.push(HostOp::Publish {
            which,
            data: data.to_vec(),
        });
    }

    fn release_selection(&mut self, which: ClipSelection) {
        self.ops.push(HostOp::Release(which));
    }

    fn send_selection(&mut self, req: RequestId, data: &[u8]) {
        self.ops.push(HostOp::SendSelection {
            req,
            data: data.to_vec(),
        });
    }

    fn begin_incr(&mut self, req: RequestId, total: usize) {
        self.ops.push(HostOp::BeginIncr { req, total });
    }

    fn send_chunk(&mut self, req: RequestId, data: &[u8]) {
        self.ops.push(HostOp::SendChunk {
            req,
            data: data.to_vec(),
        });
    }

    fn request_paste(&mut self, utf8: bool) {
        self.ops.push(HostOp::RequestPaste { utf8 });
    }
}
