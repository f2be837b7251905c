//! Clipboard bridge
//!
//! Tracks ownership of the host's primary and clipboard selections and
//! speaks the transfer protocol: small payloads answer a request in one
//! shot, large ones go through the chunked INCR handshake with a bounded
//! wait per step. Host events that arrive mid-handshake are handed back to
//! the caller for normal processing. Owned primary ranges are invalidated
//! when their underlying text changes.

use tracing::{debug, warn};

use crate::buffer::BufferId;
use crate::constants::{errors, files, timing};
use crate::error::{ErrorType, QuillError, Result};
use crate::host::{ClipSelection, HostEnv, HostEvent, RequestId};

/// What the owned primary selection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimarySource {
    /// A live range in a buffer
    Range {
        buffer: BufferId,
        pos: usize,
        len: usize,
    },
    /// The top of the kill ring
    KillTop,
}

pub struct ClipboardBridge {
    pub primary: Option<PrimarySource>,
    /// The clipboard selection always references the kill-ring top
    pub clipboard_owned: bool,
}

impl ClipboardBridge {
    pub fn new() -> Self {
        ClipboardBridge {
            primary: None,
            clipboard_owned: false,
        }
    }

    pub fn claim_primary<H: HostEnv>(&mut self, host: &mut H, source: PrimarySource) {
        self.primary = Some(source);
        host.claim_selection(ClipSelection::Primary);
    }

    pub fn claim_clipboard<H: HostEnv>(&mut self, host: &mut H) {
        self.clipboard_owned = true;
        host.claim_selection(ClipSelection::Clipboard);
    }

    pub fn release_primary<H: HostEnv>(&mut self, host: &mut H) {
        if self.primary.take().is_some() {
            host.release_selection(ClipSelection::Primary);
        }
    }

    /// The host told us someone else took a selection
    pub fn lost(&mut self, which: ClipSelection) {
        match which {
            ClipSelection::Primary => self.primary = None,
            ClipSelection::Clipboard => self.clipboard_owned = false,
        }
    }

    /// An insertion landed in `buffer`; overlapping the owned range
    /// invalidates it, text before it slides it
    pub fn note_insert<H: HostEnv>(&mut self, host: &mut H, buffer: BufferId, at: usize, n: usize) {
        if let Some(PrimarySource::Range { buffer: b, pos, len }) = self.primary {
            if b != buffer {
                return;
            }
            if at > pos && at < pos + len {
                self.release_primary(host);
            } else if at <= pos {
                self.primary = Some(PrimarySource::Range {
                    buffer: b,
                    pos: pos + n,
                    len,
                });
            }
        }
    }

    /// A deletion touched `buffer`; any overlap invalidates the range
    pub fn note_delete<H: HostEnv>(&mut self, host: &mut H, buffer: BufferId, at: usize, n: usize) {
        if let Some(PrimarySource::Range { buffer: b, pos, len }) = self.primary {
            if b != buffer {
                return;
            }
            if at < pos + len && at + n > pos {
                self.release_primary(host);
            } else if at + n <= pos {
                self.primary = Some(PrimarySource::Range {
                    buffer: b,
                    pos: pos - n,
                    len,
                });
            }
        }
    }

    /// The buffer holding the owned primary range is going away
    pub fn note_buffer_killed<H: HostEnv>(&mut self, host: &mut H, buffer: BufferId) {
        if let Some(PrimarySource::Range { buffer: b, .. }) = self.primary {
            if b == buffer {
                self.release_primary(host);
            }
        }
    }

    /// Answer a selection request with `data`. Large payloads run the
    /// chunked handshake; events that are not ours are collected for the
    /// caller to replay. Times out per step.
    pub fn export<H: HostEnv>(
        &mut self,
        host: &mut H,
        req: RequestId,
        data: &[u8],
    ) -> Result<Vec<HostEvent>> {
        let mut deferred = Vec::new();
        if data.len() <= files::CLIP_CHUNK {
            host.send_selection(req, data);
            return Ok(deferred);
        }

        debug!(req, total = data.len(), "incremental clipboard export");
        host.begin_incr(req, data.len());
        let mut sent = 0;
        loop {
            match host.wait_event(timing::CLIP_STEP_MS)? {
                Some(HostEvent::ChunkAck { req: ack }) if ack == req => {
                    if sent >= data.len() {
                        // Terminating zero-length chunk already implied by
                        // the final ack
                        host.send_chunk(req, &[]);
                        return Ok(deferred);
                    }
                    let end = (sent + files::CLIP_CHUNK).min(data.len());
                    host.send_chunk(req, &data[sent..end]);
                    sent = end;
                }
                Some(other) => deferred.push(other),
                None => {
                    warn!(req, sent, "clipboard export timed out");
                    return Err(QuillError::new(
                        ErrorType::Protocol,
                        errors::CLIP_TIMEOUT,
                        "Clipboard transfer timed out",
                    ));
                }
            }
        }
    }

    /// Ask the selection owner for text, preferring UTF-8 and falling back
    /// to plain text. Collects chunked INCR answers until the empty chunk.
    /// Returns the bytes plus any deferred events.
    pub fn import<H: HostEnv>(&mut self, host: &mut H) -> Result<(Vec<u8>, Vec<HostEvent>)> {
        host.request_paste(true);
        let mut out = Vec::new();
        let mut deferred = Vec::new();
        let mut fell_back = false;
        loop {
            match host.wait_event(timing::CLIP_STEP_MS)? {
                Some(HostEvent::PasteData { data, more }) => {
                    out.extend_from_slice(&data);
                    if !more {
                        return Ok((out, deferred));
                    }
                }
                Some(HostEvent::PasteRefused) => {
                    if fell_back {
                        return Ok((out, deferred));
                    }
                    fell_back = true;
                    host.request_paste(false);
                }
                Some(other) => deferred.push(other),
                None => {
                    warn!("clipboard import timed out");
                    return Err(QuillError::new(
                        ErrorType::Protocol,
                        errors::CLIP_TIMEOUT,
                        "Clipboard transfer timed out",
                    ));
                }
            }
        }
    }
}

impl Default for ClipboardBridge {
    fn default() -> Self {
        Self::new()
    }
}
