//! Command dispatch state machine
//!
//! Tracks the in-progress key sequence, runs the numeric-prefix sub-parser,
//! and matches completed sequences against the registry's binding table.
//! Prefix keys (Ctrl+U, Meta+-, Meta+digit, bare digits while a prefix is
//! open) never enter the match sequence; everything else appends its byte
//! encoding and is matched incrementally.

use tracing::trace;

use crate::constants::{echo as echo_consts, keys, prefix as prefix_consts};
use crate::key::{KeyCode, KeyPress};
use crate::registry::{CommandId, MatchResult};

/// Parsed numeric prefix handed to commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix {
    pub active: bool,
    pub value: i32,
    pub neg: bool,
    /// Digits were typed (vs the Ctrl+U / Meta+- defaults)
    pub explicit: bool,
    digits: u8,
}

impl Prefix {
    pub fn none() -> Self {
        Prefix {
            active: false,
            value: 0,
            neg: false,
            explicit: false,
            digits: 0,
        }
    }

    /// The signed repeat count; 1 when no prefix was given
    #[must_use]
    pub fn amount(&self) -> i32 {
        if !self.active {
            return 1;
        }
        if self.neg {
            -self.value
        } else {
            self.value
        }
    }
}

/// Outcome of feeding one key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Partial match; wait for more keys
    Pending,
    /// A binding matched
    Execute(CommandId),
    /// No binding, but the press is a plain printable character
    SelfInsert(char),
    /// No binding can match the sequence
    Undefined(Vec<u8>),
    /// Consumed by the numeric-prefix parser
    PrefixKey,
    /// The prefix overflowed its digit budget
    PrefixError,
}

pub struct DispatchState {
    seq: Vec<u8>,
    prefix: Prefix,
    echo_delay: u8,
    /// Shift state of the last fed press, for shift-selection
    pub shift: bool,
    /// Identifier of the last completed command
    pub last_command: Option<CommandId>,
}

impl DispatchState {
    pub fn new() -> Self {
        DispatchState {
            seq: Vec::new(),
            prefix: Prefix::none(),
            echo_delay: echo_consts::SEQ_DELAY,
            shift: false,
            last_command: None,
        }
    }

    #[must_use]
    pub fn in_progress(&self) -> bool {
        !self.seq.is_empty() || self.prefix.active
    }

    /// The prefix for the command about to run; clears nothing
    #[must_use]
    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn reset(&mut self) {
        self.seq.clear();
        self.prefix = Prefix::none();
        self.echo_delay = echo_consts::SEQ_DELAY;
    }

    /// Feed one key press; `matcher` is the registry's incremental match
    pub fn feed(&mut self, press: KeyPress, matcher: impl Fn(&[u8]) -> MatchResult) -> Feed {
        self.shift = press.shift;

        if let Some(outcome) = self.feed_prefix(press) {
            return outcome;
        }

        let started_empty = self.seq.is_empty();
        press.encode_into(&mut self.seq);
        self.echo_delay = self.echo_delay.saturating_sub(1);

        match matcher(&self.seq) {
            MatchResult::Full(id) => {
                trace!(seq = ?self.seq, id, "matched");
                self.seq.clear();
                Feed::Execute(id)
            }
            MatchResult::Partial => Feed::Pending,
            MatchResult::Undefined => {
                let seq = std::mem::take(&mut self.seq);
                if started_empty && press.is_plain_printable() {
                    if let KeyCode::Char(c) = press.code {
                        return Feed::SelfInsert(c);
                    }
                }
                Feed::Undefined(seq)
            }
        }
    }

    /// The numeric-prefix sub-parser; Some when the press was consumed
    fn feed_prefix(&mut self, press: KeyPress) -> Option<Feed> {
        // Prefix keys only open or extend a prefix at the start of a chord
        if !self.seq.is_empty() {
            return None;
        }
        let plain_char = match press.code {
            KeyCode::Char(c) if !press.sup && !press.hyper => Some(c),
            _ => None,
        };
        let c = plain_char?;

        // Ctrl+U: indefinite multiplier, 4 unless digits follow
        if press.ctrl && !press.meta && c == 'u' {
            if !self.prefix.active {
                self.prefix.active = true;
                self.prefix.value = prefix_consts::CTRL_U_DEFAULT;
            } else if !self.prefix.explicit {
                self.prefix.value =
                    self.prefix.value.saturating_mul(prefix_consts::CTRL_U_DEFAULT);
            }
            return Some(Feed::PrefixKey);
        }

        // Meta+-: negative multiplier, 1 unless digits follow
        if press.meta && !press.ctrl && c == '-' && !self.prefix.explicit {
            if self.prefix.active {
                self.prefix.neg = !self.prefix.neg;
            } else {
                self.prefix.active = true;
                self.prefix.neg = true;
                self.prefix.value = 1;
            }
            return Some(Feed::PrefixKey);
        }

        // Meta+digit opens an accumulating multiplier; bare digits extend it
        let digit = c.to_digit(10);
        let opens = press.meta && !press.ctrl && digit.is_some();
        let extends = self.prefix.active && !press.meta && !press.ctrl && digit.is_some();
        if opens || extends {
            let d = digit.unwrap() as i32;
            if !self.prefix.active {
                self.prefix.active = true;
            }
            if self.prefix.digits >= prefix_consts::MAX_DIGITS {
                self.reset();
                return Some(Feed::PrefixError);
            }
            self.prefix.value = if self.prefix.explicit {
                self.prefix.value * 10 + d
            } else {
                d
            };
            self.prefix.explicit = true;
            self.prefix.digits += 1;
            return Some(Feed::PrefixKey);
        }

        // A bare minus with no digits yet flips the sign
        if self.prefix.active
            && !press.meta
            && !press.ctrl
            && c == '-'
            && self.prefix.digits == 0
        {
            self.prefix.neg = !self.prefix.neg;
            return Some(Feed::PrefixKey);
        }

        None
    }

    /// The in-progress sequence for the echo line, present only after the
    /// short echo delay has run down
    #[must_use]
    pub fn pending_echo(&self) -> Option<String> {
        if !self.in_progress() || self.echo_delay > 0 {
            return None;
        }
        let mut out = String::new();
        if self.prefix.active {
            if self.prefix.explicit || self.prefix.neg {
                out.push_str(&format!("{} ", self.prefix.amount()));
            } else {
                out.push_str("C-u ");
            }
        }
        out.push_str(&format_seq(&self.seq));
        Some(out)
    }
}

impl Default for DispatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable rendering of a stored key sequence
#[must_use]
pub fn format_seq(seq: &[u8]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < seq.len() {
        if !out.is_empty() && !out.ends_with('-') {
            out.push(' ');
        }
        match seq[i] {
            keys::CONTROL => out.push_str("C-"),
            keys::META => out.push_str("M-"),
            keys::SUPER => out.push_str("s-"),
            keys::HYPER => out.push_str("H-"),
            keys::EXT => {
                i += 1;
                out.push_str(ext_name(seq.get(i).copied().unwrap_or(0)));
            }
            0x08 => out.push_str("Backspace"),
            0x09 => out.push_str("Tab"),
            0x0D => out.push_str("Return"),
            0x1B => out.push_str("Esc"),
            byte => {
                // Reassemble one UTF-8 character
                let n = crate::buffer::gap::char_len(byte).min(seq.len() - i);
                match std::str::from_utf8(&seq[i..i + n]) {
                    Ok(s) => out.push_str(s),
                    Err(_) => out.push('?'),
                }
                i += n - 1;
            }
        }
        i += 1;
    }
    out
}

fn ext_name(code: u8) -> &'static str {
    match code {
        keys::EXT_UP => "Up",
        keys::EXT_DOWN => "Down",
        keys::EXT_LEFT => "Left",
        keys::EXT_RIGHT => "Right",
        keys::EXT_HOME => "Home",
        keys::EXT_END => "End",
        keys::EXT_PAGE_UP => "PgUp",
        keys::EXT_PAGE_DOWN => "PgDn",
        keys::EXT_DELETE => "Del",
        _ => "Fn",
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
