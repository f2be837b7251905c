//! Runtime editor settings
//!
//! A plain value threaded through the editor context. Defaults come from
//! `constants`; individual fields are mutable at runtime through the named
//! command surface.

use crate::constants::{files, panes, timing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Tab stop width used by the load filter
    pub tab_stop: usize,
    /// Cursor blink period in milliseconds
    pub blink_ms: u64,
    /// Base double-click interval in milliseconds
    pub double_click_ms: u64,
    /// Minimum pane height in rows
    pub pane_min_rows: usize,
    /// Offer the CR/TAB filter when loading files that need it
    pub offer_filter: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tab_stop: files::TAB_STOP,
            blink_ms: timing::BLINK_MS,
            double_click_ms: timing::DOUBLE_CLICK_MS,
            pane_min_rows: panes::MIN_ROWS,
            offer_filter: true,
        }
    }
}

impl Settings {
    /// Set a named option from its string form; used by `set-option`
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), String> {
        match name {
            "tab-stop" => {
                self.tab_stop = parse_bounded(value, 1, 16)?;
            }
            "blink-ms" => {
                self.blink_ms = parse_bounded(value, 50, 5000)? as u64;
            }
            "double-click-ms" => {
                self.double_click_ms = parse_bounded(value, 100, 2000)? as u64;
            }
            "pane-min-rows" => {
                self.pane_min_rows = parse_bounded(value, 2, 16)?;
            }
            "offer-filter" => {
                self.offer_filter = match value {
                    "on" | "true" | "1" => true,
                    "off" | "false" | "0" => false,
                    other => return Err(format!("Bad boolean: {}", other)),
                };
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        Ok(())
    }

    /// Option names for mini-query completion
    pub fn names() -> &'static [&'static str] {
        &[
            "blink-ms",
            "double-click-ms",
            "offer-filter",
            "pane-min-rows",
            "tab-stop",
        ]
    }
}

fn parse_bounded(value: &str, min: usize, max: usize) -> Result<usize, String> {
    let n: usize = value
        .parse()
        .map_err(|_| format!("Bad number: {}", value))?;
    if n < min || n > max {
        return Err(format!("Value {} out of range {}..{}", n, min, max));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let s = Settings::default();
        assert_eq!(s.tab_stop, 8);
        assert_eq!(s.blink_ms, 500);
        assert_eq!(s.pane_min_rows, 3);
    }

    #[test]
    fn set_known_option() {
        let mut s = Settings::default();
        s.set("tab-stop", "4").unwrap();
        assert_eq!(s.tab_stop, 4);
        s.set("offer-filter", "off").unwrap();
        assert!(!s.offer_filter);
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut s = Settings::default();
        assert!(s.set("tab-stop", "zero").is_err());
        assert!(s.set("tab-stop", "99").is_err());
        assert!(s.set("no-such-option", "1").is_err());
    }
}
