//! Crossterm cell host
//!
//! Maps the host contract onto a terminal: the character grid is the
//! bitmapped display, crossterm delivers keys, mouse, resize, and focus,
//! and arboard backs the clipboard capability. Terminal clipboards have no
//! peer-to-peer transfer protocol, so selection requests never arrive
//! here; claiming a selection eagerly publishes its text instead, and a
//! paste request reads the system clipboard and answers with one
//! `PasteData` event.

use std::io::{stdout, BufWriter, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode as CtKeyCode, KeyEvent, KeyModifiers, MouseEventKind},
    execute,
    style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use tracing::warn;

use crate::error::{ErrorType, QuillError, Result};
use crate::key::{KeyCode, KeyPress};

use super::{ClipSelection, HostEnv, HostEvent, MouseEvent, MouseKind, Pen, RequestId};

pub struct CellHost {
    writer: BufWriter<std::io::Stdout>,
    raw_mode: bool,
    alt_screen: bool,
    rows: usize,
    cols: usize,
    clipboard: Option<arboard::Clipboard>,
    /// Paste answer queued for the next wait_event
    queued: Option<HostEvent>,
}

impl CellHost {
    pub fn new() -> Result<Self> {
        let (cols, rows) = terminal::size().map_err(|e| {
            QuillError::critical(ErrorType::Io, "NO_DISPLAY", e.to_string())
        })?;
        let clipboard = match arboard::Clipboard::new() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(error = %e, "system clipboard unavailable");
                None
            }
        };
        Ok(CellHost {
            writer: BufWriter::with_capacity(8192, stdout()),
            raw_mode: false,
            alt_screen: false,
            rows: rows as usize,
            cols: cols as usize,
            clipboard,
            queued: None,
        })
    }

    fn pen_colors(pen: Pen) -> (Color, Color) {
        match pen {
            Pen::Text => (Color::Reset, Color::Reset),
            Pen::Selection => (Color::Black, Color::Cyan),
            Pen::ModeLine => (Color::Black, Color::Grey),
            Pen::Echo => (Color::Reset, Color::Reset),
            Pen::EchoError => (Color::White, Color::DarkRed),
            Pen::MatchMain => (Color::Black, Color::Yellow),
            Pen::MatchAlt => (Color::Black, Color::DarkYellow),
            Pen::ScrollBar => (Color::DarkGrey, Color::Reset),
            Pen::ScrollThumb => (Color::Grey, Color::DarkGrey),
        }
    }
}

impl HostEnv for CellHost {
    fn init(&mut self) -> Result<()> {
        execute!(self.writer, terminal::EnterAlternateScreen)
            .map_err(QuillError::from)?;
        self.alt_screen = true;
        terminal::enable_raw_mode().map_err(QuillError::from)?;
        self.raw_mode = true;
        execute!(
            self.writer,
            event::EnableMouseCapture,
            event::EnableFocusChange,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )
        .map_err(QuillError::from)?;
        self.writer.flush().map_err(QuillError::from)?;
        Ok(())
    }

    fn deinit(&mut self) {
        let _ = execute!(
            self.writer,
            cursor::Show,
            event::DisableMouseCapture,
            event::DisableFocusChange
        );
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
            self.raw_mode = false;
        }
        if self.alt_screen {
            let _ = execute!(self.writer, terminal::LeaveAlternateScreen);
            self.alt_screen = false;
        }
        let _ = self.writer.flush();
    }

    fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn wait_event(&mut self, timeout_ms: u64) -> Result<Option<HostEvent>> {
        if let Some(queued) = self.queued.take() {
            return Ok(Some(queued));
        }
        if !event::poll(Duration::from_millis(timeout_ms)).map_err(QuillError::from)? {
            return Ok(None);
        }
        let event = event::read().map_err(QuillError::from)?;
        Ok(match event {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                translate_key(key).map(HostEvent::Key)
            }
            Event::Mouse(mouse) => translate_mouse(mouse).map(HostEvent::Mouse),
            Event::Resize(cols, rows) => {
                self.rows = rows as usize;
                self.cols = cols as usize;
                Some(HostEvent::Resize {
                    rows: self.rows,
                    cols: self.cols,
                })
            }
            Event::FocusGained => Some(HostEvent::FocusIn),
            Event::FocusLost => Some(HostEvent::FocusOut),
            _ => None,
        })
    }

    fn draw_text(&mut self, row: usize, col: usize, text: &str, pen: Pen) {
        let (fg, bg) = Self::pen_colors(pen);
        let _ = execute!(
            self.writer,
            cursor::MoveTo(col as u16, row as u16),
            SetForegroundColor(fg),
            SetBackgroundColor(bg)
        );
        let _ = self.writer.write_all(text.as_bytes());
        let _ = execute!(self.writer, ResetColor);
    }

    fn fill(&mut self, row: usize, col: usize, len: usize, pen: Pen) {
        let blank = " ".repeat(len);
        self.draw_text(row, col, &blank, pen);
    }

    fn set_cursor(&mut self, row: usize, col: usize, visible: bool) {
        if visible {
            let _ = execute!(
                self.writer,
                cursor::MoveTo(col as u16, row as u16),
                cursor::Show
            );
        } else {
            let _ = execute!(self.writer, cursor::Hide);
        }
    }

    fn present(&mut self) -> Result<()> {
        self.writer.flush().map_err(QuillError::from)?;
        Ok(())
    }

    fn claim_selection(&mut self, _which: ClipSelection) {}

    fn publish_selection(&mut self, _which: ClipSelection, data: &[u8]) {
        // No ownership protocol on a terminal: publish eagerly
        if let Some(clipboard) = self.clipboard.as_mut() {
            let text = String::from_utf8_lossy(data).into_owned();
            if let Err(e) = clipboard.set_text(text) {
                warn!(error = %e, "clipboard export failed");
            }
        }
    }

    fn release_selection(&mut self, _which: ClipSelection) {}

    fn send_selection(&mut self, _req: RequestId, _data: &[u8]) {}

    fn begin_incr(&mut self, _req: RequestId, _total: usize) {}

    fn send_chunk(&mut self, _req: RequestId, _data: &[u8]) {}

    fn request_paste(&mut self, _utf8: bool) {
        let answer = match self.clipboard.as_mut().map(|c| c.get_text()) {
            Some(Ok(text)) => HostEvent::PasteData {
                data: text.into_bytes(),
                more: false,
            },
            _ => HostEvent::PasteRefused,
        };
        self.queued = Some(answer);
    }
}

fn translate_key(key: KeyEvent) -> Option<KeyPress> {
    let code = match key.code {
        CtKeyCode::Char(c) => KeyCode::Char(c),
        CtKeyCode::Enter => KeyCode::Enter,
        CtKeyCode::Tab => KeyCode::Tab,
        CtKeyCode::Backspace => KeyCode::Backspace,
        CtKeyCode::Esc => KeyCode::Escape,
        CtKeyCode::Up => KeyCode::Up,
        CtKeyCode::Down => KeyCode::Down,
        CtKeyCode::Left => KeyCode::Left,
        CtKeyCode::Right => KeyCode::Right,
        CtKeyCode::Home => KeyCode::Home,
        CtKeyCode::End => KeyCode::End,
        CtKeyCode::PageUp => KeyCode::PageUp,
        CtKeyCode::PageDown => KeyCode::PageDown,
        CtKeyCode::Delete => KeyCode::Delete,
        CtKeyCode::F(n) if (1..=12).contains(&n) => KeyCode::Fn(n),
        _ => return None,
    };
    Some(KeyPress {
        code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        meta: key.modifiers.contains(KeyModifiers::ALT),
        sup: key.modifiers.contains(KeyModifiers::SUPER),
        hyper: key.modifiers.contains(KeyModifiers::HYPER),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    })
}

fn translate_mouse(mouse: event::MouseEvent) -> Option<MouseEvent> {
    let kind = match mouse.kind {
        MouseEventKind::Down(_) => MouseKind::Press,
        MouseEventKind::Up(_) => MouseKind::Release,
        MouseEventKind::Drag(_) => MouseKind::Drag,
        MouseEventKind::ScrollUp => MouseKind::WheelUp,
        MouseEventKind::ScrollDown => MouseKind::WheelDown,
        _ => return None,
    };
    Some(MouseEvent {
        kind,
        row: mouse.row as usize,
        col: mouse.column as usize,
    })
}
