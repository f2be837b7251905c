//! Echo line: the last row of a frame
//!
//! Carries messages, errors, and prompts. A flash is a short-lived error
//! state the event loop clears after its timer expires.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoMode {
    Message,
    Error,
    Prompt,
}

#[derive(Debug, Clone)]
pub struct EchoLine {
    pub text: String,
    pub mode: EchoMode,
    /// Set while a rejection flash is on screen
    pub flashing: bool,
}

impl EchoLine {
    pub fn new() -> Self {
        EchoLine {
            text: String::new(),
            mode: EchoMode::Message,
            flashing: false,
        }
    }

    pub fn message(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.mode = EchoMode::Message;
        self.flashing = false;
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.mode = EchoMode::Error;
        self.flashing = false;
    }

    pub fn prompt(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.mode = EchoMode::Prompt;
        self.flashing = false;
    }

    /// Begin a rejection flash; the caller arms the flash timer
    pub fn flash(&mut self) {
        self.flashing = true;
        self.mode = EchoMode::Error;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.mode = EchoMode::Message;
        self.flashing = false;
    }
}

impl Default for EchoLine {
    fn default() -> Self {
        Self::new()
    }
}
