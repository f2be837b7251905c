//! Centralized error handling for Quill
//! Defines common error types, severity levels, and error codes

use std::fmt;

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational message (not really an error)
    Info,
    /// Warning - something might be wrong but operation can continue
    Warning,
    /// Standard error - operation failed but editor can continue
    Error,
    /// Critical error - may lead to data loss or require restart
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Category of the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// File system or I/O errors
    Io,
    /// Input boundary conditions (start/end of buffer, undefined keys)
    Boundary,
    /// Rejected dialog or prompt responses
    Dialog,
    /// Resource exhaustion (undo memory, ring overflow)
    Resource,
    /// Policy violations (read-only buffer mutation)
    Policy,
    /// Host protocol failures (clipboard handshake)
    Protocol,
    /// Internal logic or invariant violations
    Internal,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "IO"),
            Self::Boundary => write!(f, "Boundary"),
            Self::Dialog => write!(f, "Dialog"),
            Self::Resource => write!(f, "Resource"),
            Self::Policy => write!(f, "Policy"),
            Self::Protocol => write!(f, "Protocol"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

/// A structured error in Quill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuillError {
    /// How serious the error is
    pub severity: ErrorSeverity,
    /// What kind of error occurred
    pub kind: ErrorType,
    /// Machine-readable error code (e.g., "LOAD_FAILED")
    pub code: String,
    /// Human-readable description, shown in the echo line
    pub message: String,
}

impl QuillError {
    /// Create a new standard error (Severity: Error)
    pub fn new(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Error,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new critical error (Severity: Critical)
    pub fn critical(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Critical,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new informational condition (Severity: Info)
    ///
    /// Boundary hits (start/end of buffer) travel as errors so commands can
    /// abort uniformly, but they are reported as plain messages.
    pub fn info(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Info,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// A boundary condition with the canonical echo wording
    pub fn boundary(message: &str) -> Self {
        Self::info(ErrorType::Boundary, crate::constants::errors::BOUNDARY, message)
    }

    /// True when the error should flash the echo line instead of printing
    pub fn flashes(&self) -> bool {
        matches!(self.kind, ErrorType::Dialog | ErrorType::Policy | ErrorType::Protocol)
    }

    /// Check if the message contains a substring (useful for tests)
    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }
}

impl fmt::Display for QuillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}({}): {}",
            self.severity, self.kind, self.code, self.message
        )
    }
}

impl std::error::Error for QuillError {}

impl From<std::io::Error> for QuillError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorType::Io, "IO_ERROR", err.to_string())
    }
}

/// Result alias for Quill operations
pub type Result<T> = std::result::Result<T, QuillError>;
