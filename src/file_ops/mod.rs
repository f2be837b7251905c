//! Whole-file read and write, plus the load filter
//!
//! Files are plain byte streams. Loading offers a normalization filter
//! when CR or TAB bytes are present: CRLF and bare CR become LF, TABs
//! become spaces aligned to the next tab stop. The filter is idempotent;
//! filtered buffers are flagged and prompt before overwriting the
//! original on save.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::buffer::gap::char_len;
use crate::constants::errors;
use crate::error::{ErrorType, QuillError, Result};

#[derive(Debug)]
pub struct LoadedFile {
    pub bytes: Vec<u8>,
    /// CR or TAB bytes were seen; the caller may offer the filter
    pub wants_filter: bool,
}

pub fn read_file(path: &Path) -> Result<LoadedFile> {
    let bytes = fs::read(path).map_err(|e| {
        QuillError::new(
            ErrorType::Io,
            errors::LOAD_FAILED,
            format!("{}: {}", path.display(), e),
        )
    })?;
    let wants_filter = bytes.iter().any(|&b| b == b'\r' || b == b'\t');
    info!(path = %path.display(), len = bytes.len(), wants_filter, "read file");
    Ok(LoadedFile { bytes, wants_filter })
}

/// Write the buffer out as two slices split at the gap
pub fn write_file(path: &Path, parts: (&[u8], &[u8])) -> Result<()> {
    let mut file = fs::File::create(path).map_err(|e| {
        QuillError::new(
            ErrorType::Io,
            errors::WRITE_FAILED,
            format!("{}: {}", path.display(), e),
        )
    })?;
    let write = |file: &mut fs::File, bytes: &[u8]| -> Result<()> {
        file.write_all(bytes).map_err(|e| {
            QuillError::new(
                ErrorType::Io,
                errors::WRITE_FAILED,
                format!("{}: {}", path.display(), e),
            )
        })
    };
    write(&mut file, parts.0)?;
    write(&mut file, parts.1)?;
    info!(path = %path.display(), len = parts.0.len() + parts.1.len(), "wrote file");
    Ok(())
}

/// Normalize line endings and tabs. Columns count characters, and a tab
/// advances to the next multiple of `tab_stop`.
#[must_use]
pub fn filter(bytes: &[u8], tab_stop: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut col = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                // CRLF collapses; a bare CR also becomes LF
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                out.push(b'\n');
                col = 0;
            }
            b'\n' => {
                out.push(b'\n');
                col = 0;
            }
            b'\t' => {
                let pad = tab_stop - (col % tab_stop);
                out.extend(std::iter::repeat(b' ').take(pad));
                col += pad;
            }
            byte => {
                let n = char_len(byte).min(bytes.len() - i);
                out.extend_from_slice(&bytes[i..i + n]);
                i += n - 1;
                col += 1;
            }
        }
        i += 1;
    }
    out
}

/// Split a path into (file name, directory)
#[must_use]
pub fn split_path(path: &Path) -> (String, Option<PathBuf>) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let dir = path.parent().map(|p| p.to_path_buf()).filter(|p| !p.as_os_str().is_empty());
    (name, dir)
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
