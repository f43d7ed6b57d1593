use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Why a file's content could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadErrorKind {
    NotFound,
    PermissionDenied,
    Other,
}

impl fmt::Display for ReadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReadErrorKind::NotFound => "not found",
            ReadErrorKind::PermissionDenied => "permission denied",
            ReadErrorKind::Other => "i/o error",
        };
        f.write_str(s)
    }
}

/// A per-file read failure. Never fatal to a run.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ReadError {
    pub kind: ReadErrorKind,
    pub message: String,
}

impl From<io::Error> for ReadError {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ReadErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ReadErrorKind::PermissionDenied,
            _ => ReadErrorKind::Other,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Reads a file and normalizes it for concatenation.
///
/// Invalid UTF-8 is replaced rather than reported; only failing to open or
/// read the file is an error.
pub fn read_cleaned(path: &Path) -> Result<String, ReadError> {
    let bytes = fs::read(path)?;
    Ok(clean_text(&String::from_utf8_lossy(&bytes)))
}

/// Strips trailing whitespace from every line and drops trailing blank
/// lines. Leading indentation and interior blank lines are kept.
///
/// A last line holding only whitespace becomes blank and is dropped, so
/// `"x  \n   \n"` cleans to `"x"`. This keeps cleaning idempotent.
pub fn clean_text(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
