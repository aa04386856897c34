use std::fmt;

use chrono::{DateTime, Utc};

/// Message reported while nothing has gone wrong yet.
pub const NO_ERROR: &str = "No Error";

/// Category of a logged failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// File open/read/write failure.
    Io,
    /// Wrong magic, unsupported version, or malformed chain.
    Format,
    /// Envelope decryption or integrity failure.
    Crypto,
    /// Transport failure, non-success HTTP status, timeout, or cancellation.
    Network,
    /// The service answered with its error flag set.
    Remote,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Io => "io",
            Self::Format => "format",
            Self::Crypto => "crypto",
            Self::Network => "network",
            Self::Remote => "remote",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggedError {
    pub at: DateTime<Utc>,
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for LoggedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.message
        )
    }
}

/// Append-only error log.
///
/// Entries are never overwritten or removed, so repeated failures stay
/// visible side by side.
#[derive(Clone, Debug, Default)]
pub struct ErrorLog {
    entries: Vec<LoggedError>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ErrorKind, message: impl Into<String>) -> &LoggedError {
        self.entries.push(LoggedError {
            at: Utc::now(),
            kind,
            message: message.into(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LoggedError> {
        self.entries.last()
    }

    /// Latest message, or `"No Error"` while the log is empty.
    pub fn last_message(&self) -> &str {
        self.last().map_or(NO_ERROR, |e| e.message.as_str())
    }

    /// Entries logged after the first `mark` entries.
    pub fn since(&self, mark: usize) -> &[LoggedError] {
        self.entries.get(mark..).unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoggedError> {
        self.entries.iter()
    }
}
