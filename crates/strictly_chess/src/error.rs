//! Error types for the session core.

use derive_more::{Display, Error, From};
use tracing::instrument;

/// Why the rules engine rejected a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InvalidMoveReason {
    /// Notation could not be parsed.
    #[display("unparseable")]
    Unparseable,
    /// No legal move matches the notation.
    #[display("illegal")]
    Illegal,
    /// More than one legal move matches the notation.
    #[display("ambiguous")]
    Ambiguous,
}

/// A move the rules engine refused to apply. The board is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Move {} rejected: {}", notation, reason)]
pub struct InvalidMove {
    /// Notation that was submitted.
    pub notation: String,
    /// Rejection reason.
    pub reason: InvalidMoveReason,
}

impl InvalidMove {
    /// Creates a rejection for `notation`.
    pub fn new(notation: impl Into<String>, reason: InvalidMoveReason) -> Self {
        Self {
            notation: notation.into(),
            reason,
        }
    }
}

/// Log layer failure (initialize, append, sync, poll).
#[derive(Debug, Clone, Display, Error)]
#[display("Log error: {} at {}:{}", message, file, line)]
pub struct LogError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LogError {
    /// Creates a new log error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for LogError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for LogError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Malformed log entry: {}", err))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Fatal session failure. Recoverable input errors never reach this type.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SessionError {
    /// A historical or incoming move did not apply: log and engine diverged.
    #[display("Log entry {} ({}) cannot be applied: {}", sequence, notation, reason)]
    ReplayConsistency {
        /// Sequence number of the offending entry.
        sequence: u64,
        /// Canonical notation that was rejected.
        notation: String,
        /// Engine rejection reason.
        reason: InvalidMoveReason,
    },

    /// Local identity is not one of the known participants.
    #[display("Identity {:?} does not match any participant", identity)]
    IdentityResolution {
        /// The unresolved identity.
        identity: String,
    },

    /// A polled entry that cannot be a remote turn.
    #[display("Log entry {} is not a remote move", sequence)]
    UnexpectedEntry {
        /// Sequence number of the entry.
        sequence: u64,
    },

    /// Log layer failure.
    #[display("{}", _0)]
    #[from]
    Log(LogError),

    /// The local move source failed or closed.
    #[display("Move input failed: {}", message)]
    Input {
        /// Failure description.
        message: String,
    },
}
