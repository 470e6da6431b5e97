//! The replicated, append-only game log.
//!
//! The log is the only channel between the two participants. Entries are
//! never rewritten; each handle keeps a cursor so [`GameLog::poll`] can hand
//! out the next entry it has not yet seen.

mod file;
mod memory;

pub use file::FileLog;
pub use memory::MemoryLog;

use crate::error::LogError;
use crate::types::{Participant, PieceKind, RawMove};
use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A committed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the log, strictly increasing from 1.
    pub sequence: u64,
    /// Author.
    pub participant: Participant,
    /// Move in the author's orientation. `None` only for the bootstrap entry.
    #[serde(rename = "move")]
    pub raw_move: Option<RawMove>,
    /// Piece kind the author captured with this move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<PieceKind>,
    /// When the entry was appended.
    pub recorded_at: DateTime<Utc>,
}

/// Payload for [`GameLog::append`]. The log assigns sequence and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Turn {
    /// Author.
    pub participant: Participant,
    /// Move in the author's orientation.
    pub raw_move: Option<RawMove>,
    /// Captured piece kind.
    pub capture: Option<PieceKind>,
}

impl Turn {
    /// The game-creation entry, which carries no move.
    pub fn bootstrap(participant: Participant) -> Self {
        Self::new(participant, None, None)
    }

    fn into_entry(self, sequence: u64) -> LogEntry {
        LogEntry {
            sequence,
            participant: self.participant,
            raw_move: self.raw_move,
            capture: self.capture,
            recorded_at: Utc::now(),
        }
    }
}

/// Log replication collaborator.
///
/// `head` and `history` move the handle's cursor to the newest entry they
/// return, and `append` moves it past the appended entry, so `poll` only ever
/// yields entries written by someone else after the handle last looked.
#[async_trait::async_trait]
pub trait GameLog: Send {
    /// Prepares the log, writing the bootstrap entry if the log is empty.
    async fn initialize(&mut self) -> Result<(), LogError>;

    /// Newest entry, if any.
    async fn head(&mut self) -> Result<Option<LogEntry>, LogError>;

    /// All entries, oldest first.
    async fn history(&mut self) -> Result<Vec<LogEntry>, LogError>;

    /// Appends a turn and returns the committed entry.
    async fn append(&mut self, turn: Turn) -> Result<LogEntry, LogError>;

    /// Exchanges pending entries with the remote side.
    async fn sync(&mut self) -> Result<(), LogError>;

    /// Waits for the next entry after the cursor. No timeout; cancel by
    /// dropping the future.
    async fn poll(&mut self) -> Result<LogEntry, LogError>;

    /// Local participant.
    fn identity(&self) -> &Participant;

    /// All participants, in tie-break order.
    fn participants(&self) -> &[Participant];
}

/// Checks that sequences strictly increase.
pub(crate) fn check_order(entries: &[LogEntry]) -> Result<(), LogError> {
    for pair in entries.windows(2) {
        if pair[1].sequence <= pair[0].sequence {
            return Err(LogError::new(format!(
                "Log out of order: entry {} follows {}",
                pair[1].sequence, pair[0].sequence
            )));
        }
    }
    Ok(())
}
