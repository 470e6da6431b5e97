//! In-process log shared between participant handles.

use super::{GameLog, LogEntry, Turn};
use crate::error::LogError;
use crate::types::Participant;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, instrument};

#[derive(Debug)]
struct Shared {
    entries: Mutex<Vec<LogEntry>>,
    participants: Vec<Participant>,
    latest: watch::Sender<u64>,
}

/// One participant's handle onto an in-memory log.
///
/// Every handle created with [`MemoryLog::handle_for`] sees the same entries.
/// Appends publish the newest sequence on a single-slot watch channel that
/// pollers wait on.
#[derive(Debug)]
pub struct MemoryLog {
    shared: Arc<Shared>,
    identity: Participant,
    cursor: u64,
    updates: watch::Receiver<u64>,
}

impl MemoryLog {
    /// Creates an empty log and a handle for `identity`.
    #[instrument(skip(participants))]
    pub fn new(identity: Participant, participants: Vec<Participant>) -> Self {
        let (latest, updates) = watch::channel(0);
        let shared = Arc::new(Shared {
            entries: Mutex::new(Vec::new()),
            participants,
            latest,
        });
        Self {
            shared,
            identity,
            cursor: 0,
            updates,
        }
    }

    /// Another handle onto the same log.
    pub fn handle_for(&self, identity: Participant) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            identity,
            cursor: 0,
            updates: self.shared.latest.subscribe(),
        }
    }

    /// Number of committed entries.
    pub fn len(&self) -> Result<usize, LogError> {
        self.shared
            .entries
            .lock()
            .map(|e| e.len())
            .map_err(|_| LogError::new("Memory log lock poisoned"))
    }

    /// Whether nothing has been committed.
    pub fn is_empty(&self) -> Result<bool, LogError> {
        Ok(self.len()? == 0)
    }

    fn entries(&self) -> Result<Vec<LogEntry>, LogError> {
        self.shared
            .entries
            .lock()
            .map(|e| e.clone())
            .map_err(|_| LogError::new("Memory log lock poisoned"))
    }

    fn commit(&self, turn: Turn) -> Result<LogEntry, LogError> {
        let mut entries = self
            .shared
            .entries
            .lock()
            .map_err(|_| LogError::new("Memory log lock poisoned"))?;
        let sequence = entries.last().map_or(1, |e| e.sequence + 1);
        let entry = turn.into_entry(sequence);
        entries.push(entry.clone());
        self.shared.latest.send_replace(sequence);
        Ok(entry)
    }

    fn next_unseen(&self) -> Result<Option<LogEntry>, LogError> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|e| e.sequence > self.cursor))
    }
}

#[async_trait::async_trait]
impl GameLog for MemoryLog {
    #[instrument(skip(self), fields(identity = %self.identity))]
    async fn initialize(&mut self) -> Result<(), LogError> {
        let mut entries = self
            .shared
            .entries
            .lock()
            .map_err(|_| LogError::new("Memory log lock poisoned"))?;
        if entries.is_empty() {
            let entry = Turn::bootstrap(self.identity.clone()).into_entry(1);
            entries.push(entry);
            self.shared.latest.send_replace(1);
            debug!("Bootstrap entry written");
        }
        Ok(())
    }

    async fn head(&mut self) -> Result<Option<LogEntry>, LogError> {
        let head = self.entries()?.pop();
        if let Some(entry) = &head {
            self.cursor = self.cursor.max(entry.sequence);
        }
        Ok(head)
    }

    async fn history(&mut self) -> Result<Vec<LogEntry>, LogError> {
        let entries = self.entries()?;
        if let Some(entry) = entries.last() {
            self.cursor = self.cursor.max(entry.sequence);
        }
        Ok(entries)
    }

    #[instrument(skip(self, turn), fields(identity = %self.identity))]
    async fn append(&mut self, turn: Turn) -> Result<LogEntry, LogError> {
        let entry = self.commit(turn)?;
        self.cursor = entry.sequence;
        debug!(sequence = entry.sequence, "Entry appended");
        Ok(entry)
    }

    async fn sync(&mut self) -> Result<(), LogError> {
        Ok(())
    }

    #[instrument(skip(self), fields(identity = %self.identity, cursor = self.cursor))]
    async fn poll(&mut self) -> Result<LogEntry, LogError> {
        loop {
            if let Some(entry) = self.next_unseen()? {
                self.cursor = entry.sequence;
                debug!(sequence = entry.sequence, "Entry received");
                return Ok(entry);
            }
            self.updates
                .changed()
                .await
                .map_err(|_| LogError::new("Memory log closed"))?;
        }
    }

    fn identity(&self) -> &Participant {
        &self.identity
    }

    fn participants(&self) -> &[Participant] {
        &self.shared.participants
    }
}
