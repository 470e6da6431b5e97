//! Log stored as JSON lines in a shared file.
//!
//! Both participants point at the same file (a synced folder, a network
//! share, a checked-out repository). Appends are serialized by whatever
//! replicates the file; this handle only polls it for growth.

use super::{GameLog, LogEntry, Turn, check_order};
use crate::error::LogError;
use crate::types::Participant;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, trace};

/// One participant's handle onto a JSON-lines log file.
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
    identity: Participant,
    participants: Vec<Participant>,
    poll_interval: Duration,
    cursor: u64,
}

impl FileLog {
    /// Creates a handle. The file is created on [`GameLog::initialize`].
    #[instrument(skip(path, participants), fields(path = %path.as_ref().display()))]
    pub fn new(
        path: impl AsRef<Path>,
        identity: Participant,
        participants: Vec<Participant>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            identity,
            participants,
            poll_interval,
            cursor: 0,
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Vec<LogEntry>, LogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let (complete, tail) = match content.rfind('\n') {
            Some(end) => (&content[..end], &content[end + 1..]),
            None => ("", content.as_str()),
        };
        let mut entries = complete
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<LogEntry>)
            .collect::<Result<Vec<_>, _>>()?;
        // A last line without its newline counts once it parses. Until then it
        // is still being written.
        match serde_json::from_str::<LogEntry>(tail.trim()) {
            Ok(entry) => entries.push(entry),
            Err(_) if !tail.trim().is_empty() => trace!("Ignoring incomplete last line"),
            Err(_) => {}
        }
        check_order(&entries)?;
        Ok(entries)
    }

    async fn write_entry(&self, entry: &LogEntry) -> Result<(), LogError> {
        let unterminated = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes.last().is_some_and(|b| *b != b'\n'),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        let mut line = if unterminated {
            String::from("\n")
        } else {
            String::new()
        };
        line.push_str(&serde_json::to_string(entry)?);
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameLog for FileLog {
    #[instrument(skip(self), fields(path = %self.path.display(), identity = %self.identity))]
    async fn initialize(&mut self) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        if self.read_entries().await?.is_empty() {
            let entry = Turn::bootstrap(self.identity.clone()).into_entry(1);
            self.write_entry(&entry).await?;
            info!("Created game log");
        }
        Ok(())
    }

    async fn head(&mut self) -> Result<Option<LogEntry>, LogError> {
        let head = self.read_entries().await?.pop();
        if let Some(entry) = &head {
            self.cursor = self.cursor.max(entry.sequence);
        }
        Ok(head)
    }

    async fn history(&mut self) -> Result<Vec<LogEntry>, LogError> {
        let entries = self.read_entries().await?;
        if let Some(entry) = entries.last() {
            self.cursor = self.cursor.max(entry.sequence);
        }
        Ok(entries)
    }

    #[instrument(skip(self, turn), fields(path = %self.path.display()))]
    async fn append(&mut self, turn: Turn) -> Result<LogEntry, LogError> {
        let sequence = self
            .read_entries()
            .await?
            .last()
            .map_or(1, |e| e.sequence + 1);
        let entry = turn.into_entry(sequence);
        self.write_entry(&entry).await?;
        self.cursor = entry.sequence;
        debug!(sequence, "Entry appended");
        Ok(entry)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn sync(&mut self) -> Result<(), LogError> {
        let file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await?;
        file.sync_all().await?;
        // Surface corruption now rather than on the next poll.
        self.read_entries().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display(), cursor = self.cursor))]
    async fn poll(&mut self) -> Result<LogEntry, LogError> {
        loop {
            let next = self
                .read_entries()
                .await?
                .into_iter()
                .find(|e| e.sequence > self.cursor);
            if let Some(entry) = next {
                self.cursor = entry.sequence;
                debug!(sequence = entry.sequence, "Entry received");
                return Ok(entry);
            }
            trace!("No new entries");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn identity(&self) -> &Participant {
        &self.identity
    }

    fn participants(&self) -> &[Participant] {
        &self.participants
    }
}
