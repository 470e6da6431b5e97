//! Session configuration loaded from TOML.

use crate::engine::PromotionPolicy;
use crate::error::ConfigError;
use crate::notation::{Disambiguation, Translator};
use crate::types::Participant;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable naming the local participant.
pub const PLAYER_ENV: &str = "STRICTLY_CHESS_PLAYER";

/// Configuration for one participant's session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ChessConfig {
    /// Both participants, in tie-break order.
    participants: Vec<Participant>,

    /// Local participant. Usually given on the command line instead.
    #[serde(default)]
    identity: Option<Participant>,

    /// Path of the shared log file.
    #[serde(default = "default_log_path")]
    log_path: PathBuf,

    /// How often the file log is checked for new entries.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// Piece to promote pawns to.
    #[serde(default)]
    promotion: PromotionPolicy,

    /// How ambiguous piece moves are qualified.
    #[serde(default)]
    disambiguation: Disambiguation,
}

#[instrument]
fn default_log_path() -> PathBuf {
    PathBuf::from("strictly_chess.jsonl")
}

#[instrument]
fn default_poll_interval_ms() -> u64 {
    500
}

impl ChessConfig {
    /// Creates a configuration with defaults for everything but the participants.
    #[instrument(skip(participants), fields(count = participants.len()))]
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            identity: None,
            log_path: default_log_path(),
            poll_interval_ms: default_poll_interval_ms(),
            promotion: PromotionPolicy::default(),
            disambiguation: Disambiguation::default(),
        }
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(participants = config.participants.len(), "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.participants.len() != 2 {
            return Err(ConfigError::new(format!(
                "Expected exactly 2 participants, found {}",
                self.participants.len()
            )));
        }
        if self.participants[0] == self.participants[1] {
            return Err(ConfigError::new("Participants must be distinct"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::new("poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Replaces the log path.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Picks the local participant: `explicit`, then the config file, then
    /// the [`PLAYER_ENV`] variable.
    #[instrument(skip(self))]
    pub fn resolve_identity(&self, explicit: Option<&str>) -> Result<Participant, ConfigError> {
        if let Some(name) = explicit {
            return Ok(Participant::new(name));
        }
        if let Some(identity) = &self.identity {
            return Ok(identity.clone());
        }
        std::env::var(PLAYER_ENV).map(Participant::new).map_err(|_| {
            ConfigError::new(format!(
                "No player given: pass --me, set identity in the config, or set {}",
                PLAYER_ENV
            ))
        })
    }

    /// Poll interval for the file log.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Translator configured with the promotion and disambiguation policies.
    pub fn translator(&self) -> Translator {
        Translator::new(self.promotion, self.disambiguation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = ChessConfig::from_toml(r#"participants = ["alice", "bob"]"#).unwrap();
        assert_eq!(config.participants()[0], Participant::new("alice"));
        assert_eq!(*config.poll_interval_ms(), 500);
        assert_eq!(config.log_path(), &PathBuf::from("strictly_chess.jsonl"));
        assert_eq!(*config.promotion(), PromotionPolicy::Queen);
        assert_eq!(*config.disambiguation(), Disambiguation::Minimal);
        assert_eq!(config.translator(), Translator::default());
    }

    #[test]
    fn test_full_config() {
        let config = ChessConfig::from_toml(
            r#"
            participants = ["alice", "bob"]
            identity = "bob"
            log_path = "games/one.jsonl"
            poll_interval_ms = 50
            promotion = "knight"
            disambiguation = "omit"
            "#,
        )
        .unwrap();
        assert_eq!(config.identity(), &Some(Participant::new("bob")));
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(
            config.translator(),
            Translator::new(PromotionPolicy::Knight, Disambiguation::Omit)
        );
    }

    #[test]
    fn test_invalid_participants_rejected() {
        assert!(ChessConfig::from_toml(r#"participants = ["alice"]"#).is_err());
        assert!(ChessConfig::from_toml(r#"participants = ["alice", "alice"]"#).is_err());
        let err = ChessConfig::from_toml("participants = 3").unwrap_err();
        assert!(err.message.contains("Failed to parse"));
    }

    #[test]
    fn test_explicit_identity_wins() {
        let config = ChessConfig::from_toml(
            r#"
            participants = ["alice", "bob"]
            identity = "bob"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.resolve_identity(Some("alice")).unwrap(),
            Participant::new("alice")
        );
        assert_eq!(config.resolve_identity(None).unwrap(), Participant::new("bob"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strictly_chess.toml");
        std::fs::write(&path, "participants = [\"alice\", \"bob\"]\n").unwrap();
        let config = ChessConfig::from_file(&path).unwrap();
        assert_eq!(config.participants().len(), 2);
        assert!(ChessConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
