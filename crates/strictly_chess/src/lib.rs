//! Strictly Chess - two-player chess over a shared append-only log
//!
//! Each participant runs their own session against a replicated log. Moves
//! are typed as coordinate pairs in the participant's own orientation,
//! translated into algebraic notation and validated by a rules engine before
//! they are committed.
//!
//! # Architecture
//!
//! - **Types**: sides, squares, raw moves and participants
//! - **Engine**: the rules engine port and its shakmaty adapter
//! - **Notation**: raw move to algebraic notation translation
//! - **Log**: the replicated log port, in memory or as a JSON-lines file
//! - **Replay**: role election and game reconstruction from history
//! - **Scheduler**: the turn state machine driving a session
//!
//! # Example
//!
//! ```no_run
//! use strictly_chess::{ChessConfig, FileLog, SessionSetup, ShakmatyEngine};
//! # use strictly_chess::{MoveSource, Presenter};
//!
//! # async fn example(
//! #     input: Box<dyn MoveSource>,
//! #     presenter: Box<dyn Presenter>,
//! # ) -> anyhow::Result<()> {
//! let config = ChessConfig::from_file("strictly_chess.toml")?;
//! let me = config.resolve_identity(Some("alice"))?;
//! let log = FileLog::new(
//!     config.log_path(),
//!     me,
//!     config.participants().clone(),
//!     config.poll_interval(),
//! );
//!
//! let setup = SessionSetup::new(ShakmatyEngine::new(), log, config.translator(), input, presenter);
//! let outcome = setup.start().await?.run().await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod engine;
mod error;
mod log;
mod notation;
mod present;
mod replay;
mod scheduler;
mod types;

// Crate-level exports - Domain types
pub use types::{
    Coord, File, MoveSyntaxError, Occupant, Outcome, Participant, PieceKind, Rank, RawMove,
    SessionRoleAssignment, Side,
};

// Crate-level exports - Errors
pub use error::{ConfigError, InvalidMove, InvalidMoveReason, LogError, SessionError};

// Crate-level exports - Rules engine
pub use engine::{BoardStatus, PromotionPolicy, RulesEngine, ShakmatyEngine, SquareView};

// Crate-level exports - Notation
pub use notation::{Disambiguation, Translation, Translator};

// Crate-level exports - Game log
pub use log::{FileLog, GameLog, LogEntry, MemoryLog, Turn};

// Crate-level exports - Replay
pub use replay::{LogReplayer, Reconstruction, assign_roles, resolve_identity};

// Crate-level exports - Presentation
pub use present::{MoveSource, Notice, Presenter, Prompt, Snapshot};

// Crate-level exports - Scheduling
pub use scheduler::{SessionContext, SessionSetup, TurnScheduler, TurnState};

// Crate-level exports - Configuration
pub use config::{ChessConfig, PLAYER_ENV};
