//! What the session shows the local participant, and how it asks for moves.

use crate::engine::{BoardStatus, SquareView};
use crate::error::SessionError;
use crate::types::{Participant, PieceKind, Side};
use derive_more::Display;

/// Board state handed to the presenter after every applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// All squares, a1 first.
    pub board: Vec<SquareView>,
    /// Side to move is in check.
    pub is_check: bool,
    /// Side to move is checkmated.
    pub is_checkmate: bool,
    /// Piece captured by the most recent move.
    pub last_capture: Option<PieceKind>,
}

impl Snapshot {
    /// Builds a snapshot from engine status.
    pub fn new(status: BoardStatus, last_capture: Option<PieceKind>) -> Self {
        Self {
            board: status.squares,
            is_check: status.is_check,
            is_checkmate: status.is_checkmate,
            last_capture,
        }
    }
}

/// Session messages other than the board.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blocking on the remote participant.
    #[display("{}'s turn. Waiting...", opponent)]
    Waiting {
        /// Remote participant.
        opponent: Participant,
    },
    /// The side to move is in check.
    #[display("CHECK!")]
    Check,
    /// The local move was rejected; it will be asked for again.
    #[display("Move not valid. Please try again.")]
    SyntaxError,
    /// Final sync after the winning move.
    #[display("Wrapping up...")]
    WrapUp,
    /// Local participant delivered checkmate.
    #[display("CHECKMATE! You win! Reset the log to play again.")]
    Won,
    /// Remote participant delivered checkmate.
    #[display("CHECKMATE! {} wins! Better luck next time.", winner)]
    Lost {
        /// Remote participant.
        winner: Participant,
    },
}

/// Prompt for the local move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Remote participant and the local piece they just took.
    pub capture: Option<(Participant, PieceKind)>,
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some((opponent, kind)) = &self.capture {
            write!(f, "{} captured your {}! ", opponent, kind)?;
        }
        write!(f, "Your move: ")
    }
}

/// Renders session state. Implemented outside the core.
pub trait Presenter: Send {
    /// Draws the board as seen by `viewer`.
    fn render(&mut self, snapshot: &Snapshot, viewer: Side);

    /// Shows a message.
    fn notify(&mut self, notice: &Notice);
}

/// Supplies the local participant's moves.
#[async_trait::async_trait]
pub trait MoveSource: Send {
    /// Shows `prompt` and waits for one line of input.
    async fn request_move(&mut self, prompt: &Prompt) -> Result<String, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_capture() {
        let plain = Prompt { capture: None };
        assert_eq!(plain.to_string(), "Your move: ");

        let capture = Prompt {
            capture: Some((Participant::new("bob"), PieceKind::Knight)),
        };
        assert_eq!(capture.to_string(), "bob captured your knight! Your move: ");
    }

    #[test]
    fn test_notice_text() {
        let waiting = Notice::Waiting {
            opponent: Participant::new("bob"),
        };
        assert_eq!(waiting.to_string(), "bob's turn. Waiting...");
        assert!(
            Notice::Lost {
                winner: Participant::new("bob")
            }
            .to_string()
            .contains("bob wins")
        );
    }
}
