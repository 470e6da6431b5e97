//! Rules engine boundary.
//!
//! The core never decides legality itself. It reads board occupancy through
//! [`RulesEngine::status`] and submits notation through
//! [`RulesEngine::apply_move`], branching on the returned result.

mod shakmaty_engine;

pub use shakmaty_engine::ShakmatyEngine;

use crate::error::InvalidMove;
use crate::types::{Coord, Occupant, PieceKind, Side};
use serde::{Deserialize, Serialize};

/// One square of a board snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareView {
    /// Location.
    pub coord: Coord,
    /// Piece on the square, if any.
    pub occupant: Option<Occupant>,
}

/// Board state reported by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardStatus {
    /// All 64 squares ordered a1, b1, … h1, a2, … h8.
    pub squares: Vec<SquareView>,
    /// Side to move is in check.
    pub is_check: bool,
    /// Side to move is checkmated.
    pub is_checkmate: bool,
    /// Side to move.
    pub side_to_move: Side,
}

impl BoardStatus {
    /// Occupant of `coord`.
    pub fn occupant(&self, coord: Coord) -> Option<Occupant> {
        let index = coord.rank.index() as usize * 8 + coord.file.index() as usize;
        self.squares.get(index).and_then(|square| square.occupant)
    }
}

/// Piece to promote to when a pawn reaches the last rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionPolicy {
    /// Always the strongest piece.
    #[default]
    Queen,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
}

impl PromotionPolicy {
    /// Piece kind promoted to.
    pub fn kind(self) -> PieceKind {
        match self {
            PromotionPolicy::Queen => PieceKind::Queen,
            PromotionPolicy::Knight => PieceKind::Knight,
            PromotionPolicy::Bishop => PieceKind::Bishop,
            PromotionPolicy::Rook => PieceKind::Rook,
        }
    }
}

/// Chess rules collaborator.
pub trait RulesEngine {
    /// Applies a move in algebraic notation. On error the board is unchanged.
    fn apply_move(&mut self, notation: &str) -> Result<(), InvalidMove>;

    /// Current board, check and checkmate flags.
    fn status(&self) -> BoardStatus;

    /// Occupant of a single square.
    fn occupant(&self, coord: Coord) -> Option<Occupant> {
        self.status().occupant(coord)
    }

    /// Origins of `side`'s pieces of `kind` that have a legal move to `to`.
    fn reachers(&self, kind: PieceKind, side: Side, to: Coord) -> Vec<Coord>;
}
