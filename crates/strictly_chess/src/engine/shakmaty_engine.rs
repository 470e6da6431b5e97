//! Rules engine backed by `shakmaty`.

use super::{BoardStatus, RulesEngine, SquareView};
use crate::error::{InvalidMove, InvalidMoveReason};
use crate::types::{Coord, File, Occupant, PieceKind, Rank, Side};
use shakmaty::san::{San, SanError};
use shakmaty::{Chess, Color, Piece, Position, Role, Square};
use tracing::{debug, instrument};

/// Standard chess from the initial position. The first side plays white.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyEngine {
    position: Chess,
}

impl ShakmatyEngine {
    /// Creates an engine at the initial position.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RulesEngine for ShakmatyEngine {
    #[instrument(skip(self))]
    fn apply_move(&mut self, notation: &str) -> Result<(), InvalidMove> {
        let san: San = notation
            .parse()
            .map_err(|_| InvalidMove::new(notation, InvalidMoveReason::Unparseable))?;
        let m = san.to_move(&self.position).map_err(|e| {
            let reason = match e {
                SanError::IllegalSan => InvalidMoveReason::Illegal,
                SanError::AmbiguousSan => InvalidMoveReason::Ambiguous,
            };
            InvalidMove::new(notation, reason)
        })?;
        self.position.play_unchecked(m);
        debug!(notation, "Move applied");
        Ok(())
    }

    fn status(&self) -> BoardStatus {
        let board = self.position.board();
        let squares = Square::ALL
            .iter()
            .map(|&sq| SquareView {
                coord: coord_of(sq),
                occupant: board.piece_at(sq).map(occupant_of),
            })
            .collect();

        BoardStatus {
            squares,
            is_check: self.position.is_check(),
            is_checkmate: self.position.is_checkmate(),
            side_to_move: side_of(self.position.turn()),
        }
    }

    fn occupant(&self, coord: Coord) -> Option<Occupant> {
        self.position
            .board()
            .piece_at(square_of(coord))
            .map(occupant_of)
    }

    fn reachers(&self, kind: PieceKind, side: Side, to: Coord) -> Vec<Coord> {
        if side_of(self.position.turn()) != side {
            return Vec::new();
        }
        let mut origins: Vec<Coord> = self
            .position
            .san_candidates(role_of(kind), square_of(to))
            .iter()
            .filter_map(|m| m.from())
            .map(coord_of)
            .collect();
        origins.dedup();
        origins
    }
}

fn square_of(coord: Coord) -> Square {
    Square::new(u32::from(coord.rank.index()) * 8 + u32::from(coord.file.index()))
}

fn coord_of(sq: Square) -> Coord {
    let file = File::from_index(sq.file().to_u32() as u8);
    let rank = Rank::from_index(sq.rank().to_u32() as u8);
    match (file, rank) {
        (Some(file), Some(rank)) => Coord::new(file, rank),
        // shakmaty files and ranks are always 0..8
        _ => unreachable!("square {sq} outside the board"),
    }
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::First,
        Color::Black => Side::Second,
    }
}

fn role_of(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

fn occupant_of(piece: Piece) -> Occupant {
    let kind = match piece.role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    };
    Occupant::new(kind, side_of(piece.color))
}
