//! Core domain types for chess over a shared log.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::EnumIter;

/// Side in the game.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Moves first (white in the rules engine).
    #[display("first")]
    First,
    /// Moves second (black in the rules engine).
    #[display("second")]
    Second,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Whether this side reads and writes coordinates mirrored relative to
    /// the rules engine.
    ///
    /// Both participants type moves as if they sat on the first side of the
    /// board, so only the second side's coordinates need flipping.
    pub fn is_mirrored(self) -> bool {
        matches!(self, Side::Second)
    }

    /// Side that authored the move at `index` (0-based, counting moves only).
    pub fn for_move_index(index: usize) -> Self {
        if index % 2 == 0 { Side::First } else { Side::Second }
    }
}

/// Kind of chess piece.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// Pawn.
    #[display("pawn")]
    Pawn,
    /// Knight.
    #[display("knight")]
    Knight,
    /// Bishop.
    #[display("bishop")]
    Bishop,
    /// Rook.
    #[display("rook")]
    Rook,
    /// Queen.
    #[display("queen")]
    Queen,
    /// King.
    #[display("king")]
    King,
}

impl PieceKind {
    /// Algebraic notation letter. Pawns have none.
    pub fn letter(self) -> Option<char> {
        match self {
            PieceKind::Pawn => None,
            PieceKind::Knight => Some('N'),
            PieceKind::Bishop => Some('B'),
            PieceKind::Rook => Some('R'),
            PieceKind::Queen => Some('Q'),
            PieceKind::King => Some('K'),
        }
    }

    /// Board glyph.
    pub fn glyph(self) -> char {
        match self {
            PieceKind::Pawn => '♟',
            PieceKind::Knight => '♞',
            PieceKind::Bishop => '♝',
            PieceKind::Rook => '♜',
            PieceKind::Queen => '♛',
            PieceKind::King => '♚',
        }
    }
}

/// A piece standing on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupant {
    /// Piece kind.
    pub kind: PieceKind,
    /// Owning side.
    pub side: Side,
}

impl Occupant {
    /// Creates a new occupant.
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }
}

/// Board file, `a` through `h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct File(u8);

impl File {
    /// Creates a file from its index (0 = `a`).
    pub fn from_index(index: u8) -> Option<Self> {
        (index < 8).then_some(Self(index))
    }

    /// Parses a file letter.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(Self(c as u8 - b'a')),
            _ => None,
        }
    }

    /// Index from 0 (`a`) to 7 (`h`).
    pub fn index(self) -> u8 {
        self.0
    }

    /// File letter.
    pub fn to_char(self) -> char {
        (b'a' + self.0) as char
    }

    /// Mirrors `a↔h`, `b↔g`, `c↔f`, `d↔e`.
    pub fn flip(self) -> Self {
        Self(7 - self.0)
    }
}

/// Board rank, `1` through `8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(u8);

impl Rank {
    /// Creates a rank from its index (0 = rank 1).
    pub fn from_index(index: u8) -> Option<Self> {
        (index < 8).then_some(Self(index))
    }

    /// Parses a rank digit.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Some(Self(c as u8 - b'1')),
            _ => None,
        }
    }

    /// Index from 0 (rank 1) to 7 (rank 8).
    pub fn index(self) -> u8 {
        self.0
    }

    /// Rank digit.
    pub fn to_char(self) -> char {
        (b'1' + self.0) as char
    }

    /// Mirrors `1↔8`, `2↔7`, `3↔6`, `4↔5`.
    pub fn flip(self) -> Self {
        Self(7 - self.0)
    }

    /// Whether this is rank 1 or rank 8.
    pub fn is_back_rank(self) -> bool {
        self.0 == 0 || self.0 == 7
    }
}

/// A square on the board.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("{}{}", file.to_char(), rank.to_char())]
pub struct Coord {
    /// File.
    pub file: File,
    /// Rank.
    pub rank: Rank,
}

impl Coord {
    /// Creates a coordinate.
    pub fn new(file: File, rank: Rank) -> Self {
        Self { file, rank }
    }

    /// Mirrors both file and rank.
    pub fn flip(self) -> Self {
        Self::new(self.file.flip(), self.rank.flip())
    }

    /// Returns the flipped coordinate when `flip` is set.
    pub fn oriented(self, flip: bool) -> Self {
        if flip { self.flip() } else { self }
    }
}

impl FromStr for Coord {
    type Err = MoveSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => match (File::from_char(f), Rank::from_char(r)) {
                (Some(file), Some(rank)) => Ok(Coord::new(file, rank)),
                _ => Err(MoveSyntaxError::new(s)),
            },
            _ => Err(MoveSyntaxError::new(s)),
        }
    }
}

/// Input that is not a coordinate pair such as `e2e4`.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Not a coordinate move: {:?}", input)]
pub struct MoveSyntaxError {
    /// The rejected input.
    pub input: String,
}

impl MoveSyntaxError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// A coordinate pair in the mover's own orientation, e.g. `e2e4`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display("{}{}", origin, destination)]
#[serde(try_from = "String", into = "String")]
pub struct RawMove {
    /// Origin square.
    pub origin: Coord,
    /// Destination square.
    pub destination: Coord,
}

impl RawMove {
    /// Creates a raw move.
    pub fn new(origin: Coord, destination: Coord) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// Mirrors both squares.
    pub fn flip(self) -> Self {
        Self::new(self.origin.flip(), self.destination.flip())
    }

    /// Returns the flipped move when `flip` is set.
    pub fn oriented(self, flip: bool) -> Self {
        if flip { self.flip() } else { self }
    }
}

impl FromStr for RawMove {
    type Err = MoveSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || s.len() != 4 {
            return Err(MoveSyntaxError::new(s));
        }
        let origin = s[..2].parse().map_err(|_| MoveSyntaxError::new(s))?;
        let destination = s[2..].parse().map_err(|_| MoveSyntaxError::new(s))?;
        Ok(Self::new(origin, destination))
    }
}

impl TryFrom<String> for RawMove {
    type Error = MoveSyntaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RawMove> for String {
    fn from(value: RawMove) -> Self {
        value.to_string()
    }
}

/// Opaque participant identity, as resolved by the log layer.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant(String);

impl Participant {
    /// Creates a participant identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identity as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Participant {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Sides elected for the local session. Computed once, never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRoleAssignment {
    /// Side of the local participant.
    pub local: Side,
    /// Side of the remote participant.
    pub opponent: Side,
}

impl SessionRoleAssignment {
    /// Assigns `local` and the opposing side.
    pub fn new(local: Side) -> Self {
        Self {
            local,
            opponent: local.opponent(),
        }
    }
}

/// How a finished game ended for the local participant.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Local participant delivered checkmate.
    #[display("win")]
    Win,
    /// Remote participant delivered checkmate.
    #[display("loss")]
    Loss,
}
