//! Coordinate-pair to algebraic notation translation.
//!
//! Participants type moves as origin and destination squares (`e2e4`) in their
//! own orientation. The rules engine understands standard algebraic notation
//! in a single orientation, so each move is normalized, inspected against the
//! current board and rewritten before it is submitted.

use crate::engine::{PromotionPolicy, RulesEngine};
use crate::error::InvalidMoveReason;
use crate::types::{Coord, Occupant, PieceKind, RawMove, Side};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// How to disambiguate between like pieces that can reach the same square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disambiguation {
    /// Add the shortest origin qualifier that identifies the piece: file,
    /// then rank, then both. A move whose origin cannot reach the
    /// destination is fully qualified so the engine rejects it instead of
    /// moving a different piece.
    #[default]
    Minimal,
    /// Never qualify the origin.
    Omit,
}

/// Outcome of translating and submitting one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Notation submitted to the rules engine.
    pub canonical: String,
    /// Kind of piece captured by the move, when it applied.
    pub captured: Option<PieceKind>,
    /// The engine rejected the move; the board is unchanged.
    pub invalid: bool,
    /// Engine rejection reason when `invalid`.
    pub reason: Option<InvalidMoveReason>,
}

/// Translates raw moves and applies them to a rules engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, new)]
pub struct Translator {
    promotion: PromotionPolicy,
    disambiguation: Disambiguation,
}

impl Translator {
    /// Translates `raw`, mirrored first when `flip` is set, and submits it.
    ///
    /// The only board mutation is the engine's own move application, which
    /// does nothing when the move is rejected.
    #[instrument(skip(self, engine, raw), fields(raw = %raw))]
    pub fn translate<E: RulesEngine + ?Sized>(
        &self,
        engine: &mut E,
        raw: RawMove,
        flip: bool,
    ) -> Translation {
        let RawMove {
            origin,
            destination,
        } = raw.oriented(flip);

        let mover = engine.occupant(origin);
        let target = engine.occupant(destination);
        let (canonical, captured) = self.notation(&*engine, origin, destination, mover, target);

        match engine.apply_move(&canonical) {
            Ok(()) => {
                debug!(%canonical, ?captured, "Move translated");
                Translation {
                    canonical,
                    captured,
                    invalid: false,
                    reason: None,
                }
            }
            Err(rejection) => {
                debug!(%canonical, reason = %rejection.reason, "Move rejected");
                Translation {
                    canonical,
                    captured: None,
                    invalid: true,
                    reason: Some(rejection.reason),
                }
            }
        }
    }

    fn notation<E: RulesEngine + ?Sized>(
        &self,
        engine: &E,
        from: Coord,
        to: Coord,
        mover: Option<Occupant>,
        target: Option<Occupant>,
    ) -> (String, Option<PieceKind>) {
        let Some(mover) = mover else {
            // Nothing to move. Fully qualified so no other piece can match.
            return (format!("{from}{to}"), None);
        };

        if is_castling(engine, mover, from, to) {
            let castle = if to.file > from.file { "O-O" } else { "O-O-O" };
            return (castle.to_string(), None);
        }

        let en_passant = mover.kind == PieceKind::Pawn && target.is_none() && from.file != to.file;
        let captured = match target {
            Some(occupant) => Some(occupant.kind),
            None if en_passant => Some(PieceKind::Pawn),
            None => None,
        };

        let mut notation = String::new();
        match mover.kind.letter() {
            Some(letter) => {
                notation.push(letter);
                notation.push_str(&self.qualifier(engine, mover, from, to));
            }
            None => {
                let reachable = self.disambiguation == Disambiguation::Omit
                    || engine.reachers(mover.kind, mover.side, to).contains(&from);
                if !reachable {
                    notation.push_str(&from.to_string());
                } else if captured.is_some() {
                    notation.push(from.file.to_char());
                }
            }
        }
        if captured.is_some() {
            notation.push('x');
        }
        notation.push_str(&to.to_string());

        if mover.kind == PieceKind::Pawn && to.rank.is_back_rank() {
            notation.push('=');
            if let Some(letter) = self.promotion.kind().letter() {
                notation.push(letter);
            }
        }

        (notation, captured)
    }

    fn qualifier<E: RulesEngine + ?Sized>(
        &self,
        engine: &E,
        mover: Occupant,
        from: Coord,
        to: Coord,
    ) -> String {
        if self.disambiguation == Disambiguation::Omit {
            return String::new();
        }

        let reachers = engine.reachers(mover.kind, mover.side, to);
        if !reachers.contains(&from) {
            return from.to_string();
        }

        let others: Vec<Coord> = reachers.into_iter().filter(|c| *c != from).collect();
        if others.is_empty() {
            String::new()
        } else if others.iter().all(|c| c.file != from.file) {
            from.file.to_char().to_string()
        } else if others.iter().all(|c| c.rank != from.rank) {
            from.rank.to_char().to_string()
        } else {
            from.to_string()
        }
    }
}

/// A king of the side to move leaving its home square two files sideways.
/// Any other two-file king move falls through to piece notation, which the
/// engine rejects.
fn is_castling<E: RulesEngine + ?Sized>(engine: &E, mover: Occupant, from: Coord, to: Coord) -> bool {
    let home_rank = match mover.side {
        Side::First => 0,
        Side::Second => 7,
    };
    mover.kind == PieceKind::King
        && mover.side == engine.status().side_to_move
        && from.file.index() == 4
        && from.rank.index() == home_rank
        && to.rank == from.rank
        && from.file.index().abs_diff(to.file.index()) == 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ShakmatyEngine;

    fn raw(s: &str) -> RawMove {
        s.parse().unwrap()
    }

    fn engine_after(moves: &[&str]) -> ShakmatyEngine {
        let mut engine = ShakmatyEngine::new();
        for san in moves {
            engine.apply_move(san).unwrap();
        }
        engine
    }

    #[test]
    fn test_pawn_push() {
        let mut engine = ShakmatyEngine::new();
        let t = Translator::default().translate(&mut engine, raw("e2e4"), false);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "e4");
        assert_eq!(t.captured, None);
    }

    #[test]
    fn test_flipped_move_is_mirrored_before_lookup() {
        let mut engine = engine_after(&["e4"]);
        // Second side's "d2d4" is e7e5 on the engine's board.
        let t = Translator::default().translate(&mut engine, raw("d2d4"), true);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "e5");
    }

    #[test]
    fn test_piece_letter_and_capture() {
        let mut engine = engine_after(&["e4", "d5"]);
        let t = Translator::default().translate(&mut engine, raw("e4d5"), false);
        assert_eq!(t.canonical, "exd5");
        assert_eq!(t.captured, Some(PieceKind::Pawn));

        let mut engine = engine_after(&["e4", "d5", "exd5"]);
        let t = Translator::default().translate(&mut engine, raw("d8d5"), false);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "Qxd5");
        assert_eq!(t.captured, Some(PieceKind::Pawn));
    }

    #[test]
    fn test_knight_move() {
        let mut engine = ShakmatyEngine::new();
        let t = Translator::default().translate(&mut engine, raw("g1f3"), false);
        assert_eq!(t.canonical, "Nf3");
        assert!(!t.invalid);
    }

    #[test]
    fn test_illegal_move_is_invalid_and_leaves_board() {
        let mut engine = ShakmatyEngine::new();
        let before = engine.status();
        let t = Translator::default().translate(&mut engine, raw("e2e5"), false);
        assert!(t.invalid);
        assert_eq!(t.reason, Some(InvalidMoveReason::Illegal));
        assert_eq!(t.captured, None);
        assert_eq!(engine.status(), before);
    }

    #[test]
    fn test_empty_origin_is_invalid() {
        let mut engine = ShakmatyEngine::new();
        let t = Translator::default().translate(&mut engine, raw("e3e4"), false);
        assert!(t.invalid);
    }

    #[test]
    fn test_repeating_a_move_on_changed_board_is_invalid() {
        let mut engine = ShakmatyEngine::new();
        let translator = Translator::default();
        assert!(!translator.translate(&mut engine, raw("e2e4"), false).invalid);
        assert!(!translator.translate(&mut engine, raw("d2d4"), true).invalid);
        // e2 is now empty.
        assert!(translator.translate(&mut engine, raw("e2e4"), false).invalid);
    }

    #[test]
    fn test_minimal_disambiguation_by_file() {
        // Knights on b1 and f3 can both reach d2 once d2 is vacated.
        let mut engine = engine_after(&["Nf3", "a6", "d4", "a5", "Qd3", "a4", "Qe3", "h6"]);
        let t = Translator::default().translate(&mut engine, raw("b1d2"), false);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "Nbd2");
    }

    #[test]
    fn test_omitted_disambiguation_is_rejected_as_ambiguous() {
        let mut engine = engine_after(&["Nf3", "a6", "d4", "a5", "Qd3", "a4", "Qe3", "h6"]);
        let translator = Translator::new(PromotionPolicy::Queen, Disambiguation::Omit);
        let t = translator.translate(&mut engine, raw("b1d2"), false);
        assert!(t.invalid);
        assert_eq!(t.canonical, "Nd2");
        assert_eq!(t.reason, Some(InvalidMoveReason::Ambiguous));
    }

    #[test]
    fn test_unreachable_origin_is_fully_qualified() {
        let mut engine = ShakmatyEngine::new();
        let t = Translator::default().translate(&mut engine, raw("b1b3"), false);
        assert_eq!(t.canonical, "Nb1b3");
        assert!(t.invalid);
    }

    #[test]
    fn test_castling() {
        let mut engine = engine_after(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]);
        let t = Translator::default().translate(&mut engine, raw("e1g1"), false);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "O-O");
        assert_eq!(
            engine.occupant("g1".parse().unwrap()).map(|o| o.kind),
            Some(PieceKind::King)
        );
    }

    #[test]
    fn test_opponent_king_is_not_castled() {
        let mut engine = engine_after(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]);
        let t = Translator::default().translate(&mut engine, raw("e8g8"), false);
        assert!(t.invalid);
        assert_eq!(t.canonical, "Ke8xg8");
        assert_eq!(
            engine.occupant("e1".parse().unwrap()).map(|o| o.kind),
            Some(PieceKind::King)
        );
        assert_eq!(
            engine.occupant("e8".parse().unwrap()).map(|o| o.kind),
            Some(PieceKind::King)
        );
        assert_eq!(engine.occupant("g1".parse().unwrap()), None);
    }

    #[test]
    fn test_second_side_castles_in_own_coordinates() {
        let mut engine = engine_after(&["e4", "e5", "Nf3", "Nf6", "Bc4", "Be7", "d3"]);
        // d1b1 mirrored is e8g8
        let t = Translator::default().translate(&mut engine, raw("d1b1"), true);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "O-O");
        assert_eq!(
            engine.occupant("g8".parse().unwrap()),
            Some(Occupant::new(PieceKind::King, Side::Second))
        );
        assert_eq!(
            engine.occupant("f8".parse().unwrap()),
            Some(Occupant::new(PieceKind::Rook, Side::Second))
        );
    }

    #[test]
    fn test_queenside_castling() {
        let mut engine = engine_after(&["d4", "d5", "Nc3", "Nc6", "Bf4", "Bf5", "Qd2", "Qd7"]);
        let t = Translator::default().translate(&mut engine, raw("e1c1"), false);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "O-O-O");
        assert_eq!(
            engine.occupant("c1".parse().unwrap()),
            Some(Occupant::new(PieceKind::King, Side::First))
        );
        assert_eq!(
            engine.occupant("d1".parse().unwrap()),
            Some(Occupant::new(PieceKind::Rook, Side::First))
        );
    }

    #[test]
    fn test_en_passant() {
        let mut engine = engine_after(&["e4", "a6", "e5", "d5"]);
        let t = Translator::default().translate(&mut engine, raw("e5d6"), false);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "exd6");
        assert_eq!(t.captured, Some(PieceKind::Pawn));
    }

    #[test]
    fn test_promotion_uses_policy() {
        let setup = ["h4", "g5", "hxg5", "Nf6", "g6", "Ng8", "gxh7", "a6"];
        let mut engine = engine_after(&setup);
        let t = Translator::default().translate(&mut engine, raw("h7g8"), false);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "hxg8=Q");
        assert_eq!(t.captured, Some(PieceKind::Knight));

        let mut engine = engine_after(&setup);
        let translator = Translator::new(PromotionPolicy::Knight, Disambiguation::Minimal);
        let t = translator.translate(&mut engine, raw("h7g8"), false);
        assert!(!t.invalid);
        assert_eq!(t.canonical, "hxg8=N");
        assert_eq!(
            engine.occupant("g8".parse().unwrap()).map(|o| o.kind),
            Some(PieceKind::Knight)
        );
    }
}
