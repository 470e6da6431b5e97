//! Rebuilds the game from log history.

use crate::engine::RulesEngine;
use crate::error::{InvalidMoveReason, SessionError};
use crate::log::LogEntry;
use crate::notation::Translator;
use crate::types::{Participant, PieceKind, SessionRoleAssignment, Side};
use tracing::{debug, error, info, instrument};

/// Result of replaying a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconstruction {
    /// Elected sides.
    pub roles: SessionRoleAssignment,
    /// Number of moves applied.
    pub moves_applied: usize,
    /// Piece captured by the last applied move.
    pub last_capture: Option<PieceKind>,
}

/// Fails unless `identity` is one of `participants`.
#[instrument(skip(participants))]
pub fn resolve_identity(
    identity: &Participant,
    participants: &[Participant],
) -> Result<(), SessionError> {
    if participants.contains(identity) {
        Ok(())
    } else {
        error!(%identity, "Identity not among participants");
        Err(SessionError::IdentityResolution {
            identity: identity.to_string(),
        })
    }
}

/// Elects the local side.
///
/// Whoever authored the earliest move plays first. Before anyone has moved,
/// the first listed participant does.
#[instrument(skip(history, participants))]
pub fn assign_roles(
    history: &[LogEntry],
    identity: &Participant,
    participants: &[Participant],
) -> Result<SessionRoleAssignment, SessionError> {
    resolve_identity(identity, participants)?;

    let first_mover = history
        .iter()
        .find(|entry| entry.raw_move.is_some())
        .map(|entry| &entry.participant)
        .or_else(|| participants.first());

    let local = if first_mover == Some(identity) {
        Side::First
    } else {
        Side::Second
    };
    Ok(SessionRoleAssignment::new(local))
}

/// Replays history into a rules engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReplayer {
    translator: Translator,
}

impl LogReplayer {
    /// Creates a replayer that translates with `translator`.
    pub fn new(translator: Translator) -> Self {
        Self { translator }
    }

    /// Elects roles and applies every move in `history` to `engine`.
    ///
    /// Odd-indexed moves were made by the second side and are mirrored. A
    /// move the engine rejects means the log and the engine disagree; that is
    /// fatal and nothing after it is applied.
    #[instrument(skip(self, engine, history, participants), fields(entries = history.len()))]
    pub fn reconstruct<E: RulesEngine + ?Sized>(
        &self,
        engine: &mut E,
        history: &[LogEntry],
        identity: &Participant,
        participants: &[Participant],
    ) -> Result<Reconstruction, SessionError> {
        let roles = assign_roles(history, identity, participants)?;

        let mut moves_applied = 0;
        let mut last_capture = None;
        for entry in history {
            let Some(raw) = entry.raw_move else {
                continue;
            };
            let flip = Side::for_move_index(moves_applied).is_mirrored();
            let translation = self.translator.translate(engine, raw, flip);
            if translation.invalid {
                let reason = translation.reason.unwrap_or(InvalidMoveReason::Illegal);
                error!(
                    sequence = entry.sequence,
                    notation = %translation.canonical,
                    %reason,
                    "Log entry rejected during replay"
                );
                return Err(SessionError::ReplayConsistency {
                    sequence: entry.sequence,
                    notation: translation.canonical,
                    reason,
                });
            }
            debug!(sequence = entry.sequence, notation = %translation.canonical, flip, "Replayed");
            moves_applied += 1;
            last_capture = translation.captured;
        }

        info!(local = %roles.local, moves_applied, "Game reconstructed");
        Ok(Reconstruction {
            roles,
            moves_applied,
            last_capture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ShakmatyEngine;
    use crate::types::Occupant;
    use chrono::Utc;

    fn participants() -> Vec<Participant> {
        vec![Participant::new("alice"), Participant::new("bob")]
    }

    fn entry(sequence: u64, who: &str, raw: Option<&str>) -> LogEntry {
        LogEntry {
            sequence,
            participant: Participant::new(who),
            raw_move: raw.map(|r| r.parse().unwrap()),
            capture: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_history_uses_participant_order() {
        let alice = Participant::new("alice");
        let bob = Participant::new("bob");
        assert_eq!(assign_roles(&[], &alice, &participants()).unwrap().local, Side::First);
        assert_eq!(assign_roles(&[], &bob, &participants()).unwrap().local, Side::Second);

        let bootstrap = [entry(1, "bob", None)];
        assert_eq!(
            assign_roles(&bootstrap, &alice, &participants()).unwrap().local,
            Side::First
        );
    }

    #[test]
    fn test_first_mover_plays_first_regardless_of_list_order() {
        let history = [entry(1, "alice", None), entry(2, "bob", Some("e2e4"))];
        let roles = assign_roles(&history, &Participant::new("bob"), &participants()).unwrap();
        assert_eq!(roles.local, Side::First);
        assert_eq!(roles.opponent, Side::Second);

        let again = assign_roles(&history, &Participant::new("bob"), &participants()).unwrap();
        assert_eq!(roles, again);
    }

    #[test]
    fn test_unknown_identity_is_rejected() {
        let err = assign_roles(&[], &Participant::new("mallory"), &participants()).unwrap_err();
        assert!(matches!(err, SessionError::IdentityResolution { .. }));
    }

    #[test]
    fn test_reconstruct_applies_moves_with_parity_flip() {
        let history = [
            entry(1, "alice", None),
            entry(2, "alice", Some("e2e4")),
            // bob's own view of e7e5
            entry(3, "bob", Some("d2d4")),
        ];
        let mut engine = ShakmatyEngine::new();
        let result = LogReplayer::default()
            .reconstruct(&mut engine, &history, &Participant::new("bob"), &participants())
            .unwrap();

        assert_eq!(result.roles.local, Side::Second);
        assert_eq!(result.moves_applied, 2);
        let pawn = |side| Some(Occupant::new(PieceKind::Pawn, side));
        assert_eq!(engine.occupant("e4".parse().unwrap()), pawn(Side::First));
        assert_eq!(engine.occupant("e5".parse().unwrap()), pawn(Side::Second));
        assert_eq!(engine.status().side_to_move, Side::First);
    }

    #[test]
    fn test_reconstruct_is_idempotent() {
        let history = [
            entry(1, "alice", None),
            entry(2, "alice", Some("e2e4")),
            entry(3, "bob", Some("e2e4")),
            entry(4, "alice", Some("g1f3")),
        ];
        let replayer = LogReplayer::default();
        let alice = Participant::new("alice");

        let mut first = ShakmatyEngine::new();
        let a = replayer
            .reconstruct(&mut first, &history, &alice, &participants())
            .unwrap();
        let mut second = ShakmatyEngine::new();
        let b = replayer
            .reconstruct(&mut second, &history, &alice, &participants())
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(first.status(), second.status());
    }

    #[test]
    fn test_rejected_history_is_fatal() {
        let history = [
            entry(1, "alice", None),
            entry(2, "alice", Some("e2e4")),
            entry(3, "bob", Some("e2e5")),
            entry(4, "alice", Some("d2d4")),
        ];
        let mut engine = ShakmatyEngine::new();
        let err = LogReplayer::default()
            .reconstruct(&mut engine, &history, &Participant::new("alice"), &participants())
            .unwrap_err();

        match err {
            SessionError::ReplayConsistency {
                sequence, reason, ..
            } => {
                assert_eq!(sequence, 3);
                assert_eq!(reason, InvalidMoveReason::Illegal);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(engine.occupant("d4".parse().unwrap()), None);
    }
}
