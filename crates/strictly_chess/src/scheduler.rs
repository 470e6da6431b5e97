//! Turn scheduling: deciding whether to act or to wait.
//!
//! A session starts as a [`SessionSetup`], which replays the log and elects
//! roles when started. The resulting [`TurnScheduler`] alternates between
//! reading a local move and blocking on the log for the remote one, until
//! one side is checkmated.

use crate::engine::RulesEngine;
use crate::error::{InvalidMoveReason, SessionError};
use crate::log::{GameLog, LogEntry, Turn};
use crate::notation::Translator;
use crate::present::{MoveSource, Notice, Presenter, Prompt, Snapshot};
use crate::replay::{LogReplayer, resolve_identity};
use crate::types::{Outcome, Participant, PieceKind, RawMove, SessionRoleAssignment, Side};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

/// Where the session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for a local move.
    MyTurn {
        /// Local piece the remote participant took with their last move.
        incoming_capture: Option<PieceKind>,
    },
    /// Waiting for the remote move right after startup. Polls without
    /// syncing so the freshly read head is not raced.
    WaitingFirst,
    /// Waiting for the remote move after a local one. Syncs, then polls.
    WaitingAfterSync,
    /// The game is over.
    Terminal(Outcome),
}

/// Everything a running session owns.
#[derive(Debug, Getters)]
pub struct SessionContext<E, L> {
    /// Elected sides.
    roles: SessionRoleAssignment,
    /// Local participant.
    identity: Participant,
    /// Remote participant.
    opponent: Participant,
    /// Rules engine holding the game state.
    engine: E,
    /// Log handle.
    log: L,
}

/// A session that has not replayed the log yet.
pub struct SessionSetup<E, L> {
    engine: E,
    log: L,
    translator: Translator,
    input: Box<dyn MoveSource>,
    presenter: Box<dyn Presenter>,
}

impl<E, L> SessionSetup<E, L>
where
    E: RulesEngine + Send,
    L: GameLog,
{
    /// Creates a setup. `engine` must be at the initial position.
    pub fn new(
        engine: E,
        log: L,
        translator: Translator,
        input: Box<dyn MoveSource>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self {
            engine,
            log,
            translator,
            input,
            presenter,
        }
    }

    /// Bootstraps the session: checks identity, initializes the log, replays
    /// history, elects roles and decides the first state from the head entry.
    ///
    /// # Errors
    ///
    /// Identity, log and replay failures are all fatal. Identity is checked
    /// before anything is written to the log.
    #[instrument(skip(self), fields(identity = %self.log.identity()))]
    pub async fn start(self) -> Result<TurnScheduler<E, L>, SessionError> {
        let Self {
            mut engine,
            mut log,
            translator,
            input,
            mut presenter,
        } = self;

        let identity = log.identity().clone();
        let participants = log.participants().to_vec();
        resolve_identity(&identity, &participants)?;
        let opponent = participants
            .iter()
            .find(|p| **p != identity)
            .cloned()
            .unwrap_or_else(|| Participant::new("opponent"));

        log.initialize().await?;
        // The head comes from the same read as the replay; anything appended
        // after it is left for the first poll.
        let history = log.history().await?;
        let replay =
            LogReplayer::new(translator).reconstruct(&mut engine, &history, &identity, &participants)?;
        let head = history.last().cloned();

        let status = engine.status();
        presenter.render(&Snapshot::new(status.clone(), replay.last_capture), replay.roles.local);

        let ctx = SessionContext {
            roles: replay.roles,
            identity,
            opponent,
            engine,
            log,
        };
        let state = first_state(&ctx, head.as_ref(), status.is_checkmate, replay.last_capture);
        info!(?state, local = %ctx.roles.local, "Session bootstrapped");

        let mut scheduler = TurnScheduler {
            ctx,
            translator,
            input,
            presenter,
            state,
        };
        if let TurnState::Terminal(outcome) = state {
            scheduler.announce(outcome);
        }
        Ok(scheduler)
    }
}

fn first_state<E, L>(
    ctx: &SessionContext<E, L>,
    head: Option<&LogEntry>,
    is_checkmate: bool,
    last_capture: Option<PieceKind>,
) -> TurnState {
    let authored_by_me = head.is_some_and(|entry| entry.participant == ctx.identity);

    if is_checkmate {
        let outcome = if authored_by_me {
            Outcome::Win
        } else {
            Outcome::Loss
        };
        return TurnState::Terminal(outcome);
    }

    let has_move = head.is_some_and(|entry| entry.raw_move.is_some());
    let my_turn = if has_move {
        !authored_by_me
    } else {
        ctx.roles.local == Side::First
    };

    if my_turn {
        TurnState::MyTurn {
            incoming_capture: if has_move { last_capture } else { None },
        }
    } else {
        TurnState::WaitingFirst
    }
}

/// Drives a bootstrapped session turn by turn.
pub struct TurnScheduler<E, L> {
    ctx: SessionContext<E, L>,
    translator: Translator,
    input: Box<dyn MoveSource>,
    presenter: Box<dyn Presenter>,
    state: TurnState,
}

impl<E, L> TurnScheduler<E, L>
where
    E: RulesEngine + Send,
    L: GameLog,
{
    /// Current state.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Session context.
    pub fn context(&self) -> &SessionContext<E, L> {
        &self.ctx
    }

    /// Runs until the game ends.
    #[instrument(skip(self), fields(identity = %self.ctx.identity))]
    pub async fn run(&mut self) -> Result<Outcome, SessionError> {
        loop {
            if let TurnState::Terminal(outcome) = self.state {
                info!(%outcome, "Game over");
                return Ok(outcome);
            }
            self.step().await?;
        }
    }

    /// Performs one transition and returns the new state.
    pub async fn step(&mut self) -> Result<TurnState, SessionError> {
        let next = match self.state {
            TurnState::Terminal(_) => self.state,
            TurnState::WaitingFirst => {
                self.notify_waiting();
                let entry = self.ctx.log.poll().await?;
                self.receive(entry)?
            }
            TurnState::WaitingAfterSync => {
                self.notify_waiting();
                self.ctx.log.sync().await?;
                let entry = self.ctx.log.poll().await?;
                self.receive(entry)?
            }
            TurnState::MyTurn { incoming_capture } => self.take_turn(incoming_capture).await?,
        };
        debug!(from = ?self.state, to = ?next, "Transition");
        self.state = next;
        Ok(next)
    }

    fn notify_waiting(&mut self) {
        self.presenter.notify(&Notice::Waiting {
            opponent: self.ctx.opponent.clone(),
        });
    }

    #[instrument(skip(self, entry), fields(sequence = entry.sequence))]
    fn receive(&mut self, entry: LogEntry) -> Result<TurnState, SessionError> {
        let raw = match entry.raw_move {
            Some(raw) if entry.participant != self.ctx.identity => raw,
            _ => {
                warn!(author = %entry.participant, "Polled entry is not a remote move");
                return Err(SessionError::UnexpectedEntry {
                    sequence: entry.sequence,
                });
            }
        };

        let flip = self.ctx.roles.opponent.is_mirrored();
        let translation = self.translator.translate(&mut self.ctx.engine, raw, flip);
        if translation.invalid {
            return Err(SessionError::ReplayConsistency {
                sequence: entry.sequence,
                notation: translation.canonical,
                reason: translation
                    .reason
                    .unwrap_or(InvalidMoveReason::Illegal),
            });
        }
        info!(notation = %translation.canonical, "Remote move applied");

        let status = self.ctx.engine.status();
        self.presenter.render(
            &Snapshot::new(status.clone(), translation.captured),
            self.ctx.roles.local,
        );
        if status.is_check {
            self.presenter.notify(&Notice::Check);
        }
        if status.is_checkmate {
            self.announce(Outcome::Loss);
            return Ok(TurnState::Terminal(Outcome::Loss));
        }
        Ok(TurnState::MyTurn {
            incoming_capture: translation.captured,
        })
    }

    async fn take_turn(
        &mut self,
        incoming_capture: Option<PieceKind>,
    ) -> Result<TurnState, SessionError> {
        let prompt = Prompt {
            capture: incoming_capture.map(|kind| (self.ctx.opponent.clone(), kind)),
        };
        let line = self.input.request_move(&prompt).await?;

        let raw: RawMove = match line.parse() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Unreadable move");
                return Ok(self.reject());
            }
        };

        let flip = self.ctx.roles.local.is_mirrored();
        let translation = self.translator.translate(&mut self.ctx.engine, raw, flip);
        if translation.invalid {
            warn!(%raw, notation = %translation.canonical, "Move rejected");
            return Ok(self.reject());
        }
        info!(%raw, notation = %translation.canonical, "Local move applied");

        let status = self.ctx.engine.status();
        self.presenter.render(
            &Snapshot::new(status.clone(), translation.captured),
            self.ctx.roles.local,
        );

        let turn = Turn::new(self.ctx.identity.clone(), Some(raw), translation.captured);
        if status.is_checkmate {
            self.announce(Outcome::Win);
            self.ctx.log.append(turn).await?;
            self.presenter.notify(&Notice::WrapUp);
            self.ctx.log.sync().await?;
            return Ok(TurnState::Terminal(Outcome::Win));
        }

        if status.is_check {
            self.presenter.notify(&Notice::Check);
        }
        self.ctx.log.append(turn).await?;
        Ok(TurnState::WaitingAfterSync)
    }

    fn reject(&mut self) -> TurnState {
        self.presenter.notify(&Notice::SyntaxError);
        TurnState::MyTurn {
            incoming_capture: None,
        }
    }

    fn announce(&mut self, outcome: Outcome) {
        let notice = match outcome {
            Outcome::Win => Notice::Won,
            Outcome::Loss => Notice::Lost {
                winner: self.ctx.opponent.clone(),
            },
        };
        self.presenter.notify(&notice);
    }
}
