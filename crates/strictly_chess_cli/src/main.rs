//! Strictly Chess - terminal client
//!
//! Plays one side of a game whose moves live in a shared log file.

#![warn(missing_docs)]

mod cli;
mod input;
mod terminal;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use input::LineMoveSource;
use strictly_chess::{
    ChessConfig, FileLog, GameLog, LogReplayer, Participant, Presenter, RulesEngine, SessionSetup,
    ShakmatyEngine, Snapshot,
};
use terminal::TerminalPresenter;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = load_config(&cli)?;
    let result = match cli.command.unwrap_or(Command::Play) {
        Command::Play => run_play(config, cli.me).await,
        Command::Replay => run_replay(config, cli.me).await,
    };
    if let Err(e) = &result {
        error!(error = %e, "Session failed");
    }
    result
}

/// Logs go to stderr so they never interleave with the board.
fn initialize_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,strictly_chess=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[instrument(skip(cli), fields(config_path = %cli.config.display()))]
fn load_config(cli: &Cli) -> Result<ChessConfig> {
    let config = ChessConfig::from_file(&cli.config)?;
    Ok(match &cli.log {
        Some(path) => config.with_log_path(path),
        None => config,
    })
}

fn open_log(config: &ChessConfig, identity: Participant) -> FileLog {
    FileLog::new(
        config.log_path(),
        identity,
        config.participants().clone(),
        config.poll_interval(),
    )
}

/// Plays until checkmate or ctrl-c.
#[instrument(skip_all)]
async fn run_play(config: ChessConfig, me: Option<String>) -> Result<()> {
    let identity = config.resolve_identity(me.as_deref())?;
    info!(%identity, log = %config.log_path().display(), "Joining game");

    let setup = SessionSetup::new(
        ShakmatyEngine::new(),
        open_log(&config, identity),
        config.translator(),
        Box::new(LineMoveSource::stdio()),
        Box::new(TerminalPresenter::stdout()),
    );

    let game = async {
        let mut scheduler = setup.start().await?;
        scheduler.run().await
    };

    tokio::select! {
        outcome = game => {
            let outcome = outcome?;
            info!(%outcome, "Game finished");
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, leaving the game");
        }
    }
    Ok(())
}

/// Prints the logged moves and the board they lead to.
#[instrument(skip_all)]
async fn run_replay(config: ChessConfig, me: Option<String>) -> Result<()> {
    let identity = match config.resolve_identity(me.as_deref()) {
        Ok(identity) => identity,
        Err(_) => config
            .participants()
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No participants configured"))?,
    };

    let mut log = open_log(&config, identity.clone());
    let history = log.history().await?;
    for entry in &history {
        match entry.raw_move {
            Some(raw) => println!(
                "{:>4}  {:<12} {}",
                entry.sequence,
                entry.participant.as_str(),
                raw
            ),
            None => println!("{:>4}  {:<12} (new game)", entry.sequence, entry.participant.as_str()),
        }
    }

    let mut engine = ShakmatyEngine::new();
    let replay = LogReplayer::new(config.translator()).reconstruct(
        &mut engine,
        &history,
        &identity,
        config.participants(),
    )?;

    let status = engine.status();
    let mut presenter = TerminalPresenter::stdout();
    presenter.render(&Snapshot::new(status.clone(), replay.last_capture), replay.roles.local);
    println!(
        "{} moves played, {} to move{}",
        replay.moves_applied,
        status.side_to_move,
        if status.is_checkmate {
            ", checkmate"
        } else if status.is_check {
            ", check"
        } else {
            ""
        }
    );
    Ok(())
}
