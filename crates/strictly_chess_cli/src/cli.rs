//! Command-line interface for strictly_chess.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Chess - play chess with a remote opponent over a shared log
#[derive(Parser, Debug)]
#[command(name = "strictly_chess")]
#[command(about = "Two-player chess over a shared append-only log", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the session configuration file
    #[arg(short, long, default_value = "strictly_chess.toml")]
    pub config: PathBuf,

    /// Local participant (overrides the config file and STRICTLY_CHESS_PLAYER)
    #[arg(long)]
    pub me: Option<String>,

    /// Override the shared log path
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Subcommand to run (defaults to play)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Join the game and play until checkmate
    Play,

    /// Print the logged moves and the resulting board, then exit
    Replay,
}
