//! UTTT CLI - Command-line interface
//!
//! Commands:
//! - best-move: Search a single position
//! - play: Play a game against the AI
//! - selfplay: Let the AI play itself
//! - random: Play the AI against a random opponent
//! - replay: Print a saved transcript

mod analyze;
mod match_cmd;
mod play;
mod position;
mod render;
mod transcript;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "uttt")]
#[command(about = "Ultimate Tic-Tac-Toe AI")]
struct Cli {
    /// Seed for random opponents (random if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the AI's move for a position
    BestMove(analyze::BestMoveArgs),
    /// Play a game against the AI
    Play(play::PlayArgs),
    /// Play the AI against itself
    Selfplay(play::SelfPlayArgs),
    /// Play the AI against a random opponent
    Random(match_cmd::RandomArgs),
    /// Print every position of a transcript file
    Replay(play::ReplayArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (stderr, so board output stays clean)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::BestMove(args) => analyze::run(args),
        Commands::Play(args) => play::run_play(args),
        Commands::Selfplay(args) => play::run_selfplay(args),
        Commands::Random(args) => match_cmd::run(args, cli.seed),
        Commands::Replay(args) => play::run_replay(args),
    }
}
