//! Best-move command - search a single position
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: search_position(), report_move()
//! - Level 4: configuration

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use uttt_core::{AlphaBetaAI, Board, SearchReport, SUBBOARDS};

use crate::position::{Position, PositionArgs};
use crate::render;
use crate::transcript::Transcript;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BestMoveArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Search depth
    #[arg(short, long, default_value = "7")]
    pub depth: u32,

    /// Stop deepening once this many milliseconds have passed
    #[arg(long, value_name = "MS")]
    pub time_limit: Option<u64>,

    /// Write the resulting board string to a file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run best-move command
pub fn run(args: BestMoveArgs) -> Result<()> {
    let position = args.position.resolve()?;

    tracing::info!(
        "Searching for {:?} in sub-board {} (depth={})",
        position.player,
        position.forced,
        args.depth
    );

    let report = search_position(&position, &args)?;
    let after = position.board.apply_move(report.best_move, position.player);

    report_move(&position, &after, &report, args.json)?;

    let mut transcript = Transcript::create(args.output.as_deref())?;
    transcript.record(&after)?;

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn search_position(position: &Position, args: &BestMoveArgs) -> Result<SearchReport> {
    let mut ai = AlphaBetaAI::new(args.depth);
    if let Some(ms) = args.time_limit {
        ai = ai.with_time_limit(Duration::from_millis(ms));
    }
    ai.analyze(&position.board, position.forced, position.player)
        .context("Search failed")
}

fn report_move(position: &Position, after: &Board, report: &SearchReport, json: bool) -> Result<()> {
    let next_forced = report.best_move % SUBBOARDS;
    let next_moves = if after.is_terminal() {
        Vec::new()
    } else {
        after.legal_moves(next_forced)
    };

    if json {
        #[derive(serde::Serialize)]
        struct JsonMove {
            player: uttt_core::Player,
            best_move: usize,
            value: i64,
            depth: u32,
            nodes: u64,
            board: String,
            result: uttt_core::WinState,
            next_moves: Vec<usize>,
        }

        let output = JsonMove {
            player: position.player,
            best_move: report.best_move,
            value: report.value,
            depth: report.depth,
            nodes: report.nodes,
            board: after.to_string(),
            result: after.result(),
            next_moves,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", render::pretty(&render::annotate(after, Some(report.best_move), Some(next_forced))));
    println!("\nNext Moves: {:?}", next_moves);
    println!("AI Plays: {}", report.best_move);
    tracing::info!(
        "value={} depth={} nodes={} table={} hits={} in {:.2?}",
        report.value,
        report.depth,
        report.nodes,
        report.table_entries,
        report.table_hits,
        report.elapsed
    );
    Ok(())
}
