//! Play commands - human vs AI, AI vs itself, transcript replay

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use uttt_core::{AlphaBetaAI, Board, Player, WinState, SUBBOARDS};

use crate::position::{Position, PositionArgs};
use crate::render;
use crate::transcript::{self, Transcript};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Side {
    X,
    O,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::X => Player::X,
            Side::O => Player::O,
        }
    }
}

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Side played by the human
    #[arg(long, value_enum, default_value = "o")]
    pub human: Side,

    /// AI search depth
    #[arg(short, long, default_value = "7")]
    pub depth: u32,

    /// Write every position to a transcript file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct SelfPlayArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// AI search depth
    #[arg(short, long, default_value = "7")]
    pub depth: u32,

    /// Write every position to a transcript file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Transcript file written by play or selfplay
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Human vs AI
pub fn run_play(args: PlayArgs) -> Result<()> {
    let position = args.position.resolve()?;
    let ai = AlphaBetaAI::new(args.depth);
    let human = Player::from(args.human);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let result = run_game(position, args.output, |board, forced, player| {
        if player == human {
            prompt_move(&mut input, board, forced, player)
        } else {
            let mv = ai.best_move(board, forced, player)?;
            println!("\nAI {} plays: {}", player.symbol(), mv);
            Ok(mv)
        }
    })?;

    announce(result);
    Ok(())
}

/// AI vs itself
pub fn run_selfplay(args: SelfPlayArgs) -> Result<()> {
    let position = args.position.resolve()?;
    let ai = AlphaBetaAI::new(args.depth);

    let result = run_game(position, args.output, |board, forced, player| {
        let mv = ai.best_move(board, forced, player)?;
        println!("\nAI {} plays: {}", player.symbol(), mv);
        Ok(mv)
    })?;

    announce(result);
    Ok(())
}

/// Print every position of a transcript
pub fn run_replay(args: ReplayArgs) -> Result<()> {
    let boards = transcript::load(&args.input)?;
    for (ply, board) in boards.iter().enumerate() {
        println!("Position {}", ply + 1);
        println!("{}", render::pretty(&render::annotate(board, None, None)));
    }
    match boards.last() {
        Some(board) => announce(board.result()),
        None => tracing::warn!("Transcript {} is empty", args.input.display()),
    }
    Ok(())
}

// ============================================================================
// GAME LOOP
// ============================================================================

/// Alternate moves from `choose` until the game ends
fn run_game<F>(start: Position, output: Option<PathBuf>, mut choose: F) -> Result<WinState>
where
    F: FnMut(&Board, usize, Player) -> Result<usize>,
{
    let mut transcript = Transcript::create(output.as_deref())?;
    let Position {
        mut board,
        mut forced,
        mut player,
    } = start;
    let mut last_move = None;

    loop {
        println!("{}", render::pretty(&render::annotate(&board, last_move, Some(forced))));
        transcript.record(&board)?;

        let result = board.result();
        if result.is_over() {
            if let Some(path) = transcript.path() {
                tracing::info!("Transcript saved to {}", path.display());
            }
            return Ok(result);
        }

        let mv = choose(&board, forced, player)?;
        board = board
            .try_apply_move(mv, player, forced)
            .with_context(|| format!("{} chose an illegal move", player.symbol()))?;
        tracing::debug!("{} -> {}", player.symbol(), mv);

        last_move = Some(mv);
        forced = mv % SUBBOARDS;
        player = player.opponent();
    }
}

/// Ask until the human enters a legal move
fn prompt_move<R: BufRead>(input: &mut R, board: &Board, forced: usize, player: Player) -> Result<usize> {
    loop {
        println!("\nMoves: {:?}", board.legal_moves(forced));
        print!("Player {}: ", player.symbol());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("Input closed");
        }
        match parse_move(&line, board, forced, player) {
            Ok(mv) => return Ok(mv),
            Err(e) => println!("Invalid move, try again ({})", e),
        }
    }
}

/// Validate a typed move against the current position
fn parse_move(line: &str, board: &Board, forced: usize, player: Player) -> Result<usize> {
    let mv: usize = line.trim().parse().context("not a number")?;
    board.try_apply_move(mv, player, forced)?;
    Ok(mv)
}

fn announce(result: WinState) {
    match result.winner() {
        Some(player) => println!("{} wins!", player.symbol()),
        None if result == WinState::Draw => println!("Draw!"),
        None => println!("Game unfinished"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let board = Board::empty().apply_move(40, Player::X);
        assert_eq!(parse_move("36\n", &board, 4, Player::O).unwrap(), 36);
        assert!(parse_move("40", &board, 4, Player::O).is_err());
        assert!(parse_move("0", &board, 4, Player::O).is_err());
        assert!(parse_move("abc", &board, 4, Player::O).is_err());
    }

    #[test]
    fn test_prompt_retries_until_legal() {
        let board = Board::empty();
        let mut input = io::Cursor::new("99\n3\n40\n");
        let mv = prompt_move(&mut input, &board, 4, Player::X).unwrap();
        assert_eq!(mv, 40);
    }

    #[test]
    fn test_prompt_input_closed() {
        let mut input = io::Cursor::new("");
        assert!(prompt_move(&mut input, &Board::empty(), 4, Player::X).is_err());
    }

    #[test]
    fn test_run_game_to_completion() {
        let start = Position {
            board: Board::empty(),
            forced: 4,
            player: Player::X,
        };
        let result = run_game(start, None, |board, forced, _| Ok(board.legal_moves(forced)[0])).unwrap();
        assert!(result.is_over());
    }
}
