//! Starting position arguments shared by several commands

use anyhow::{bail, Context, Result};
use clap::Args;

use uttt_core::{Board, Player, CELLS, SUBBOARDS};

#[derive(Args, Clone, Debug)]
pub struct PositionArgs {
    /// Board as 81 characters of X, O and '.' or '-' (empty board if omitted)
    pub board: Option<String>,

    /// The previous move; its cell position selects the forced sub-board
    #[arg(default_value = "40")]
    pub premove: usize,
}

/// Resolved starting position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub forced: usize,
    pub player: Player,
}

impl PositionArgs {
    pub fn resolve(&self) -> Result<Position> {
        let board = match &self.board {
            Some(s) => parse_board(s)?,
            None => Board::empty(),
        };
        if self.premove >= CELLS {
            bail!("premove {} is out of range (0..{})", self.premove, CELLS);
        }
        Ok(Position {
            board,
            forced: self.premove % SUBBOARDS,
            player: side_to_move(&board, self.premove),
        })
    }
}

/// Parse a board string, accepting '-' as an empty cell
pub fn parse_board(s: &str) -> Result<Board> {
    let normalized: String = s.trim().chars().map(|c| if c == '-' { '.' } else { c }).collect();
    normalized
        .parse::<Board>()
        .with_context(|| format!("Failed to parse board: {}", s))
}

/// The opponent of whoever played `premove`; by stone count when it is empty
fn side_to_move(board: &Board, premove: usize) -> Player {
    match board.cell(premove) {
        Some(last) => last.opponent(),
        None if board.x_stones().count_ones() > board.o_stones().count_ones() => Player::O,
        None => Player::X,
    }
}
