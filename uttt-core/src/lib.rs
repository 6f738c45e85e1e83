//! UTTT Core - Ultimate Tic-Tac-Toe engine and AI
//!
//! This crate provides the core game logic:
//! - Bitboard geometry over the 81-cell super-board
//! - Line tables for sub-board and meta-board wins
//! - Board state, forced sub-board move generation and results
//! - Heuristic evaluation
//! - Negamax / negascout alpha-beta AI with a transposition table

pub mod board;
pub mod lines;
pub mod error;
pub mod game;
pub mod eval;
pub mod tt;
pub mod ai;

// Re-exports for convenient access
pub use board::{CELLS, SUBBOARDS};
pub use lines::{near_win_score, subboard_has_win};
pub use error::{ConfigError, EngineError, InputError, Result};
pub use game::{
    apply_move, check_draw, check_win, decode, encode, legal_moves, win_state, Board, Player,
    WinState,
};
pub use eval::{evaluate, evaluate_with, Weights, WIN_VALUE};
pub use tt::TranspositionTable;
pub use ai::{
    find_best_move, iterative_deepening, negamax, negascout, AlphaBetaAI, SearchReport,
    SearchResult,
};
