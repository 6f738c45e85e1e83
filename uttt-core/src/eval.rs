//! Position evaluation

use crate::board::SUBBOARDS;
use crate::game::{Board, Player};
use crate::lines::near_win_score;
use serde::{Deserialize, Serialize};

/// Score of a decided game (dominates every heuristic term)
pub const WIN_VALUE: i64 = 100_000_000;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weights {
    /// Per sub-board owned
    pub subboard_win: i64,
    /// Per open two-in-a-line inside an undecided sub-board
    pub subboard_near_win: i64,
    /// Per open two-in-a-line of won sub-boards on the meta board
    pub overall_near_win: i64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            subboard_win: 100,
            subboard_near_win: 5,
            overall_near_win: 200,
        }
    }
}

/// Evaluate from `player`'s perspective with default weights
pub fn evaluate(board: &Board, player: Player) -> i64 {
    evaluate_with(board, player, &Weights::default())
}

/// Evaluate from `player`'s perspective.
///
/// The raw score is X-positive; multiplying by the mover's sign gives the
/// negamax convention.
pub fn evaluate_with(board: &Board, player: Player, weights: &Weights) -> i64 {
    if let Some(winner) = board.winner() {
        return player.sign() * WIN_VALUE * winner.sign();
    }

    let mut score = 0i64;
    for s in 0..SUBBOARDS {
        let bit = crate::board::nine_bit(s);
        if board.x_won() & bit != 0 {
            score += weights.subboard_win;
        } else if board.o_won() & bit != 0 {
            score -= weights.subboard_win;
        } else {
            let (x, o) = board.subboard(s);
            score += near_win_score(x, o) as i64 * weights.subboard_near_win;
        }
    }

    score += near_win_score(board.x_won(), board.o_won()) as i64 * weights.overall_near_win;

    score * player.sign()
}
