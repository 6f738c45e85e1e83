//! CPU-based Alpha-Beta AI

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::{self, SUBBOARDS};
use crate::error::{ConfigError, EngineError, InputError, Result};
use crate::eval::{evaluate_with, Weights};
use crate::game::{Board, Player};
use crate::lines::near_win_score;
use crate::tt::{Bound, TableEntry, TableKey, TranspositionTable};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Window bound larger than any evaluation
pub const INFINITY: i64 = 100_000_000_000;

/// Deepest meaningful search (one ply per cell)
pub const MAX_DEPTH: u32 = 81;

/// Value and move returned by a search node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub value: i64,
    pub best_move: Option<usize>,
}

impl SearchResult {
    fn leaf(value: i64) -> Self {
        Self {
            value,
            best_move: None,
        }
    }
}

/// Outcome of an iterative-deepening run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchReport {
    pub best_move: usize,
    pub value: i64,
    /// Deepest fully completed iteration
    pub depth: u32,
    pub nodes: u64,
    pub table_entries: usize,
    pub table_hits: u64,
    pub elapsed: Duration,
}

fn invariant_violation(board: &Board, forced: usize) -> EngineError {
    EngineError::InvariantViolation {
        board: board.decode(),
        forced,
    }
}

// ============================================================================
// PLAIN NEGAMAX
// ============================================================================

/// Negamax with alpha-beta pruning, moves in ascending cell order
pub fn negamax(
    board: &Board,
    forced: usize,
    player: Player,
    depth: u32,
    alpha: i64,
    beta: i64,
) -> Result<SearchResult> {
    negamax_with(board, forced, player, depth, alpha, beta, &Weights::default())
}

pub fn negamax_with(
    board: &Board,
    forced: usize,
    player: Player,
    depth: u32,
    mut alpha: i64,
    beta: i64,
    weights: &Weights,
) -> Result<SearchResult> {
    if depth == 0 || board.is_terminal() {
        return Ok(SearchResult::leaf(evaluate_with(board, player, weights)));
    }

    let moves = board.legal_move_mask(forced);
    if moves == 0 {
        return Err(invariant_violation(board, forced));
    }

    let mut best = SearchResult::leaf(-INFINITY);
    for mv in board::cells(moves) {
        let child = board.apply_move(mv, player);
        let score = -negamax_with(
            &child,
            board::forced_by(mv),
            player.opponent(),
            depth - 1,
            -beta,
            -alpha,
            weights,
        )?
        .value;

        if score > best.value {
            best = SearchResult {
                value: score,
                best_move: Some(mv),
            };
        }
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }

    Ok(best)
}

// ============================================================================
// NEGASCOUT WITH TRANSPOSITION TABLE
// ============================================================================

/// Per-run search context
struct Searcher<'a> {
    table: &'a mut TranspositionTable,
    weights: &'a Weights,
    stop: Option<&'a AtomicBool>,
    nodes: u64,
}

impl<'a> Searcher<'a> {
    fn negascout(
        &mut self,
        board: &Board,
        forced: usize,
        player: Player,
        depth: u32,
        alpha: i64,
        beta: i64,
    ) -> Result<SearchResult> {
        if self.stop.is_some_and(|s| s.load(Ordering::Relaxed)) {
            return Err(EngineError::Cancelled);
        }
        self.nodes += 1;

        let key = TableKey::new(*board, forced);
        if let Some((value, best_move)) = self.table.probe(&key, depth, alpha, beta) {
            return Ok(SearchResult { value, best_move });
        }

        if depth == 0 || board.is_terminal() {
            let value = evaluate_with(board, player, self.weights);
            self.table.store(
                key,
                TableEntry {
                    depth,
                    value,
                    bound: Bound::Exact,
                    best_move: None,
                },
            );
            return Ok(SearchResult::leaf(value));
        }

        let moves = board.legal_move_mask(forced);
        if moves == 0 {
            return Err(invariant_violation(board, forced));
        }
        let ordered = self.order_moves(board, moves, player);

        let mut best = SearchResult::leaf(-INFINITY);
        let mut alp = alpha;

        for (i, &mv) in ordered.iter().enumerate() {
            let child = board.apply_move(mv, player);
            let next = board::forced_by(mv);
            let opponent = player.opponent();

            let score = if i == 0 {
                -self.negascout(&child, next, opponent, depth - 1, -beta, -alp)?.value
            } else {
                // Null-window probe; re-search only if it lands inside the window
                let probe = -self
                    .negascout(&child, next, opponent, depth - 1, -alp - 1, -alp)?
                    .value;
                if alp < probe && probe < beta {
                    -self.negascout(&child, next, opponent, depth - 1, -beta, -alp)?.value
                } else {
                    probe
                }
            };

            if score > best.value {
                best = SearchResult {
                    value: score,
                    best_move: Some(mv),
                };
            }
            alp = alp.max(score);
            if alp >= beta {
                break;
            }
        }

        let bound = if best.value <= alpha {
            Bound::Upper
        } else if best.value >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.table.store(
            key,
            TableEntry {
                depth,
                value: best.value,
                bound,
                best_move: best.best_move,
            },
        );

        Ok(best)
    }

    /// Order moves best-first.
    ///
    /// Children already in the table use their negated cached value; others
    /// use the mover's near-win balance in the sub-board the move lands in.
    /// Ties keep ascending cell order.
    fn order_moves(&self, board: &Board, moves: u128, player: Player) -> Vec<usize> {
        let mut scored: Vec<(i64, usize)> = board::cells(moves)
            .map(|mv| {
                let child = board.apply_move(mv, player);
                let key = TableKey::new(child, board::forced_by(mv));
                let score = match self.table.get(&key) {
                    Some(entry) => -entry.value,
                    None => {
                        let (x, o) = child.subboard(board::subboard_of(mv));
                        near_win_score(x, o) as i64 * player.sign()
                    }
                };
                (score, mv)
            })
            .collect();

        scored.sort_by_key(|&(score, _)| Reverse(score));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }
}

/// Negascout at a fixed depth with a caller-owned table and default weights
pub fn negascout(
    board: &Board,
    forced: usize,
    player: Player,
    depth: u32,
    alpha: i64,
    beta: i64,
    table: &mut TranspositionTable,
) -> Result<SearchResult> {
    let weights = Weights::default();
    let mut searcher = Searcher {
        table,
        weights: &weights,
        stop: None,
        nodes: 0,
    };
    searcher.negascout(board, forced, player, depth, alpha, beta)
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Iterative deepening to `depth` with default settings
pub fn iterative_deepening(
    board: &Board,
    forced: usize,
    player: Player,
    depth: u32,
) -> Result<SearchReport> {
    AlphaBetaAI::new(depth).analyze(board, forced, player)
}

/// Best move for `player` searching `depth` plies
pub fn find_best_move(board: &Board, forced: usize, player: Player, depth: u32) -> Result<usize> {
    iterative_deepening(board, forced, player, depth).map(|report| report.best_move)
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-Beta AI player
#[derive(Clone, Debug)]
pub struct AlphaBetaAI {
    pub depth: u32,
    pub weights: Weights,
    /// Checked between iterations, never inside one
    pub time_limit: Option<Duration>,
    /// Maximum transposition table entries (None = unbounded)
    pub table_limit: Option<usize>,
    stop: Option<Arc<AtomicBool>>,
}

impl AlphaBetaAI {
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            weights: Weights::default(),
            time_limit: None,
            table_limit: None,
            stop: None,
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_table_limit(mut self, entries: usize) -> Self {
        self.table_limit = Some(entries);
        self
    }

    /// Share a flag that, once set, stops the search at the next node
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn validate(&self, board: &Board, forced: usize) -> Result<()> {
        if self.depth == 0 {
            return Err(ConfigError::ZeroDepth.into());
        }
        if self.depth > MAX_DEPTH {
            return Err(ConfigError::DepthTooLarge(self.depth).into());
        }
        if forced >= SUBBOARDS {
            return Err(InputError::SubboardOutOfRange(forced).into());
        }
        if board.is_terminal() {
            return Err(InputError::GameOver.into());
        }
        Ok(())
    }

    /// Get best move for current position
    pub fn best_move(&self, board: &Board, forced: usize, player: Player) -> Result<usize> {
        self.analyze(board, forced, player).map(|report| report.best_move)
    }

    /// Run iterative deepening and report the deepest completed iteration
    pub fn analyze(&self, board: &Board, forced: usize, player: Player) -> Result<SearchReport> {
        self.validate(board, forced)?;

        let mut table = match self.table_limit {
            Some(limit) => TranspositionTable::with_limit(limit),
            None => TranspositionTable::new(),
        };
        let start = Instant::now();
        let mut searcher = Searcher {
            table: &mut table,
            weights: &self.weights,
            stop: self.stop.as_deref(),
            nodes: 0,
        };
        let mut completed: Option<SearchReport> = None;

        for depth in 1..=self.depth {
            let result = match searcher.negascout(board, forced, player, depth, -INFINITY, INFINITY) {
                Ok(result) => result,
                Err(EngineError::Cancelled) => {
                    tracing::info!("Search stopped during depth {}", depth);
                    break;
                }
                Err(e) => return Err(e),
            };
            let best_move = result
                .best_move
                .ok_or_else(|| invariant_violation(board, forced))?;

            tracing::debug!(
                "depth={} value={} move={} nodes={} table={}",
                depth,
                result.value,
                best_move,
                searcher.nodes,
                searcher.table.len()
            );

            completed = Some(SearchReport {
                best_move,
                value: result.value,
                depth,
                nodes: searcher.nodes,
                table_entries: searcher.table.len(),
                table_hits: searcher.table.hits(),
                elapsed: start.elapsed(),
            });

            if let Some(limit) = self.time_limit {
                if depth < self.depth && start.elapsed() >= limit {
                    tracing::info!("Time limit reached after depth {}", depth);
                    break;
                }
            }
        }

        completed.ok_or(EngineError::Cancelled)
    }

    /// Play both sides until the game ends
    pub fn play_game(
        &self,
        initial: Board,
        forced: usize,
        player: Player,
    ) -> Result<(Board, Vec<usize>)> {
        let mut board = initial;
        let mut forced = forced;
        let mut player = player;
        let mut history = Vec::new();

        while !board.is_terminal() {
            let mv = self.best_move(&board, forced, player)?;
            board = board.apply_move(mv, player);
            history.push(mv);
            forced = board::forced_by(mv);
            player = player.opponent();
        }

        Ok((board, history))
    }

    /// Evaluate a position
    pub fn evaluate(&self, board: &Board, player: Player) -> i64 {
        evaluate_with(board, player, &self.weights)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::WinState;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn board_with(x: &[usize], o: &[usize]) -> Board {
        let mut chars = vec!['.'; 81];
        for &i in x {
            chars[i] = 'X';
        }
        for &i in o {
            chars[i] = 'O';
        }
        Board::encode(&chars.into_iter().collect::<String>()).unwrap()
    }

    /// Random playout of `plies` moves from the empty board
    fn random_position(rng: &mut ChaCha8Rng, plies: usize) -> (Board, usize, Player) {
        let mut board = Board::empty();
        let mut forced = 4;
        let mut player = Player::X;
        for _ in 0..plies {
            if board.is_terminal() {
                break;
            }
            let moves = board.legal_moves(forced);
            let mv = *moves.choose(rng).unwrap();
            board = board.apply_move(mv, player);
            forced = board::forced_by(mv);
            player = player.opponent();
        }
        (board, forced, player)
    }

    /// X owns sub-boards 0 and 1; cell 20 completes sub-board 2 and the top row
    fn meta_win_in_one() -> Board {
        board_with(&[0, 1, 2, 9, 10, 11, 18, 19, 30], &[3, 4, 12, 13, 21, 31, 50])
    }

    #[test]
    fn test_empty_board_depth_one() {
        let mv = find_best_move(&Board::empty(), 4, Player::X, 1).unwrap();
        assert!(mv < 81);
        assert!(Board::empty().legal_moves(4).contains(&mv));
    }

    #[test]
    fn test_takes_subboard_win() {
        let board = board_with(&[36, 37], &[]);
        for depth in 1..=4 {
            assert_eq!(find_best_move(&board, 4, Player::X, depth).unwrap(), 38, "depth {}", depth);
        }
    }

    #[test]
    fn test_takes_meta_win() {
        let board = meta_win_in_one();
        assert_eq!(board.result(), WinState::Ongoing);
        for depth in 1..=4 {
            assert_eq!(find_best_move(&board, 2, Player::X, depth).unwrap(), 20, "depth {}", depth);
        }
        let plain = negamax(&board, 2, Player::X, 2, -INFINITY, INFINITY).unwrap();
        assert_eq!(plain.best_move, Some(20));
        assert_eq!(plain.value, crate::eval::WIN_VALUE);
    }

    #[test]
    fn test_negascout_matches_negamax() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for plies in [0, 5, 12, 20, 30] {
            let (board, forced, player) = random_position(&mut rng, plies);
            if board.is_terminal() {
                continue;
            }
            for depth in 1..=3 {
                let plain = negamax(&board, forced, player, depth, -INFINITY, INFINITY).unwrap();
                let mut table = TranspositionTable::new();
                let scout =
                    negascout(&board, forced, player, depth, -INFINITY, INFINITY, &mut table).unwrap();
                assert_eq!(scout.value, plain.value, "plies {} depth {}", plies, depth);

                let report = iterative_deepening(&board, forced, player, depth).unwrap();
                assert_eq!(report.value, plain.value, "plies {} depth {}", plies, depth);
                assert_eq!(report.depth, depth);
            }
        }
    }

    #[test]
    fn test_configuration_errors() {
        let board = Board::empty();
        assert_eq!(
            find_best_move(&board, 4, Player::X, 0),
            Err(EngineError::Configuration(ConfigError::ZeroDepth))
        );
        assert_eq!(
            find_best_move(&board, 4, Player::X, 82),
            Err(EngineError::Configuration(ConfigError::DepthTooLarge(82)))
        );
        assert_eq!(
            find_best_move(&board, 9, Player::X, 1),
            Err(EngineError::InvalidInput(InputError::SubboardOutOfRange(9)))
        );
    }

    #[test]
    fn test_finished_game_rejected() {
        let board = board_with(&[0, 1, 2, 36, 40, 44, 72, 73, 74], &[]);
        assert_eq!(
            find_best_move(&board, 0, Player::O, 3),
            Err(EngineError::InvalidInput(InputError::GameOver))
        );
    }

    #[test]
    fn test_stop_flag_cancels() {
        let stop = Arc::new(AtomicBool::new(true));
        let ai = AlphaBetaAI::new(4).with_stop_flag(stop);
        assert_eq!(
            ai.best_move(&Board::empty(), 4, Player::X),
            Err(EngineError::Cancelled)
        );
    }

    #[test]
    fn test_time_limit_keeps_completed_iteration() {
        let ai = AlphaBetaAI::new(6).with_time_limit(Duration::ZERO);
        let report = ai.analyze(&Board::empty(), 4, Player::X).unwrap();
        assert_eq!(report.depth, 1);
        assert!((36..45).contains(&report.best_move));
    }

    #[test]
    fn test_bounded_table() {
        let ai = AlphaBetaAI::new(3).with_table_limit(32);
        let report = ai.analyze(&Board::empty(), 0, Player::O).unwrap();
        assert!(report.table_entries <= 32);
        assert!(report.best_move < 9);
    }

    #[test]
    fn test_play_game() {
        let ai = AlphaBetaAI::new(1);
        let (final_board, history) = ai.play_game(Board::empty(), 4, Player::X).unwrap();

        assert!(final_board.is_terminal());
        assert!(!history.is_empty());

        // Replay through the validating entry point
        let mut board = Board::empty();
        let mut forced = 4;
        let mut player = Player::X;
        for &mv in &history {
            board = board.try_apply_move(mv, player, forced).unwrap();
            forced = board::forced_by(mv);
            player = player.opponent();
        }
        assert_eq!(board, final_board);
    }
}
