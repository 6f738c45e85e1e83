//! Random command - play the AI against a uniformly random opponent
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use uttt_core::{AlphaBetaAI, Board, Player, WinState, SUBBOARDS};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct RandomArgs {
    /// Number of games to play (AI alternates X and O)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// AI search depth
    #[arg(long, default_value = "4")]
    pub depth: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    ai_side: Player,
    result: WinState,
    moves: Vec<usize>,
}

impl GameRecord {
    fn ai_won(&self) -> bool {
        self.result.winner() == Some(self.ai_side)
    }

    fn random_won(&self) -> bool {
        self.result.winner() == Some(self.ai_side.opponent())
    }
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    ai_wins: usize,
    random_wins: usize,
    draws: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run random command
pub fn run(args: RandomArgs, seed: Option<u64>) -> Result<()> {
    let base_seed = seed.unwrap_or_else(rand::random);

    tracing::info!(
        "Starting match: AI (depth={}) vs random, {} games, seed={}",
        args.depth,
        args.games,
        base_seed
    );

    let results = play_match(&args, base_seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in parallel, one seeded RNG per game
fn play_match(args: &RandomArgs, base_seed: u64) -> Result<MatchResults> {
    let ai = AlphaBetaAI::new(args.depth);

    let games = (0..args.games)
        .into_par_iter()
        .map(|game_num| -> Result<GameRecord> {
            // Alternate colors for fairness
            let ai_side = if game_num % 2 == 0 { Player::X } else { Player::O };
            let mut rng = create_rng(base_seed.wrapping_add(game_num as u64));
            let record = play_single_game(&ai, ai_side, game_num + 1, &mut rng)?;

            tracing::info!(
                "Game {}: AI as {:?} -> {:?} ({} moves)",
                record.game_number,
                record.ai_side,
                record.result,
                record.moves.len()
            );
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(compute_match_statistics(games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &RandomArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game from the empty board, X first in the centre sub-board
fn play_single_game(
    ai: &AlphaBetaAI,
    ai_side: Player,
    game_number: usize,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut board = Board::empty();
    let mut forced = 4;
    let mut player = Player::X;
    let mut moves = Vec::new();

    while !board.is_terminal() {
        let mv = if player == ai_side {
            ai.best_move(&board, forced, player)?
        } else {
            *board
                .legal_moves(forced)
                .choose(rng)
                .ok_or_else(|| anyhow::anyhow!("No legal moves for random player"))?
        };
        board = board.apply_move(mv, player);
        moves.push(mv);
        forced = mv % SUBBOARDS;
        player = player.opponent();
    }

    Ok(GameRecord {
        game_number,
        ai_side,
        result: board.result(),
        moves,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let ai_wins = games.iter().filter(|g| g.ai_won()).count();
    let random_wins = games.iter().filter(|g| g.random_won()).count();
    let draws = games
        .iter()
        .filter(|g| g.result == WinState::Draw)
        .count();

    let total_moves: usize = games.iter().map(|g| g.moves.len()).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        games,
        ai_wins,
        random_wins,
        draws,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        ai_side: Player,
        result: WinState,
        moves: Vec<usize>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        ai_wins: usize,
        random_wins: usize,
        draws: usize,
        avg_moves: f32,
        ai_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        total_games: total,
        ai_wins: results.ai_wins,
        random_wins: results.random_wins,
        draws: results.draws,
        avg_moves: results.avg_moves,
        ai_win_rate: percent(results.ai_wins, total) / 100.0,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                ai_side: g.ai_side,
                result: g.result,
                moves: g.moves.clone(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!("AI wins:     {} ({:.1}%)", results.ai_wins, percent(results.ai_wins, total));
    println!("Random wins: {} ({:.1}%)", results.random_wins, percent(results.random_wins, total));
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: AI as {:?}, {:?} in {} moves",
            game.game_number,
            game.ai_side,
            game.result,
            game.moves.len()
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game_number: usize, ai_side: Player, result: WinState, moves: usize) -> GameRecord {
        GameRecord {
            game_number,
            ai_side,
            result,
            moves: vec![40; moves],
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.ai_wins, 0);
        assert_eq!(results.random_wins, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_moves, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(1, Player::X, WinState::XWins, 20),
            record(2, Player::O, WinState::XWins, 30),
            record(3, Player::X, WinState::Draw, 40),
            record(4, Player::O, WinState::OWins, 50),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.ai_wins, 2);
        assert_eq!(results.random_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_moves, 35.0);
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(42);

        use rand::Rng;
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }

    #[test]
    fn test_single_game_finishes() {
        let ai = AlphaBetaAI::new(1);
        let mut rng = create_rng(3);
        let record = play_single_game(&ai, Player::O, 1, &mut rng).unwrap();
        assert!(record.result.is_over());
        assert!(!record.moves.is_empty());
    }

    #[test]
    fn test_play_match_seeded() {
        let args = RandomArgs {
            games: 2,
            depth: 1,
            json: false,
        };
        let a = play_match(&args, 11).unwrap();
        let b = play_match(&args, 11).unwrap();
        assert_eq!(a.games.len(), 2);
        let moves_a: Vec<_> = a.games.iter().map(|g| g.moves.clone()).collect();
        let moves_b: Vec<_> = b.games.iter().map(|g| g.moves.clone()).collect();
        assert_eq!(moves_a, moves_b);
    }
}
