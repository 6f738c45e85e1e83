//! Board state, move generation and game result

use std::fmt;
use std::str::FromStr;

use crate::board::{
    self, BOARD_MASK, CELLS, SUBBOARDS, SUBBOARD_FULL, SUBBOARD_MASKS,
};
use crate::error::{EngineError, InputError, Result};
use crate::lines::subboard_has_win;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Side to move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Negamax token: +1 for X, -1 for O
    pub fn sign(self) -> i64 {
        match self {
            Player::X => 1,
            Player::O => -1,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinState {
    Ongoing,
    XWins,
    OWins,
    Draw,
}

impl WinState {
    pub fn is_over(self) -> bool {
        self != WinState::Ongoing
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            WinState::XWins => Some(Player::X),
            WinState::OWins => Some(Player::O),
            WinState::Ongoing | WinState::Draw => None,
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Super-board value (copy to mutate)
///
/// `x_won`/`o_won` cache which sub-boards each side owns and always equal a
/// recomputation from the stone masks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    x_stones: u128,
    o_stones: u128,
    x_won: u16,
    o_won: u16,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub const fn empty() -> Self {
        Self {
            x_stones: 0,
            o_stones: 0,
            x_won: 0,
            o_won: 0,
        }
    }

    /// Build from raw stone masks, recomputing won sub-boards from scratch
    pub fn from_stones(x_stones: u128, o_stones: u128) -> Self {
        let x_stones = x_stones & BOARD_MASK;
        let o_stones = o_stones & BOARD_MASK;
        let mut x_won = 0;
        let mut o_won = 0;
        for s in 0..SUBBOARDS {
            if subboard_has_win(board::subboard(x_stones, s)) {
                x_won |= board::nine_bit(s);
            }
            if subboard_has_win(board::subboard(o_stones, s)) {
                o_won |= board::nine_bit(s);
            }
        }
        Self {
            x_stones,
            o_stones,
            x_won,
            o_won,
        }
    }

    /// Parse 81 characters over `X`, `O` and `.`, cell `i` at position `i`
    pub fn encode(s: &str) -> Result<Self> {
        let len = s.chars().count();
        if len != CELLS {
            return Err(InputError::BoardLength(len).into());
        }
        let mut x_stones = 0;
        let mut o_stones = 0;
        for (index, ch) in s.chars().enumerate() {
            match ch {
                'X' => x_stones = board::place(x_stones, index),
                'O' => o_stones = board::place(o_stones, index),
                '.' => {}
                _ => return Err(InputError::BoardChar { index, ch }.into()),
            }
        }
        Ok(Self::from_stones(x_stones, o_stones))
    }

    /// Inverse of [`Board::encode`]
    pub fn decode(&self) -> String {
        (0..CELLS)
            .map(|i| self.cell(i).map_or('.', Player::symbol))
            .collect()
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn x_stones(&self) -> u128 {
        self.x_stones
    }

    pub fn o_stones(&self) -> u128 {
        self.o_stones
    }

    pub fn x_won(&self) -> u16 {
        self.x_won
    }

    pub fn o_won(&self) -> u16 {
        self.o_won
    }

    pub fn stones(&self, player: Player) -> u128 {
        match player {
            Player::X => self.x_stones,
            Player::O => self.o_stones,
        }
    }

    pub fn won(&self, player: Player) -> u16 {
        match player {
            Player::X => self.x_won,
            Player::O => self.o_won,
        }
    }

    pub fn occupied(&self) -> u128 {
        self.x_stones | self.o_stones
    }

    pub fn stone_count(&self) -> u32 {
        self.occupied().count_ones()
    }

    /// Owner of a cell, if any
    pub fn cell(&self, index: usize) -> Option<Player> {
        if board::get(self.x_stones, index) {
            Some(Player::X)
        } else if board::get(self.o_stones, index) {
            Some(Player::O)
        } else {
            None
        }
    }

    /// (X, O) 9-bit masks of one sub-board
    pub fn subboard(&self, subboard: usize) -> (u16, u16) {
        (
            board::subboard(self.x_stones, subboard),
            board::subboard(self.o_stones, subboard),
        )
    }

    pub fn is_subboard_won(&self, subboard: usize) -> bool {
        (self.x_won | self.o_won) & board::nine_bit(subboard) != 0
    }

    pub fn is_subboard_full(&self, subboard: usize) -> bool {
        let (x, o) = self.subboard(subboard);
        x | o == SUBBOARD_FULL
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Place a stone, updating only the affected sub-board's won bit.
    ///
    /// The cell must be empty and legal; see [`Board::try_apply_move`].
    pub fn apply_move(&self, cell: usize, player: Player) -> Self {
        debug_assert!(!board::get(self.occupied(), cell), "cell {} occupied", cell);
        let mut next = *self;
        let sub = board::subboard_of(cell);
        let (stones, won) = match player {
            Player::X => (&mut next.x_stones, &mut next.x_won),
            Player::O => (&mut next.o_stones, &mut next.o_won),
        };
        *stones = board::place(*stones, cell);
        if subboard_has_win(board::subboard(*stones, sub)) {
            *won |= board::nine_bit(sub);
        }
        next
    }

    /// Validate a caller-supplied move, then apply it
    pub fn try_apply_move(&self, cell: usize, player: Player, forced: usize) -> Result<Self> {
        if forced >= SUBBOARDS {
            return Err(InputError::SubboardOutOfRange(forced).into());
        }
        if cell >= CELLS {
            return Err(InputError::CellOutOfRange(cell).into());
        }
        if self.is_terminal() {
            return Err(InputError::GameOver.into());
        }
        if board::get(self.occupied(), cell) {
            return Err(InputError::Occupied(cell).into());
        }
        if !board::get(self.legal_move_mask(forced), cell) {
            return Err(InputError::NotLegal { cell, forced }.into());
        }
        Ok(self.apply_move(cell, player))
    }

    /// Legal cells as an 81-bit mask.
    ///
    /// Play is free (any empty cell of an unwon sub-board) when the forced
    /// sub-board is won or full; otherwise restricted to the forced one.
    pub fn legal_move_mask(&self, forced: usize) -> u128 {
        let empty = !self.occupied() & BOARD_MASK;
        if self.is_subboard_won(forced) || self.is_subboard_full(forced) {
            let won = self.x_won | self.o_won;
            let open = (0..SUBBOARDS)
                .filter(|&s| won & board::nine_bit(s) == 0)
                .fold(0u128, |acc, s| acc | SUBBOARD_MASKS[s]);
            empty & open
        } else {
            empty & SUBBOARD_MASKS[forced]
        }
    }

    /// Legal cells in ascending order
    pub fn legal_moves(&self, forced: usize) -> Vec<usize> {
        board::cells(self.legal_move_mask(forced)).collect()
    }

    // ========================================================================
    // RESULT
    // ========================================================================

    /// Meta-level three-in-a-row, X checked first
    pub fn winner(&self) -> Option<Player> {
        if subboard_has_win(self.x_won) {
            Some(Player::X)
        } else if subboard_has_win(self.o_won) {
            Some(Player::O)
        } else {
            None
        }
    }

    /// No winner and every sub-board is won or full
    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
            && (0..SUBBOARDS).all(|s| self.is_subboard_won(s) || self.is_subboard_full(s))
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_draw()
    }

    pub fn result(&self) -> WinState {
        match self.winner() {
            Some(Player::X) => WinState::XWins,
            Some(Player::O) => WinState::OWins,
            None if self.is_draw() => WinState::Draw,
            None => WinState::Ongoing,
        }
    }
}

impl FromStr for Board {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Board::encode(s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decode())
    }
}

// ============================================================================
// FREE FUNCTIONS
// ============================================================================

pub fn encode(s: &str) -> Result<Board> {
    Board::encode(s)
}

pub fn decode(board: &Board) -> String {
    board.decode()
}

pub fn apply_move(board: &Board, cell: usize, player: Player) -> Board {
    board.apply_move(cell, player)
}

pub fn legal_moves(board: &Board, forced: usize) -> Vec<usize> {
    board.legal_moves(forced)
}

pub fn check_win(board: &Board) -> Option<Player> {
    board.winner()
}

pub fn check_draw(board: &Board) -> bool {
    board.is_draw()
}

pub fn win_state(board: &Board) -> WinState {
    board.result()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Board string with the given cells set
    fn board_with(x: &[usize], o: &[usize]) -> Board {
        let mut chars = vec!['.'; CELLS];
        for &i in x {
            chars[i] = 'X';
        }
        for &i in o {
            chars[i] = 'O';
        }
        Board::encode(&chars.into_iter().collect::<String>()).unwrap()
    }

    #[test]
    fn test_empty_board() {
        let b = Board::empty();
        assert_eq!(b.result(), WinState::Ongoing);
        assert_eq!(b.legal_moves(4), (36..45).collect::<Vec<_>>());
        assert_eq!(b.decode(), ".".repeat(81));
    }

    #[test]
    fn test_encode_decode() {
        let s = format!("XO.{}", ".".repeat(75) + "OOX");
        let b = Board::encode(&s).unwrap();
        assert_eq!(b.cell(0), Some(Player::X));
        assert_eq!(b.cell(1), Some(Player::O));
        assert_eq!(b.cell(2), None);
        assert_eq!(b.cell(80), Some(Player::X));
        assert_eq!(b.decode(), s);
        assert_eq!(b.to_string().parse::<Board>().unwrap(), b);
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        assert_eq!(
            Board::encode("XO"),
            Err(EngineError::InvalidInput(InputError::BoardLength(2)))
        );
        let bad = format!("{}x", ".".repeat(80));
        assert_eq!(
            Board::encode(&bad),
            Err(EngineError::InvalidInput(InputError::BoardChar { index: 80, ch: 'x' }))
        );
    }

    #[test]
    fn test_encode_recomputes_won_subboards() {
        let b = board_with(&[0, 1, 2], &[9, 13, 17]);
        assert_eq!(b.x_won(), 0b100_000_000);
        assert_eq!(b.o_won(), 0b010_000_000);
    }

    #[test]
    fn test_apply_move_updates_won_bit() {
        let b = board_with(&[36, 37], &[]);
        assert!(!b.is_subboard_won(4));
        let after = b.apply_move(38, Player::X);
        assert!(after.is_subboard_won(4));
        assert_eq!(after.x_won(), board::nine_bit(4));
        assert_eq!(after, Board::from_stones(after.x_stones(), after.o_stones()));
        // Original value untouched
        assert!(!b.is_subboard_won(4));
    }

    #[test]
    fn test_forced_subboard_moves() {
        let b = board_with(&[40], &[]);
        // X played 40 (center of center), O is sent to sub-board 4
        assert_eq!(b.legal_moves(4), vec![36, 37, 38, 39, 41, 42, 43, 44]);
    }

    #[test]
    fn test_free_move_when_forced_subboard_won() {
        let b = board_with(&[0, 1, 2], &[]);
        let moves = b.legal_moves(0);
        assert_eq!(moves.len(), 81 - 9);
        assert!(moves.iter().all(|&m| m >= 9));
    }

    #[test]
    fn test_free_move_when_forced_subboard_full() {
        // X O X / X O O / O X X fills sub-board 0 without a line
        let b = board_with(&[0, 2, 3, 7, 8], &[1, 4, 5, 6]);
        assert!(b.is_subboard_full(0));
        assert!(!b.is_subboard_won(0));
        let moves = b.legal_moves(0);
        assert_eq!(moves.len(), 72);
        assert_eq!(moves[0], 9);
    }

    #[test]
    fn test_try_apply_move_validation() {
        let b = board_with(&[40], &[]);
        assert_eq!(
            b.try_apply_move(81, Player::O, 4),
            Err(InputError::CellOutOfRange(81).into())
        );
        assert_eq!(
            b.try_apply_move(40, Player::O, 4),
            Err(InputError::Occupied(40).into())
        );
        assert_eq!(
            b.try_apply_move(0, Player::O, 4),
            Err(InputError::NotLegal { cell: 0, forced: 4 }.into())
        );
        assert_eq!(
            b.try_apply_move(36, Player::O, 9),
            Err(InputError::SubboardOutOfRange(9).into())
        );
        assert!(b.try_apply_move(36, Player::O, 4).is_ok());
    }

    #[test]
    fn test_meta_win() {
        // X owns sub-boards 0, 4, 8 (main diagonal)
        let b = board_with(&[0, 1, 2, 36, 40, 44, 72, 73, 74], &[]);
        assert_eq!(b.winner(), Some(Player::X));
        assert_eq!(b.result(), WinState::XWins);
        assert!(!b.is_draw());
        assert_eq!(
            b.try_apply_move(10, Player::O, 1),
            Err(InputError::GameOver.into())
        );
    }

    #[test]
    fn test_draw_all_resolved() {
        // Alternate ownership so no meta line forms: X O X / X O O / O X X
        let owners = [Player::X, Player::O, Player::X, Player::X, Player::O, Player::O, Player::O, Player::X, Player::X];
        let mut x = Vec::new();
        let mut o = Vec::new();
        for (s, owner) in owners.iter().enumerate() {
            let row: Vec<usize> = (0..3).map(|p| s * 9 + p).collect();
            match owner {
                Player::X => x.extend(row),
                Player::O => o.extend(row),
            }
        }
        let b = board_with(&x, &o);
        assert_eq!(b.winner(), None);
        assert!(b.is_draw());
        assert_eq!(b.result(), WinState::Draw);
    }

    #[test]
    fn test_free_functions() {
        let b = encode(&".".repeat(81)).unwrap();
        let b = apply_move(&b, 40, Player::X);
        assert_eq!(legal_moves(&b, 4).len(), 8);
        assert_eq!(win_state(&b), WinState::Ongoing);
        assert_eq!(check_win(&b), None);
        assert!(!check_draw(&b));
        assert_eq!(decode(&b).chars().nth(40), Some('X'));
    }

    #[test]
    fn test_player_serde() {
        let json = serde_json::to_string(&Player::O).unwrap();
        assert_eq!(json, "\"O\"");
        let back: WinState = serde_json::from_str("\"Draw\"").unwrap();
        assert_eq!(back, WinState::Draw);
    }
}
