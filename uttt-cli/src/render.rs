//! Text rendering of boards
//!
//! Annotated boards show stones in lower case, the last move in upper case,
//! playable cells as '.' and other empty cells as '-'.

use uttt_core::{Board, CELLS};

/// Mark legal cells (when the forced sub-board is known) and the last move
pub fn annotate(board: &Board, last_move: Option<usize>, forced: Option<usize>) -> String {
    let mut cells: Vec<char> = board
        .decode()
        .chars()
        .map(|c| if c == '.' { '-' } else { c.to_ascii_lowercase() })
        .collect();

    if let Some(forced) = forced.filter(|_| !board.is_terminal()) {
        for mv in board.legal_moves(forced) {
            cells[mv] = '.';
        }
    }
    if let Some(mv) = last_move.filter(|&mv| mv < CELLS) {
        cells[mv] = cells[mv].to_ascii_uppercase();
    }
    cells.into_iter().collect()
}

/// Lay out an 81-character board as a 3x3 grid of sub-boards
pub fn pretty(cells: &str) -> String {
    let chars: Vec<char> = cells.chars().collect();
    let separator = "-".repeat(25);
    let mut out = String::new();

    for band in 0..3 {
        out.push_str(&separator);
        out.push('\n');
        for row in 0..3 {
            out.push_str("| ");
            for col in 0..3 {
                let sub = band * 3 + col;
                let start = sub * 9 + row * 3;
                let line: Vec<String> = chars[start..start + 3].iter().map(char::to_string).collect();
                out.push_str(&line.join(" "));
                out.push_str(" | ");
            }
            out.push('\n');
        }
    }
    out.push_str(&separator);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uttt_core::Player;

    #[test]
    fn test_annotate_marks_moves() {
        let board = Board::empty().apply_move(40, Player::X);
        let text = annotate(&board, Some(40), Some(4));
        let chars: Vec<char> = text.chars().collect();
        assert_eq!(chars[40], 'X');
        assert_eq!(chars[36], '.');
        assert_eq!(chars[0], '-');
        assert_eq!(text.matches('.').count(), 8);
    }

    #[test]
    fn test_pretty_layout() {
        let text = pretty(&annotate(&Board::empty(), None, Some(4)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "-".repeat(25));
        assert_eq!(lines[5], "| - - - | . . . | - - - | ");
    }
}
