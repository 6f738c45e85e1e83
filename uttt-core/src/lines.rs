//! Three-in-a-row line tables
//!
//! Every query works on a 9-bit mask: either the stones of one side inside a
//! sub-board, or the sub-boards one side has won on the meta board. All
//! answers come from lookup tables evaluated at compile time.

/// Number of 9-bit masks
const MASKS: usize = 512;

/// The 8 winning lines (position `p` is bit `8 - p`)
pub const WIN_LINES: [u16; 8] = [
    0b111_000_000, // Top row
    0b000_111_000, // Middle row
    0b000_000_111, // Bottom row
    0b100_100_100, // Left column
    0b010_010_010, // Middle column
    0b001_001_001, // Right column
    0b100_010_001, // Main diagonal
    0b001_010_100, // Anti-diagonal
];

/// `WIN_TABLE[mask]` is true iff `mask` contains a full line
static WIN_TABLE: [bool; MASKS] = {
    let mut table = [false; MASKS];
    let mut mask = 0;
    while mask < MASKS {
        let mut l = 0;
        while l < WIN_LINES.len() {
            if mask as u16 & WIN_LINES[l] == WIN_LINES[l] {
                table[mask] = true;
            }
            l += 1;
        }
        mask += 1;
    }
    table
};

/// `PAIR_LINES[mask]`: bitset of lines holding exactly two cells of `mask`
static PAIR_LINES: [u8; MASKS] = {
    let mut table = [0u8; MASKS];
    let mut mask = 0;
    while mask < MASKS {
        let mut l = 0;
        while l < WIN_LINES.len() {
            if (mask as u16 & WIN_LINES[l]).count_ones() == 2 {
                table[mask] |= 1 << l;
            }
            l += 1;
        }
        mask += 1;
    }
    table
};

/// `TOUCHED_LINES[mask]`: bitset of lines holding at least one cell of `mask`
static TOUCHED_LINES: [u8; MASKS] = {
    let mut table = [0u8; MASKS];
    let mut mask = 0;
    while mask < MASKS {
        let mut l = 0;
        while l < WIN_LINES.len() {
            if mask as u16 & WIN_LINES[l] != 0 {
                table[mask] |= 1 << l;
            }
            l += 1;
        }
        mask += 1;
    }
    table
};

/// True iff the mask contains one of the 8 lines
#[inline]
pub fn subboard_has_win(mask: u16) -> bool {
    WIN_TABLE[(mask & 0x1ff) as usize]
}

/// Lines where `own` holds two cells and `other` holds none
#[inline]
fn open_pairs(own: u16, other: u16) -> i32 {
    let pairs = PAIR_LINES[(own & 0x1ff) as usize];
    let blocked = TOUCHED_LINES[(other & 0x1ff) as usize];
    (pairs & !blocked).count_ones() as i32
}

/// Near-win balance of two 9-bit masks
///
/// +1 for every line where `own` has two cells and the third is empty,
/// -1 for every such line of `other`.
#[inline]
pub fn near_win_score(own: u16, other: u16) -> i32 {
    open_pairs(own, other) - open_pairs(other, own)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct scan used to cross-check the tables
    fn scan_near_wins(own: u16, other: u16) -> i32 {
        WIN_LINES
            .iter()
            .map(|&line| {
                let mine = (own & line).count_ones();
                let theirs = (other & line).count_ones();
                match (mine, theirs) {
                    (2, 0) => 1,
                    (0, 2) => -1,
                    _ => 0,
                }
            })
            .sum()
    }

    #[test]
    fn test_every_line_wins() {
        for &line in &WIN_LINES {
            assert!(subboard_has_win(line));
            assert!(subboard_has_win(line | 0b000_000_001));
        }
    }

    #[test]
    fn test_non_wins() {
        assert!(!subboard_has_win(0));
        assert!(!subboard_has_win(0b110_000_000));
        // X/O draw pattern: X O X / X O O / O X X
        assert!(!subboard_has_win(0b101_100_011));
        assert!(subboard_has_win(0x1ff));
    }

    #[test]
    fn test_win_table_matches_scan() {
        for mask in 0u16..512 {
            let scanned = WIN_LINES.iter().any(|&l| mask & l == l);
            assert_eq!(subboard_has_win(mask), scanned, "mask {:09b}", mask);
        }
    }

    #[test]
    fn test_near_win_table_matches_scan() {
        for own in 0u16..512 {
            for other in (0u16..512).step_by(7) {
                if own & other != 0 {
                    continue;
                }
                assert_eq!(near_win_score(own, other), scan_near_wins(own, other));
            }
        }
    }

    #[test]
    fn test_near_win_blocked() {
        // Two in the top row, third empty
        assert_eq!(near_win_score(0b110_000_000, 0), 1);
        // Opponent sits on the missing cell
        assert_eq!(near_win_score(0b110_000_000, 0b001_000_000), 0);
        // Corner pair shares three lines with nothing
        assert_eq!(near_win_score(0b100_000_001, 0), 1);
        assert_eq!(near_win_score(0, 0b100_000_001), -1);
    }
}
