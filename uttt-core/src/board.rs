//! Bitboard geometry over the 81-cell super-board
//!
//! Cell `i` lives in sub-board `i / 9` at position `i % 9`. Bits are stored
//! most-significant-first: cell 0 is bit 80 and cell 80 is bit 0. Inside a
//! 9-bit sub-board mask position `p` is bit `8 - p`, so the same line
//! patterns apply to sub-boards and to the meta board.

/// Number of cells on the super-board
pub const CELLS: usize = 81;

/// Number of sub-boards (and cells per sub-board)
pub const SUBBOARDS: usize = 9;

/// All 81 cell bits
pub const BOARD_MASK: u128 = (1 << CELLS) - 1;

/// All 9 bits of a sub-board (or meta) mask
pub const SUBBOARD_FULL: u16 = (1 << SUBBOARDS) - 1;

/// Bit offset of sub-board `s` inside an 81-bit mask
#[inline]
const fn subboard_shift(subboard: usize) -> usize {
    CELLS - (subboard + 1) * SUBBOARDS
}

/// 81-bit masks covering each sub-board
pub const SUBBOARD_MASKS: [u128; SUBBOARDS] = {
    let mut masks = [0u128; SUBBOARDS];
    let mut s = 0;
    while s < SUBBOARDS {
        masks[s] = (SUBBOARD_FULL as u128) << subboard_shift(s);
        s += 1;
    }
    masks
};

/// Set the bit for `index`
#[inline]
pub fn place(mask: u128, index: usize) -> u128 {
    debug_assert!(index < CELLS);
    mask | (1 << (CELLS - 1 - index))
}

/// Test the bit for `index`
#[inline]
pub fn get(mask: u128, index: usize) -> bool {
    debug_assert!(index < CELLS);
    mask & (1 << (CELLS - 1 - index)) != 0
}

/// Extract the 9-bit mask of one sub-board
#[inline]
pub fn subboard(mask: u128, subboard: usize) -> u16 {
    debug_assert!(subboard < SUBBOARDS);
    ((mask >> subboard_shift(subboard)) as u16) & SUBBOARD_FULL
}

/// Bit for sub-board `s` (or position `p`) inside a 9-bit mask
#[inline]
pub const fn nine_bit(position: usize) -> u16 {
    1 << (SUBBOARDS - 1 - position)
}

/// Sub-board a cell belongs to
#[inline]
pub const fn subboard_of(cell: usize) -> usize {
    cell / SUBBOARDS
}

/// Sub-board the opponent is sent to after a move at `cell`
#[inline]
pub const fn forced_by(cell: usize) -> usize {
    cell % SUBBOARDS
}

/// Iterate the set cells of an 81-bit mask in ascending index order
pub fn cells(mask: u128) -> Cells {
    Cells(mask & BOARD_MASK)
}

/// Ascending iterator over set cells (highest bit first)
#[derive(Clone, Copy, Debug)]
pub struct Cells(u128);

impl Iterator for Cells {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = 127 - self.0.leading_zeros() as usize;
        self.0 &= !(1 << bit);
        Some(CELLS - 1 - bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Cells {}
