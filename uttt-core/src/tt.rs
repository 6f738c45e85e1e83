//! Transposition table for caching search results
//!
//! Entries are keyed by the exact board value together with the forced
//! sub-board, since the same stones reached through different move orders
//! may leave a different sub-board to play in. One table lives for one
//! iterative-deepening run.

use rustc_hash::FxHashMap;

use crate::game::Board;

/// How a stored value relates to the true minimax value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Searched inside the window
    Exact,
    /// Failed high: true value >= stored value
    Lower,
    /// Failed low: true value <= stored value
    Upper,
}

/// Table key: board plus the sub-board the mover is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub board: Board,
    pub forced: u8,
}

impl TableKey {
    pub fn new(board: Board, forced: usize) -> Self {
        Self {
            board,
            forced: forced as u8,
        }
    }
}

/// Stored search result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    pub depth: u32,
    pub value: i64,
    pub bound: Bound,
    pub best_move: Option<usize>,
}

/// Transposition table, optionally capped at a number of entries
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<TableKey, TableEntry>,
    limit: Option<usize>,
    hits: u64,
    skipped: u64,
}

impl TranspositionTable {
    /// Unbounded table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding at most `limit` entries
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::default()
        }
    }

    /// Look up a result usable at `depth` within `(alpha, beta)`.
    ///
    /// The stored depth must cover the requested one. Exact entries are
    /// always usable; bound entries only when they prove a cutoff.
    pub fn probe(
        &mut self,
        key: &TableKey,
        depth: u32,
        alpha: i64,
        beta: i64,
    ) -> Option<(i64, Option<usize>)> {
        let entry = self.entries.get(key)?;
        if entry.depth < depth {
            return None;
        }
        let usable = match entry.bound {
            Bound::Exact => true,
            Bound::Lower => entry.value >= beta,
            Bound::Upper => entry.value <= alpha,
        };
        if usable {
            self.hits += 1;
            Some((entry.value, entry.best_move))
        } else {
            None
        }
    }

    /// Raw entry, regardless of depth (used for move ordering)
    pub fn get(&self, key: &TableKey) -> Option<&TableEntry> {
        self.entries.get(key)
    }

    /// Store a result, overwriting any previous entry for the key.
    ///
    /// When the table is full, entries shallower than the new one are swept
    /// first; if nothing can be freed the store is skipped.
    pub fn store(&mut self, key: TableKey, entry: TableEntry) {
        if let Some(limit) = self.limit {
            if self.entries.len() >= limit && !self.entries.contains_key(&key) {
                self.entries.retain(|_, e| e.depth >= entry.depth);
                if self.entries.len() >= limit {
                    self.skipped += 1;
                    return;
                }
            }
        }
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successful probes so far
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Stores dropped because the table was full
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.skipped = 0;
    }
}
