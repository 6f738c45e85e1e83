//! Engine error types

/// Errors raised by the engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Move generation came up empty on a board that is still ongoing.
    /// Points at a defect in encoding or generation; never recovered.
    #[error("no legal moves on an ongoing board (forced sub-board {forced}): {board}")]
    InvariantViolation { board: String, forced: usize },

    /// Caller-supplied input rejected at the boundary
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// Search configuration rejected before searching
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// Stop requested before the first iteration completed
    #[error("search cancelled before any iteration completed")]
    Cancelled,
}

/// Rejected caller input (board left unchanged)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("cell {0} is out of range (0..81)")]
    CellOutOfRange(usize),

    #[error("cell {0} is already occupied")]
    Occupied(usize),

    #[error("cell {cell} is not playable (forced sub-board {forced})")]
    NotLegal { cell: usize, forced: usize },

    #[error("sub-board {0} is out of range (0..9)")]
    SubboardOutOfRange(usize),

    #[error("board string must be 81 characters, got {0}")]
    BoardLength(usize),

    #[error("unexpected character {ch:?} at position {index}")]
    BoardChar { index: usize, ch: char },

    #[error("the game is already over")]
    GameOver,
}

/// Rejected search configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("search depth must be positive")]
    ZeroDepth,

    #[error("search depth {0} exceeds the 81-ply maximum")]
    DepthTooLarge(u32),
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_wraps() {
        let err: EngineError = InputError::Occupied(12).into();
        assert_eq!(err, EngineError::InvalidInput(InputError::Occupied(12)));
        assert_eq!(err.to_string(), "invalid input: cell 12 is already occupied");
    }

    #[test]
    fn test_config_error_message() {
        let err: EngineError = ConfigError::DepthTooLarge(90).into();
        assert!(err.to_string().contains("90"));
    }
}
