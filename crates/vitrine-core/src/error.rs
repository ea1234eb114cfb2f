use thiserror::Error;

/// Malformed interpolation table. Reported once, when the mapping is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("interpolation needs at least two breakpoints, got {0}")]
    TooFewBreakpoints(usize),
    #[error("{inputs} input breakpoints but {outputs} output values")]
    LengthMismatch { inputs: usize, outputs: usize },
    #[error("input breakpoints must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },
    #[error("input breakpoint at index {index} is not finite")]
    NonFinite { index: usize },
}

/// Failure of a durable key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage format: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme {0:?} (expected \"light\" or \"dark\")")]
pub struct ThemeParseError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid scroll offset {0:?} (expected \"<target-edge> <viewport-edge>\")")]
pub struct ScrollOffsetParseError(pub String);
