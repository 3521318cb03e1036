//! Error types for bandwidth computations.

use super::domain::Direction;

/// Result type for bandwidth operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for bandwidth operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Intersection #{index} has no {direction} green phase")]
    MissingPhase { index: usize, direction: Direction },

    #[error("Intersection #{0} has no cycle time")]
    MissingCycleTime(usize),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Offset oracle error: {0}")]
    OracleError(String),
}

impl EngineError {
    /// Whether the error describes incomplete signal data rather than malformed input.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            EngineError::MissingPhase { .. } | EngineError::MissingCycleTime(_)
        )
    }
}
