//! Error types for consensus message handling.

use thiserror::Error;

/// Errors raised while decoding consensus types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A sign step value outside `1..=3`.
    #[error("invalid sign step: {0}")]
    InvalidStep(u8),

    /// A canonical encoding too short to contain its fixed header.
    #[error("canonical encoding truncated: need {need} bytes, got {got}")]
    Truncated {
        /// Minimum length required.
        need: usize,
        /// Actual length.
        got: usize,
    },

    /// A block id that is not 32 bytes of hex.
    #[error("invalid block id: {0}")]
    InvalidBlockId(String),
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
