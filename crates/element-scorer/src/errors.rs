//! Error types for element scoring

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScorerError {
    /// Element could not be scored; it is skipped and the batch continues
    #[error("Element #{index} rejected: {reason}")]
    InvalidElement { index: usize, reason: String },

    /// Weight vector does not form a valid convex combination
    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),
}

pub type Result<T> = std::result::Result<T, ScorerError>;
