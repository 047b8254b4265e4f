//! Error types for the decision gate

use learning_agent::AgentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    /// Threshold outside `[0, 1]`; the previous value is kept
    #[error("Invalid confidence threshold {0}: must be within [0, 1]")]
    InvalidThreshold(f64),

    #[error("Invalid gate configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type Result<T> = std::result::Result<T, GateError>;
