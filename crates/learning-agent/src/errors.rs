//! Error types for the learning agent

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid agent configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown feedback kind: {0}")]
    UnknownFeedback(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Snapshot encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
