//! Error handling module
//!
//! Wraps the component errors so session-level callers deal with a single type.

use decision_gate::GateError;
use element_scorer::ScorerError;
use execution_state::TransitionError;
use learning_agent::AgentError;
use navis_core_types::SessionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavisError {
    #[error(transparent)]
    Scorer(#[from] ScorerError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    /// No element with this index was offered in the last evaluation
    #[error("Element #{0} was not among the evaluated candidates")]
    UnknownCandidate(usize),

    #[error("No evaluation has been made in this session yet")]
    NoEvaluation,

    #[error("No action has been started in this session")]
    NoActiveAction,
}

pub type Result<T> = std::result::Result<T, NavisError>;
