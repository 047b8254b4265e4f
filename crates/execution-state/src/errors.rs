//! Error types for execution state handling

use thiserror::Error;

use crate::types::{ExecutionState, TransitionKind};

/// A transition attempted outside its source states; the machine is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Cannot {transition} while {from}")]
pub struct TransitionError {
    pub transition: TransitionKind,
    pub from: ExecutionState,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The run this token belongs to is over; no further steps may run
    #[error("Execution halted in state {0}")]
    Halted(ExecutionState),
}
