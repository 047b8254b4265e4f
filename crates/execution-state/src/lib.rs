//! Execution state machine - whether an action pipeline may take its next step
//!
//! States: Idle, Running, Paused, Blocked, Completed, Failed. Pausing reacts to user
//! activity; blocking marks conditions that need a human (login walls, captchas) and always
//! returns through Paused. Loops driving actions hold an [`ExecutionToken`] and call
//! [`ExecutionToken::checkpoint`] before each discrete step.

pub mod errors;
mod history;
pub mod machine;
pub mod token;
pub mod types;

pub use errors::*;
pub use machine::ExecutionStateMachine;
pub use token::ExecutionToken;
pub use types::*;
