//! Decision gate - autonomous action vs. user disambiguation
//!
//! The gate asks the learning agent for a pick, then acts on it only when both the pick's
//! confidence and its effective score clear their thresholds. Everything else becomes a
//! disambiguation request listing the top candidates with an explanation. Outcome reports are
//! turned into rewards for the agent.

pub mod errors;
pub mod gate;
pub mod types;

pub use errors::*;
pub use gate::*;
pub use types::*;
