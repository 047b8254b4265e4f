//! Learning agent - epsilon-greedy selection over scored candidates
//!
//! The agent keeps a value table keyed by (state signature, action signature), a set of learned
//! feature weights and a decaying exploration rate. Every recorded outcome updates the table
//! immediately; every tenth one also triggers a batch pass over recent experiences that nudges
//! the feature weights toward what worked.

pub mod agent;
pub mod config;
pub mod errors;
pub mod experience;
pub mod signature;
pub mod snapshot;
pub mod value_table;
pub mod weights;

pub use agent::*;
pub use config::AgentConfig;
pub use errors::*;
pub use experience::{DecisionState, Experience, Feedback, FeedbackKind};
pub use signature::{ActionSignature, StateSignature};
pub use snapshot::{AgentSnapshot, JsonFileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use value_table::ValueTable;
pub use weights::FeatureWeights;
