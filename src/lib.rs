//! Navis decision core
//!
//! Ties the element scorer, learning agent, decision gate and execution state machine into
//! per-session pipelines, and exposes them through the `navis` command line.

pub mod cli;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod page;
pub mod session;

pub use config::NavisConfig;
pub use errors::{NavisError, Result};
pub use page::PageSnapshot;
pub use session::{DecisionSession, Evaluation, SessionRegistry, SessionStatistics, SharedSession};

pub use decision_gate::{Decision, DecisionReason, GateConfig};
pub use element_scorer::{ElementScorer, ScoringWeights};
pub use execution_state::{ExecutionState, ExecutionStateMachine, ExecutionToken, InterruptReason};
pub use learning_agent::{AgentConfig, FeedbackKind, LearningAgent};
pub use navis_core_types::{ActionType, Element, Intent, PageContext, ScoredElement, SessionId};
