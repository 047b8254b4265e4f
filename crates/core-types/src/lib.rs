//! Shared primitives for the Navis decision core.
//!
//! These are the values that cross component boundaries: parsed intents coming from the
//! intent parser, element snapshots coming from page inspection, and the scored candidates
//! handed from the scorer to the learning agent and the decision gate.

pub mod element;
pub mod history;
pub mod intent;
pub mod scoring;

pub use element::*;
pub use history::*;
pub use intent::*;
pub use scoring::*;

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Shared error type for malformed boundary values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown action type: {0}")]
    UnknownActionType(String),

    #[error("unknown score feature: {0}")]
    UnknownFeature(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clamp a possibly non-finite value into `[0, 1]`; NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// `deserialize_with` helper for fields that must stay within `[0, 1]`.
pub fn deserialize_unit<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <f64 as serde::Deserialize>::deserialize(deserializer).map(clamp_unit)
}
