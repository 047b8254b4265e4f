//! Configuration management module
//!
//! One YAML document covers the scorer weights, agent tuning, gate thresholds and where the
//! learned agent state is persisted. A handful of environment variables override the file.

use std::path::PathBuf;

use decision_gate::GateConfig;
use element_scorer::ScoringWeights;
use learning_agent::AgentConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{NavisError, Result};

pub const ENV_CONFIDENCE_THRESHOLD: &str = "NAVIS_CONFIDENCE_THRESHOLD";
pub const ENV_EXPLORATION_RATE: &str = "NAVIS_EXPLORATION_RATE";
pub const ENV_SNAPSHOT_PATH: &str = "NAVIS_SNAPSHOT_PATH";
pub const ENV_SEED: &str = "NAVIS_SEED";

/// How scored elements are cut down before they reach the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub limit: usize,
    pub min_score: f64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            min_score: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavisConfig {
    pub scoring: ScoringWeights,
    pub agent: AgentConfig,
    pub gate: GateConfig,
    pub candidates: CandidateConfig,
    /// Where the agent snapshot lives; the platform data dir when unset
    pub snapshot_path: Option<PathBuf>,
}

impl NavisConfig {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|err| NavisError::InvalidConfig(err.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.agent.validate()?;
        self.gate.validate()?;
        if self.candidates.limit == 0 {
            return Err(NavisError::InvalidConfig(
                "candidates.limit must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.candidates.min_score) {
            return Err(NavisError::InvalidConfig(format!(
                "candidates.min_score must be within [0, 1], got {}",
                self.candidates.min_score
            )));
        }
        Ok(())
    }

    /// Resolved snapshot location.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path.clone().unwrap_or_else(default_snapshot_path)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; values that do not parse are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_override::<f64>(&lookup, ENV_CONFIDENCE_THRESHOLD) {
            self.gate.confidence_threshold = value;
            info!("Confidence threshold overridden from environment: {}", value);
        }
        if let Some(value) = parse_override::<f64>(&lookup, ENV_EXPLORATION_RATE) {
            self.agent.exploration_rate = value;
            if self.agent.min_exploration_rate > value {
                self.agent.min_exploration_rate = value;
            }
            info!("Exploration rate overridden from environment: {}", value);
        }
        if let Some(raw) = lookup(ENV_SNAPSHOT_PATH) {
            let raw = raw.trim();
            if !raw.is_empty() {
                self.snapshot_path = Some(PathBuf::from(raw));
                info!("Snapshot path overridden from environment: {}", raw);
            }
        }
        if let Some(seed) = parse_override::<u64>(&lookup, ENV_SEED) {
            self.agent.seed = Some(seed);
            info!("Exploration seed fixed from environment: {}", seed);
        }
    }
}

fn parse_override<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable override");
            None
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("navis");
    path.push("agent-snapshot.json");
    path
}
