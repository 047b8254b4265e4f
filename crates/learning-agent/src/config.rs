//! Agent tuning parameters

use serde::{Deserialize, Serialize};

use crate::errors::{AgentError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Step size of the value update (α)
    pub learning_rate: f64,
    /// Initial probability of exploring (ε)
    pub exploration_rate: f64,
    /// Multiplicative decay applied to ε after every record
    pub exploration_decay: f64,
    /// Floor for ε
    pub min_exploration_rate: f64,
    /// Discount on the next state's best value (γ)
    pub discount_factor: f64,
    /// Experience ring buffer capacity
    pub buffer_capacity: usize,
    /// Rolling success window per action signature
    pub success_window: usize,
    /// A batch update runs every this many records
    pub batch_interval: usize,
    /// Most recent experiences considered by a batch update
    pub batch_window: usize,
    /// Fewer buffered experiences than this skips the batch update
    pub min_batch_size: usize,
    /// Exploration draws from this many top candidates
    pub exploration_pool: usize,
    /// Share of the scorer total in the exploitation blend; the value estimate gets the rest
    pub scorer_blend: f64,
    /// Fixed RNG seed for reproducible exploration
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            exploration_rate: 0.1,
            exploration_decay: 0.995,
            min_exploration_rate: 0.01,
            discount_factor: 0.95,
            buffer_capacity: 1000,
            success_window: 20,
            batch_interval: 10,
            batch_window: 50,
            min_batch_size: 10,
            exploration_pool: 3,
            scorer_blend: 0.7,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_exploration(mut self, rate: f64, min_rate: f64) -> Self {
        self.exploration_rate = rate;
        self.min_exploration_rate = min_rate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_unit("learning_rate", self.learning_rate)?;
        check_unit("exploration_rate", self.exploration_rate)?;
        check_unit("min_exploration_rate", self.min_exploration_rate)?;
        check_unit("discount_factor", self.discount_factor)?;
        check_unit("scorer_blend", self.scorer_blend)?;

        if !(self.exploration_decay > 0.0 && self.exploration_decay <= 1.0) {
            return Err(AgentError::InvalidConfig(format!(
                "exploration_decay must be in (0, 1], got {}",
                self.exploration_decay
            )));
        }
        if self.min_exploration_rate > self.exploration_rate {
            return Err(AgentError::InvalidConfig(format!(
                "min_exploration_rate {} exceeds exploration_rate {}",
                self.min_exploration_rate, self.exploration_rate
            )));
        }
        for (name, value) in [
            ("buffer_capacity", self.buffer_capacity),
            ("success_window", self.success_window),
            ("batch_interval", self.batch_interval),
            ("batch_window", self.batch_window),
            ("exploration_pool", self.exploration_pool),
        ] {
            if value == 0 {
                return Err(AgentError::InvalidConfig(format!("{name} must be positive")));
            }
        }
        let batch_limit = self.batch_window.min(self.buffer_capacity);
        if self.min_batch_size > batch_limit {
            return Err(AgentError::InvalidConfig(format!(
                "min_batch_size {} exceeds batch_window/buffer_capacity {}; batch updates would never run",
                self.min_batch_size, batch_limit
            )));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AgentError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}
