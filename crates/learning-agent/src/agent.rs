//! Epsilon-greedy learning agent

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use navis_core_types::{
    Intent, InteractionHistory, PageContext, ScoreBreakdown, ScoreFeature, ScoredElement,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::errors::{AgentError, Result};
use crate::experience::{effective_reward, DecisionState, Experience, ExperienceBuffer, Feedback};
use crate::signature::{ActionSignature, StateSignature};
use crate::snapshot::{AgentSnapshot, SnapshotStore};
use crate::value_table::ValueTable;
use crate::weights::FeatureWeights;

/// Share of the distance to the success mean covered by one batch update.
const WEIGHT_NUDGE_RATE: f64 = 0.1;
/// Success rate reported for actions without history.
pub const UNKNOWN_SUCCESS_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    Exploration,
    Exploitation,
}

impl SelectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMethod::Exploration => "exploration",
            SelectionMethod::Exploitation => "exploitation",
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The chosen candidate and how it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub candidate: ScoredElement,
    pub method: SelectionMethod,
    pub value_estimate: f64,
    /// Blend of scorer total and value estimate; only set on exploitation
    pub combined_score: Option<f64>,
    pub exploration_rate: f64,
    pub state_signature: StateSignature,
}

impl Selection {
    /// Combined score when present, otherwise the scorer total.
    pub fn effective_score(&self) -> f64 {
        self.combined_score.unwrap_or(self.candidate.total_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatistics {
    pub exploration_rate: f64,
    pub experience_count: usize,
    pub total_recorded: u64,
    pub batch_updates: u64,
    pub value_table_size: usize,
    pub success_history_size: usize,
    pub mean_value_estimate: f64,
    pub feature_weights: BTreeMap<ScoreFeature, f64>,
    pub success_rates: BTreeMap<ActionSignature, f64>,
}

/// Owns the value table, feature weights and exploration schedule of one session.
///
/// Mutating calls take `&mut self`; share an agent only behind a lock.
#[derive(Debug)]
pub struct LearningAgent {
    config: AgentConfig,
    exploration_rate: f64,
    value_table: ValueTable,
    feature_weights: FeatureWeights,
    experiences: ExperienceBuffer,
    success_history: BTreeMap<ActionSignature, VecDeque<bool>>,
    total_recorded: u64,
    batch_updates: u64,
    rng: StdRng,
}

impl Default for LearningAgent {
    fn default() -> Self {
        Self::build(AgentConfig::default())
    }
}

impl LearningAgent {
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: AgentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            "Learning agent initialized with exploration_rate={}",
            config.exploration_rate
        );
        Self {
            exploration_rate: config.exploration_rate,
            experiences: ExperienceBuffer::new(config.buffer_capacity),
            value_table: ValueTable::new(),
            feature_weights: FeatureWeights::default(),
            success_history: BTreeMap::new(),
            total_recorded: 0,
            batch_updates: 0,
            rng,
            config,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    pub fn feature_weights(&self) -> &FeatureWeights {
        &self.feature_weights
    }

    pub fn value_table(&self) -> &ValueTable {
        &self.value_table
    }

    pub fn experience_count(&self) -> usize {
        self.experiences.len()
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    pub fn value_estimate(&self, state: &StateSignature, action: &ActionSignature) -> f64 {
        self.value_table.get(state, action)
    }

    /// Pick one of the ranked `candidates`.
    ///
    /// With probability ε a random candidate among the top few is explored; otherwise the
    /// candidate with the best blend of scorer total and value estimate wins, earlier
    /// candidates winning ties.
    pub fn select(
        &mut self,
        candidates: &[ScoredElement],
        intent: &Intent,
        context: &PageContext,
    ) -> Option<Selection> {
        if candidates.is_empty() {
            warn!("No candidates provided for action selection");
            return None;
        }
        let state_signature = StateSignature::of(intent, context);

        let explore =
            self.exploration_rate > 0.0 && self.rng.gen::<f64>() < self.exploration_rate;

        let selection = if explore {
            let pool = self.config.exploration_pool.min(candidates.len());
            let candidate = candidates[self.rng.gen_range(0..pool)].clone();
            debug!("Exploring among top {} candidates", pool);
            let value_estimate = self.value_table.get(&state_signature, &candidate.signature());
            Selection {
                candidate,
                method: SelectionMethod::Exploration,
                value_estimate,
                combined_score: None,
                exploration_rate: self.exploration_rate,
                state_signature,
            }
        } else {
            let blend = self.config.scorer_blend;
            let mut best: Option<(usize, f64, f64)> = None;
            for (position, candidate) in candidates.iter().enumerate() {
                let value = self.value_table.get(&state_signature, &candidate.signature());
                let combined = blend * candidate.total_score + (1.0 - blend) * value;
                if best.map_or(true, |(_, _, top)| combined > top) {
                    best = Some((position, value, combined));
                }
            }
            let (position, value_estimate, combined) = best.unwrap_or((0, 0.0, 0.0));
            debug!(
                "Exploiting: candidate #{} combined={:.3} value={:.3}",
                position, combined, value_estimate
            );
            Selection {
                candidate: candidates[position].clone(),
                method: SelectionMethod::Exploitation,
                value_estimate,
                combined_score: Some(combined),
                exploration_rate: self.exploration_rate,
                state_signature,
            }
        };

        Some(selection)
    }

    /// Record an outcome and learn from it; returns the effective reward.
    pub fn record(
        &mut self,
        state: &DecisionState,
        action: &ScoredElement,
        reward: f64,
        next_state: Option<&DecisionState>,
        feedback: Option<Feedback>,
    ) -> f64 {
        let adjusted = effective_reward(reward, feedback.as_ref());
        let experience = Experience::new(state, action, adjusted, next_state, feedback);
        let state_sig = experience.state.clone();
        let action_sig = experience.action.clone();
        let next_sig = experience.next_state.clone();
        self.experiences.push(experience);

        let current = self.value_table.get(&state_sig, &action_sig);
        let max_next = next_sig
            .and_then(|sig| self.value_table.max_for_state(&sig))
            .unwrap_or(0.0);
        let updated = current
            + self.config.learning_rate
                * (adjusted + self.config.discount_factor * max_next - current);
        self.value_table
            .set(state_sig.clone(), action_sig.clone(), updated);
        debug!(
            "Value updated: {} / {} = {:.3} (was {:.3})",
            state_sig, action_sig, updated, current
        );

        self.track_success(action_sig, reward.is_finite() && reward > 0.0);

        self.exploration_rate = (self.exploration_rate * self.config.exploration_decay)
            .max(self.config.min_exploration_rate)
            .min(self.exploration_rate);

        self.total_recorded += 1;
        info!(
            "Experience recorded: reward={:.2}, exploration_rate={:.3}",
            adjusted, self.exploration_rate
        );

        if self.total_recorded % self.config.batch_interval as u64 == 0 {
            self.batch_update();
        }

        adjusted
    }

    fn track_success(&mut self, action: ActionSignature, success: bool) {
        let window = self.config.success_window;
        let history = self.success_history.entry(action).or_default();
        history.push_back(success);
        while history.len() > window {
            history.pop_front();
        }
    }

    /// Nudge the feature weights toward the mean sub-scores of recent successes.
    ///
    /// Returns whether the weights changed.
    pub fn batch_update(&mut self) -> bool {
        if self.experiences.len() < self.config.min_batch_size {
            debug!(
                "Batch update skipped: {} experiences buffered",
                self.experiences.len()
            );
            return false;
        }

        let mut sums = ScoreBreakdown::default();
        let mut successes = 0usize;
        for experience in self
            .experiences
            .recent(self.config.batch_window)
            .filter(|e| e.reward > 0.0)
        {
            sums.text_match += experience.scores.text_match;
            sums.semantic_relevance += experience.scores.semantic_relevance;
            sums.contextual_position += experience.scores.contextual_position;
            sums.visual_prominence += experience.scores.visual_prominence;
            sums.interaction_history += experience.scores.interaction_history;
            successes += 1;
        }
        if successes == 0 {
            debug!("Batch update skipped: no successful experiences");
            return false;
        }

        let n = successes as f64;
        let means = ScoreBreakdown {
            text_match: sums.text_match / n,
            semantic_relevance: sums.semantic_relevance / n,
            contextual_position: sums.contextual_position / n,
            visual_prominence: sums.visual_prominence / n,
            interaction_history: sums.interaction_history / n,
        };
        self.feature_weights.nudge_toward(&means, WEIGHT_NUDGE_RATE);
        self.batch_updates += 1;
        info!("Feature weights updated: {:?}", self.feature_weights.as_map());
        true
    }

    /// Mean of the rolling success window; 0.5 for unknown actions.
    pub fn success_rate(&self, action: &ActionSignature) -> f64 {
        match self.success_history.get(action) {
            Some(history) if !history.is_empty() => {
                history.iter().filter(|s| **s).count() as f64 / history.len() as f64
            }
            _ => UNKNOWN_SUCCESS_RATE,
        }
    }

    pub fn statistics(&self) -> AgentStatistics {
        AgentStatistics {
            exploration_rate: self.exploration_rate,
            experience_count: self.experiences.len(),
            total_recorded: self.total_recorded,
            batch_updates: self.batch_updates,
            value_table_size: self.value_table.len(),
            success_history_size: self.success_history.len(),
            mean_value_estimate: self.value_table.mean(),
            feature_weights: self.feature_weights.as_map().clone(),
            success_rates: self
                .success_history
                .keys()
                .map(|sig| (sig.clone(), self.success_rate(sig)))
                .collect(),
        }
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            value_table: self.value_table.clone(),
            success_history: self.success_history.clone(),
            feature_weights: self.feature_weights.clone(),
            exploration_rate: self.exploration_rate,
            experiences: self.experiences.iter().cloned().collect(),
            total_recorded: self.total_recorded,
            batch_updates: self.batch_updates,
            interaction_history: InteractionHistory::new(),
            saved_at: chrono::Utc::now(),
        }
    }

    /// Replace learned state with `snapshot`; on error nothing changes.
    ///
    /// Returns the interaction history the snapshot carried for the caller.
    pub fn restore(&mut self, snapshot: AgentSnapshot) -> Result<InteractionHistory> {
        if !snapshot.exploration_rate.is_finite() {
            return Err(AgentError::InvalidSnapshot(format!(
                "exploration rate {} is not a number",
                snapshot.exploration_rate
            )));
        }
        if snapshot.value_table.values().any(|v| !v.is_finite()) {
            return Err(AgentError::InvalidSnapshot(
                "value table contains non-finite estimates".to_string(),
            ));
        }

        let mut weights = snapshot.feature_weights;
        weights.normalize();
        let mut experiences = ExperienceBuffer::new(self.config.buffer_capacity);
        for experience in snapshot
            .experiences
            .into_iter()
            .filter(|e| e.reward.is_finite())
        {
            experiences.push(experience);
        }
        let mut success_history = snapshot.success_history;
        for history in success_history.values_mut() {
            while history.len() > self.config.success_window {
                history.pop_front();
            }
        }

        self.value_table = snapshot.value_table;
        self.success_history = success_history;
        self.feature_weights = weights;
        self.experiences = experiences;
        self.total_recorded = snapshot.total_recorded;
        self.batch_updates = snapshot.batch_updates;
        self.exploration_rate = snapshot
            .exploration_rate
            .clamp(self.config.min_exploration_rate, 1.0);
        info!(
            "Agent state restored: {} value entries, {} experiences, exploration_rate={:.3}",
            self.value_table.len(),
            self.experiences.len(),
            self.exploration_rate
        );
        Ok(snapshot.interaction_history)
    }

    /// Restore from `store`, keeping the current state on any failure.
    ///
    /// Returns whether a snapshot was applied.
    pub fn restore_from(&mut self, store: &dyn SnapshotStore) -> bool {
        self.load_from(store).is_some()
    }

    /// Like [`restore_from`](Self::restore_from), handing back the snapshot's interaction
    /// history when one was applied.
    pub fn load_from(&mut self, store: &dyn SnapshotStore) -> Option<InteractionHistory> {
        match store.load() {
            Ok(Some(snapshot)) => match self.restore(snapshot) {
                Ok(history) => Some(history),
                Err(err) => {
                    warn!("Ignoring agent snapshot: {}", err);
                    None
                }
            },
            Ok(None) => {
                debug!("No agent snapshot found; starting fresh");
                None
            }
            Err(err) => {
                warn!("Failed to load agent snapshot, continuing with defaults: {}", err);
                None
            }
        }
    }

    pub fn save_to(&self, store: &dyn SnapshotStore) -> Result<()> {
        store.save(&self.snapshot())
    }
}
