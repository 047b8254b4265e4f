//! Scoring weights

use navis_core_types::{ScoreBreakdown, ScoreFeature};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScorerError};

/// Allowed drift of the weight sum away from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-feature weights; always non-negative and summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    text_match: f64,
    semantic_relevance: f64,
    contextual_position: f64,
    visual_prominence: f64,
    interaction_history: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            text_match: 0.30,
            semantic_relevance: 0.25,
            contextual_position: 0.20,
            visual_prominence: 0.15,
            interaction_history: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Build a custom weight vector, rejecting negative entries or a sum other than 1.0.
    pub fn new(
        text_match: f64,
        semantic_relevance: f64,
        contextual_position: f64,
        visual_prominence: f64,
        interaction_history: f64,
    ) -> Result<Self> {
        let weights = Self {
            text_match,
            semantic_relevance,
            contextual_position,
            visual_prominence,
            interaction_history,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        for feature in ScoreFeature::ALL {
            let w = self.get(feature);
            if !w.is_finite() || w < 0.0 {
                return Err(ScorerError::InvalidWeights(format!(
                    "{} weight must be a non-negative number, got {}",
                    feature, w
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScorerError::InvalidWeights(format!(
                "weights must sum to 1.0, got {:.6}",
                sum
            )));
        }
        Ok(())
    }

    pub fn get(&self, feature: ScoreFeature) -> f64 {
        match feature {
            ScoreFeature::TextMatch => self.text_match,
            ScoreFeature::SemanticRelevance => self.semantic_relevance,
            ScoreFeature::ContextualPosition => self.contextual_position,
            ScoreFeature::VisualProminence => self.visual_prominence,
            ScoreFeature::InteractionHistory => self.interaction_history,
        }
    }

    pub fn sum(&self) -> f64 {
        ScoreFeature::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// Weighted sum of the sub-scores.
    pub fn total(&self, scores: &ScoreBreakdown) -> f64 {
        scores.iter().map(|(feature, v)| v * self.get(feature)).sum()
    }
}
