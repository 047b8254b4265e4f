//! Learned feature weights

use std::collections::BTreeMap;

use navis_core_types::{ScoreBreakdown, ScoreFeature};
use serde::{Deserialize, Serialize};

/// Feature name to weight; sums to 1.0 after every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureWeights {
    weights: BTreeMap<ScoreFeature, f64>,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        let weights = [
            (ScoreFeature::TextMatch, 0.30),
            (ScoreFeature::SemanticRelevance, 0.25),
            (ScoreFeature::ContextualPosition, 0.20),
            (ScoreFeature::VisualProminence, 0.15),
            (ScoreFeature::InteractionHistory, 0.10),
        ]
        .into_iter()
        .collect();
        Self { weights }
    }
}

impl FeatureWeights {
    pub fn get(&self, feature: ScoreFeature) -> f64 {
        self.weights.get(&feature).copied().unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoreFeature, f64)> + '_ {
        self.weights.iter().map(|(f, w)| (*f, *w))
    }

    pub fn as_map(&self) -> &BTreeMap<ScoreFeature, f64> {
        &self.weights
    }

    /// Move every weight `rate` of the way toward `target`, then renormalize.
    pub fn nudge_toward(&mut self, target: &ScoreBreakdown, rate: f64) {
        for feature in ScoreFeature::ALL {
            let current = self.get(feature);
            let goal = target.get(feature);
            self.weights
                .insert(feature, current * (1.0 - rate) + goal * rate);
        }
        self.normalize();
    }

    /// Rescale to sum to 1.0, filling missing features with 0; falls back to the defaults when
    /// nothing usable is left.
    pub fn normalize(&mut self) {
        for feature in ScoreFeature::ALL {
            let entry = self.weights.entry(feature).or_insert(0.0);
            if !entry.is_finite() || *entry < 0.0 {
                *entry = 0.0;
            }
        }
        let total = self.sum();
        if total <= 0.0 || !total.is_finite() {
            *self = Self::default();
            return;
        }
        if (total - 1.0).abs() < 1e-12 {
            return;
        }
        for weight in self.weights.values_mut() {
            *weight /= total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_sum_to_one() {
        assert!((FeatureWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_nudge_moves_toward_target_and_keeps_sum() {
        let mut weights = FeatureWeights::default();
        let target = ScoreBreakdown {
            text_match: 1.0,
            semantic_relevance: 1.0,
            contextual_position: 0.0,
            visual_prominence: 0.0,
            interaction_history: 0.0,
        };
        weights.nudge_toward(&target, 0.1);

        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!(weights.get(ScoreFeature::TextMatch) > 0.30);
        assert!(weights.get(ScoreFeature::InteractionHistory) < 0.10);
    }

    #[test]
    fn test_normalize_repairs_garbage() {
        let mut weights: FeatureWeights =
            serde_json::from_str(r#"{"text_match":-1.0,"visual_prominence":3.0}"#).unwrap();
        weights.normalize();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert_eq!(weights.get(ScoreFeature::VisualProminence), 1.0);
        assert_eq!(weights.as_map().len(), 5);

        let mut empty: FeatureWeights = serde_json::from_str("{}").unwrap();
        empty.normalize();
        assert_eq!(empty, FeatureWeights::default());
    }
}
