//! Scored candidates shared between the scorer, the learning agent and the gate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, Element, ElementSignature};

/// The five independent signals an element is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFeature {
    TextMatch,
    SemanticRelevance,
    ContextualPosition,
    VisualProminence,
    InteractionHistory,
}

impl ScoreFeature {
    pub const ALL: [ScoreFeature; 5] = [
        ScoreFeature::TextMatch,
        ScoreFeature::SemanticRelevance,
        ScoreFeature::ContextualPosition,
        ScoreFeature::VisualProminence,
        ScoreFeature::InteractionHistory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScoreFeature::TextMatch => "text_match",
            ScoreFeature::SemanticRelevance => "semantic_relevance",
            ScoreFeature::ContextualPosition => "contextual_position",
            ScoreFeature::VisualProminence => "visual_prominence",
            ScoreFeature::InteractionHistory => "interaction_history",
        }
    }
}

impl fmt::Display for ScoreFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoreFeature {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScoreFeature::ALL
            .into_iter()
            .find(|feature| feature.name() == s.trim())
            .ok_or_else(|| CoreError::UnknownFeature(s.to_string()))
    }
}

/// Per-feature sub-scores, each within `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub text_match: f64,
    pub semantic_relevance: f64,
    pub contextual_position: f64,
    pub visual_prominence: f64,
    pub interaction_history: f64,
}

impl ScoreBreakdown {
    pub fn get(&self, feature: ScoreFeature) -> f64 {
        match feature {
            ScoreFeature::TextMatch => self.text_match,
            ScoreFeature::SemanticRelevance => self.semantic_relevance,
            ScoreFeature::ContextualPosition => self.contextual_position,
            ScoreFeature::VisualProminence => self.visual_prominence,
            ScoreFeature::InteractionHistory => self.interaction_history,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoreFeature, f64)> + '_ {
        ScoreFeature::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    pub fn mean(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum::<f64>() / ScoreFeature::ALL.len() as f64
    }

    /// Population variance of the five sub-scores.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / ScoreFeature::ALL.len() as f64
    }
}

/// An element together with its scoring outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredElement {
    pub element: Element,
    /// Position of the element in the snapshot it was scored from.
    pub index: usize,
    pub scores: ScoreBreakdown,
    pub total_score: f64,
    pub confidence: f64,
    /// 1-based rank after sorting.
    pub rank: usize,
}

impl ScoredElement {
    pub fn signature(&self) -> ElementSignature {
        self.element.signature()
    }

    /// Short label for logs and prompts.
    pub fn label(&self) -> String {
        let text = self.element.text.trim();
        let text = if text.is_empty() {
            self.element.aria_label.trim()
        } else {
            text
        };
        let shown: String = text.chars().take(30).collect();
        format!("<{}> {}", self.element.tag, shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_parse_back() {
        for feature in ScoreFeature::ALL {
            assert_eq!(feature.name().parse::<ScoreFeature>().unwrap(), feature);
        }
        assert!("color".parse::<ScoreFeature>().is_err());
    }

    #[test]
    fn test_variance_is_zero_for_uniform_scores() {
        let uniform = ScoreBreakdown {
            text_match: 0.6,
            semantic_relevance: 0.6,
            contextual_position: 0.6,
            visual_prominence: 0.6,
            interaction_history: 0.6,
        };
        assert!(uniform.variance().abs() < 1e-12);
        assert!((uniform.mean() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_variance_grows_with_disagreement() {
        let mixed = ScoreBreakdown {
            text_match: 1.0,
            semantic_relevance: 0.0,
            contextual_position: 1.0,
            visual_prominence: 0.0,
            interaction_history: 0.5,
        };
        assert!(mixed.variance() > 0.15);
    }
}
