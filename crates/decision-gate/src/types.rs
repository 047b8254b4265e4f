//! Decision values and gate configuration

use std::fmt;

use learning_agent::{AgentStatistics, Selection};
use navis_core_types::ScoredElement;
use serde::{Deserialize, Serialize};

use crate::errors::{GateError, Result};

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    NoCandidates,
    LowConfidence,
    HighConfidence,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::NoCandidates => "no_candidates",
            DecisionReason::LowConfidence => "low_confidence",
            DecisionReason::HighConfidence => "high_confidence",
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How sure the agent is about its recommendation, shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationTier {
    VeryUncertain,
    Uncertain,
    ModeratelyConfident,
    Confident,
}

impl ExplanationTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence < 0.3 {
            ExplanationTier::VeryUncertain
        } else if confidence < 0.5 {
            ExplanationTier::Uncertain
        } else if confidence < 0.7 {
            ExplanationTier::ModeratelyConfident
        } else {
            ExplanationTier::Confident
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationTier::VeryUncertain => "very uncertain",
            ExplanationTier::Uncertain => "uncertain",
            ExplanationTier::ModeratelyConfident => "moderately confident",
            ExplanationTier::Confident => "confident",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ExplanationTier::VeryUncertain => "Very uncertain - multiple similar options found",
            ExplanationTier::Uncertain => "Uncertain - please verify this is the correct element",
            ExplanationTier::ModeratelyConfident => "Moderately confident - please confirm",
            ExplanationTier::Confident => "Confident in this selection",
        }
    }
}

impl fmt::Display for ExplanationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`crate::DecisionGate::decide`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// Act on `selection` without asking
    Autonomous {
        selection: Selection,
        confidence: f64,
        /// Next best ranked candidates, the selected one excluded
        alternatives: Vec<ScoredElement>,
    },
    /// Ask the user to pick among `top_candidates`
    Disambiguation {
        reason: DecisionReason,
        confidence: f64,
        top_candidates: Vec<ScoredElement>,
        recommended: Option<Selection>,
        explanation: Option<ExplanationTier>,
    },
}

impl Decision {
    pub fn requires_user_selection(&self) -> bool {
        matches!(self, Decision::Disambiguation { .. })
    }

    pub fn reason(&self) -> DecisionReason {
        match self {
            Decision::Autonomous { .. } => DecisionReason::HighConfidence,
            Decision::Disambiguation { reason, .. } => *reason,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Decision::Autonomous { confidence, .. } | Decision::Disambiguation { confidence, .. } => {
                *confidence
            }
        }
    }

    /// The element the gate would act on, or recommends.
    pub fn chosen(&self) -> Option<&ScoredElement> {
        match self {
            Decision::Autonomous { selection, .. } => Some(&selection.candidate),
            Decision::Disambiguation { recommended, .. } => {
                recommended.as_ref().map(|s| &s.candidate)
            }
        }
    }

    pub fn explanation(&self) -> Option<&'static str> {
        match self {
            Decision::Disambiguation {
                explanation: Some(tier),
                ..
            } => Some(tier.message()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum confidence for autonomous action
    pub confidence_threshold: f64,
    /// Minimum effective score for autonomous action
    pub min_score: f64,
    /// Candidates listed in a disambiguation request
    pub presented_candidates: usize,
    /// Alternatives attached to an autonomous decision
    pub alternatives: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            min_score: 0.6,
            presented_candidates: 3,
            alternatives: 3,
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_unit(self.confidence_threshold) {
            return Err(GateError::InvalidThreshold(self.confidence_threshold));
        }
        if !is_unit(self.min_score) {
            return Err(GateError::InvalidConfig(format!(
                "min_score must be within [0, 1], got {}",
                self.min_score
            )));
        }
        if self.presented_candidates == 0 {
            return Err(GateError::InvalidConfig(
                "presented_candidates must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn is_unit(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateStatistics {
    pub confidence_threshold: f64,
    pub min_score: f64,
    pub agent: AgentStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_tiers_follow_confidence() {
        assert_eq!(ExplanationTier::from_confidence(0.1), ExplanationTier::VeryUncertain);
        assert_eq!(ExplanationTier::from_confidence(0.3), ExplanationTier::Uncertain);
        assert_eq!(ExplanationTier::from_confidence(0.69), ExplanationTier::ModeratelyConfident);
        assert_eq!(ExplanationTier::from_confidence(0.7), ExplanationTier::Confident);
        assert!(ExplanationTier::Uncertain.message().starts_with("Uncertain"));
    }

    #[test]
    fn test_config_validation() {
        assert!(GateConfig::default().validate().is_ok());
        let config = GateConfig {
            confidence_threshold: 1.2,
            ..GateConfig::default()
        };
        assert!(matches!(config.validate(), Err(GateError::InvalidThreshold(_))));
        let config = GateConfig {
            presented_candidates: 0,
            ..GateConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_candidates_decision_shape() {
        let decision = Decision::Disambiguation {
            reason: DecisionReason::NoCandidates,
            confidence: 0.0,
            top_candidates: Vec::new(),
            recommended: None,
            explanation: None,
        };
        assert!(decision.requires_user_selection());
        assert_eq!(decision.reason().as_str(), "no_candidates");
        assert!(decision.chosen().is_none());
        assert!(decision.explanation().is_none());
    }
}
