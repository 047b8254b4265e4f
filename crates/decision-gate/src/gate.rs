//! Confidence gate over the learning agent's selection

use learning_agent::{DecisionState, Feedback, FeedbackKind, LearningAgent};
use navis_core_types::{Intent, PageContext, ScoredElement};
use tracing::{info, warn};

use crate::errors::{GateError, Result};
use crate::types::{
    is_unit, Decision, DecisionReason, ExplanationTier, GateConfig, GateStatistics,
};

/// Decides between acting and asking, and feeds outcomes back to its agent.
#[derive(Debug)]
pub struct DecisionGate {
    config: GateConfig,
    agent: LearningAgent,
}

impl DecisionGate {
    pub fn new(config: GateConfig, agent: LearningAgent) -> Result<Self> {
        config.validate()?;
        info!(
            "Decision gate initialized with threshold={}",
            config.confidence_threshold
        );
        Ok(Self { config, agent })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.config.confidence_threshold
    }

    pub fn agent(&self) -> &LearningAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut LearningAgent {
        &mut self.agent
    }

    /// Decide what to do with ranked `candidates`.
    pub fn decide(
        &mut self,
        candidates: &[ScoredElement],
        intent: &Intent,
        context: &PageContext,
    ) -> Decision {
        let Some(selection) = self.agent.select(candidates, intent, context) else {
            warn!("No candidates provided for decision");
            return Decision::Disambiguation {
                reason: DecisionReason::NoCandidates,
                confidence: 0.0,
                top_candidates: Vec::new(),
                recommended: None,
                explanation: None,
            };
        };

        let confidence = selection.candidate.confidence;
        let score = selection.effective_score();
        info!(
            "Selected {} via {}: confidence={:.2}, score={:.2}",
            selection.candidate.label(),
            selection.method,
            confidence,
            score
        );

        if confidence >= self.config.confidence_threshold && score >= self.config.min_score {
            let chosen = selection.candidate.index;
            let alternatives = candidates
                .iter()
                .filter(|c| c.index != chosen)
                .take(self.config.alternatives)
                .cloned()
                .collect();
            Decision::Autonomous {
                selection,
                confidence,
                alternatives,
            }
        } else {
            let top_candidates = candidates
                .iter()
                .take(self.config.presented_candidates)
                .cloned()
                .collect();
            Decision::Disambiguation {
                reason: DecisionReason::LowConfidence,
                confidence,
                top_candidates,
                recommended: Some(selection),
                explanation: Some(ExplanationTier::from_confidence(confidence)),
            }
        }
    }

    /// The user picked `selected` out of the `shown` candidates.
    pub fn record_user_selection(
        &mut self,
        shown: &[ScoredElement],
        selected: &ScoredElement,
        state: &DecisionState,
    ) -> f64 {
        let was_recommended = shown
            .first()
            .map_or(false, |top| top.index == selected.index);
        info!(
            "Recording user selection: {} (top ranked: {})",
            selected.label(),
            was_recommended
        );
        let feedback = Feedback::new(FeedbackKind::UserSelection)
            .with_alternative(selected.signature())
            .recommended(was_recommended);
        self.agent.record(state, selected, 1.0, None, Some(feedback))
    }

    /// An executed action succeeded or failed.
    pub fn record_action_result(
        &mut self,
        action: &ScoredElement,
        state: &DecisionState,
        success: bool,
        next_state: Option<&DecisionState>,
        feedback: Option<Feedback>,
    ) -> f64 {
        let reward = if success { 1.0 } else { -1.0 };
        info!(
            "Recording action result: success={}, reward={}, has_feedback={}",
            success,
            reward,
            feedback.is_some()
        );
        self.agent.record(state, action, reward, next_state, feedback)
    }

    /// Explicit human feedback on `action`.
    ///
    /// A better alternative is also recorded as a positive experience of its own.
    pub fn record_feedback(
        &mut self,
        action: &ScoredElement,
        state: &DecisionState,
        kind: FeedbackKind,
        alternative: Option<&ScoredElement>,
    ) -> f64 {
        let reward = match kind {
            FeedbackKind::CorrectAction => 1.0,
            FeedbackKind::WrongAction => -1.0,
            _ => 0.0,
        };
        info!("Recording feedback: type={}", kind);

        let mut feedback = Feedback::new(kind);
        if let Some(alt) = alternative {
            feedback = feedback.with_alternative(alt.signature());
        }
        let recorded = self.agent.record(state, action, reward, None, Some(feedback));

        if let (FeedbackKind::BetterAlternative, Some(alt)) = (kind, alternative) {
            self.agent.record(
                state,
                alt,
                1.0,
                None,
                Some(Feedback::new(FeedbackKind::UserCorrection)),
            );
        }
        recorded
    }

    /// Accepts thresholds within `[0, 1]`; anything else leaves the threshold unchanged.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        if !is_unit(threshold) {
            warn!("Invalid threshold: {}, must be between 0 and 1", threshold);
            return Err(GateError::InvalidThreshold(threshold));
        }
        self.config.confidence_threshold = threshold;
        info!("Confidence threshold updated to {}", threshold);
        Ok(())
    }

    pub fn statistics(&self) -> GateStatistics {
        GateStatistics {
            confidence_threshold: self.config.confidence_threshold,
            min_score: self.config.min_score,
            agent: self.agent.statistics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learning_agent::AgentConfig;
    use navis_core_types::{ActionType, Element, ScoreBreakdown};

    fn candidate(text: &str, index: usize, total: f64, confidence: f64) -> ScoredElement {
        ScoredElement {
            element: Element::new("button").with_text(text),
            index,
            scores: ScoreBreakdown::default(),
            total_score: total,
            confidence,
            rank: index + 1,
        }
    }

    fn gate() -> DecisionGate {
        let agent =
            LearningAgent::new(AgentConfig::default().with_exploration(0.0, 0.0).with_seed(7))
                .unwrap();
        DecisionGate::new(GateConfig::default(), agent).unwrap()
    }

    fn state() -> DecisionState {
        DecisionState::new(
            Intent::new("checkout", ActionType::Purchase),
            PageContext::new("https://shop.example.com/cart", 8),
        )
    }

    #[test]
    fn test_empty_candidates_need_the_user() {
        let mut gate = gate();
        let s = state();
        let decision = gate.decide(&[], &s.intent, &s.context);
        assert!(decision.requires_user_selection());
        assert_eq!(decision.reason(), DecisionReason::NoCandidates);
    }

    #[test]
    fn test_confident_strong_pick_is_autonomous_with_alternatives() {
        let mut gate = gate();
        let s = state();
        let candidates: Vec<_> = (0..5)
            .map(|i| candidate(&format!("c{i}"), i, 0.95 - i as f64 * 0.05, 0.9))
            .collect();
        let decision = gate.decide(&candidates, &s.intent, &s.context);

        assert!(!decision.requires_user_selection());
        assert_eq!(decision.reason(), DecisionReason::HighConfidence);
        match decision {
            Decision::Autonomous {
                selection,
                alternatives,
                ..
            } => {
                assert_eq!(selection.candidate.index, 0);
                let idx: Vec<usize> = alternatives.iter().map(|c| c.index).collect();
                assert_eq!(idx, vec![1, 2, 3]);
            }
            other => panic!("expected autonomous decision, got {other:?}"),
        }
    }

    #[test]
    fn test_low_score_forces_disambiguation_despite_confidence() {
        let mut gate = gate();
        let s = state();
        let top = candidate("pay", 0, 0.55 / 0.7, 0.9);
        let candidates = vec![top, candidate("cancel", 1, 0.3, 0.2)];

        let decision = gate.decide(&candidates, &s.intent, &s.context);
        assert!(decision.requires_user_selection());
        assert_eq!(decision.reason().as_str(), "low_confidence");
        match decision {
            Decision::Disambiguation {
                top_candidates,
                recommended,
                explanation,
                ..
            } => {
                assert_eq!(top_candidates.len(), 2);
                let recommended = recommended.unwrap();
                assert!((recommended.effective_score() - 0.55).abs() < 1e-9);
                assert_eq!(explanation, Some(ExplanationTier::Confident));
            }
            other => panic!("expected disambiguation, got {other:?}"),
        }
    }

    #[test]
    fn test_explanation_reflects_low_confidence() {
        let mut gate = gate();
        let s = state();
        let candidates = vec![candidate("maybe", 0, 0.9, 0.25)];
        let decision = gate.decide(&candidates, &s.intent, &s.context);
        assert_eq!(
            decision.explanation(),
            Some("Very uncertain - multiple similar options found")
        );
    }

    #[test]
    fn test_threshold_changes_are_validated() {
        let mut gate = gate();
        assert!(gate.set_threshold(0.4).is_ok());
        assert_eq!(gate.threshold(), 0.4);
        assert!(gate.set_threshold(1.5).is_err());
        assert!(gate.set_threshold(f64::NAN).is_err());
        assert!(gate.set_threshold(-0.1).is_err());
        assert_eq!(gate.threshold(), 0.4);
    }

    #[test]
    fn test_outcome_rewards_follow_the_fixed_mapping() {
        let mut gate = gate();
        let s = state();
        let pay = candidate("pay", 0, 0.8, 0.8);
        let cancel = candidate("cancel", 1, 0.4, 0.4);

        assert_eq!(gate.record_user_selection(&[pay.clone(), cancel.clone()], &cancel, &s), 1.0);
        assert_eq!(gate.record_action_result(&pay, &s, true, None, None), 1.0);
        assert_eq!(gate.record_action_result(&pay, &s, false, None, None), -1.0);
        assert_eq!(gate.record_feedback(&pay, &s, FeedbackKind::CorrectAction, None), 1.0);
        assert_eq!(gate.record_feedback(&pay, &s, FeedbackKind::WrongAction, None), -1.0);
        assert_eq!(gate.agent().total_recorded(), 5);
    }

    #[test]
    fn test_recommendation_is_matched_by_index() {
        let mut gate = gate();
        let s = state();
        let first = candidate("next", 0, 0.8, 0.8);
        let twin = candidate("next", 1, 0.7, 0.7);
        assert_eq!(first.signature(), twin.signature());

        gate.record_user_selection(&[first.clone(), twin.clone()], &twin, &s);
        gate.record_user_selection(&[first.clone(), twin], &first, &s);
        let flags: Vec<Option<bool>> = gate
            .agent()
            .snapshot()
            .experiences
            .iter()
            .map(|e| e.feedback.as_ref().and_then(|f| f.was_recommended))
            .collect();
        assert_eq!(flags, vec![Some(false), Some(true)]);
    }

    #[test]
    fn test_better_alternative_logs_a_second_positive_experience() {
        let mut gate = gate();
        let s = state();
        let pay = candidate("pay", 0, 0.8, 0.8);
        let express = candidate("express checkout", 1, 0.7, 0.7);

        let reward =
            gate.record_feedback(&pay, &s, FeedbackKind::BetterAlternative, Some(&express));
        assert!((reward + 0.2).abs() < 1e-12);
        assert_eq!(gate.agent().total_recorded(), 2);

        let sig = s.signature();
        assert!(gate.agent().value_estimate(&sig, &express.signature()) > 0.0);
        assert!(gate.agent().value_estimate(&sig, &pay.signature()) < 0.0);
        assert_eq!(gate.agent().success_rate(&express.signature()), 1.0);
    }

    #[test]
    fn test_statistics_include_threshold_and_agent() {
        let gate = gate();
        let stats = gate.statistics();
        assert_eq!(stats.confidence_threshold, 0.7);
        assert_eq!(stats.agent.experience_count, 0);
    }
}
