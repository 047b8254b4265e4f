//! Element scorer orchestrating the five sub-scores

use std::cmp::Ordering;
use std::fmt::Write as _;

use navis_core_types::{
    clamp_unit, Element, Intent, InteractionHistory, ScoreBreakdown, ScoreFeature, ScoredElement,
};
use tracing::{debug, info, warn};

use crate::errors::{Result, ScorerError};
use crate::features;
use crate::weights::ScoringWeights;

/// Stateless ranking of page elements against an intent.
#[derive(Debug, Clone, Default)]
pub struct ElementScorer {
    weights: ScoringWeights,
}

impl ElementScorer {
    /// Create a scorer with the default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer with custom weights
    pub fn with_weights(weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score and rank `elements`, best first.
    ///
    /// Ties on total score keep input order. Elements that cannot be scored are skipped.
    pub fn score(
        &self,
        elements: &[Element],
        intent: &Intent,
        history: Option<&InteractionHistory>,
    ) -> Vec<ScoredElement> {
        if elements.is_empty() {
            warn!("No elements to score for intent '{}'", intent.goal);
            return Vec::new();
        }

        let keywords = intent.normalized_keywords();
        let mut scored: Vec<ScoredElement> = elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| {
                match self.score_element(index, element, intent, &keywords, history) {
                    Ok(scored) => Some(scored),
                    Err(err) => {
                        warn!("Skipping element: {}", err);
                        None
                    }
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.index.cmp(&b.index))
        });
        for (position, candidate) in scored.iter_mut().enumerate() {
            candidate.rank = position + 1;
        }

        info!(
            "Scored {} of {} elements for {} intent",
            scored.len(),
            elements.len(),
            intent.action_type
        );
        if let Some(best) = scored.first() {
            debug!(
                "Best candidate {} total={:.3} confidence={:.3}",
                best.label(),
                best.total_score,
                best.confidence
            );
        }

        scored
    }

    /// Score one element; `keywords` must already be normalized.
    pub fn score_element(
        &self,
        index: usize,
        element: &Element,
        intent: &Intent,
        keywords: &[String],
        history: Option<&InteractionHistory>,
    ) -> Result<ScoredElement> {
        if !element.has_finite_geometry() {
            return Err(ScorerError::InvalidElement {
                index,
                reason: "non-finite position or size".to_string(),
            });
        }

        let scores = ScoreBreakdown {
            text_match: features::text_match(element, keywords),
            semantic_relevance: features::semantic_relevance(element, intent.action_type),
            contextual_position: features::contextual_position(element, &intent.context_clues),
            visual_prominence: features::visual_prominence(element),
            interaction_history: features::interaction_history(
                element,
                intent.action_type,
                history,
            ),
        };

        if let Some((feature, value)) = scores.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScorerError::InvalidElement {
                index,
                reason: format!("{} evaluated to {}", feature, value),
            });
        }

        let total_score = clamp_unit(self.weights.total(&scores));
        let confidence = clamp_unit(total_score * (1.0 - scores.variance()));

        debug!(
            "Element #{} <{}> total={:.3} confidence={:.3}",
            index, element.tag, total_score, confidence
        );

        Ok(ScoredElement {
            element: element.clone(),
            index,
            scores,
            total_score,
            confidence,
            rank: 0,
        })
    }

    /// Human-readable breakdown of a scored element.
    pub fn explain_score(&self, scored: &ScoredElement) -> String {
        let mut out = format!(
            "#{} {}\nScore: {:.3}\nConfidence: {:.3}\n",
            scored.rank,
            scored.label(),
            scored.total_score,
            scored.confidence
        );
        for feature in ScoreFeature::ALL {
            let value = scored.scores.get(feature);
            let weight = self.weights.get(feature);
            let _ = writeln!(
                out,
                "  {:<20} {:.3} x {:.2} = {:.3}",
                feature.name(),
                value,
                weight,
                value * weight
            );
        }
        out
    }
}

/// The first `n` candidates scoring at least `min_score`, keeping their order.
pub fn top_candidates(scored: &[ScoredElement], n: usize, min_score: f64) -> Vec<ScoredElement> {
    scored
        .iter()
        .filter(|candidate| candidate.total_score >= min_score)
        .take(n)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use navis_core_types::ActionType;

    fn login_button() -> Element {
        Element::new("button")
            .with_type("submit")
            .with_text("Login")
            .with_aria_label("Login button")
            .at(0.0, 50.0)
            .sized(100.0, 40.0)
            .visible()
    }

    #[test]
    fn test_empty_input_yields_empty_ranking() {
        let scorer = ElementScorer::new();
        let intent = Intent::new("log in", ActionType::Click);
        assert!(scorer.score(&[], &intent, None).is_empty());
    }

    #[test]
    fn test_ranks_are_one_based_and_sorted() {
        let scorer = ElementScorer::new();
        let intent = Intent::new("log in", ActionType::Click).with_keywords(["login"]);
        let elements = vec![
            Element::new("span").with_text("Footer").at(0.0, 900.0),
            login_button(),
        ];
        let ranked = scorer.score(&elements, &intent, None);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert!(ranked[0].total_score >= ranked[1].total_score);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let scorer = ElementScorer::new();
        let intent = Intent::new("open", ActionType::Click);
        let same = Element::new("a").with_text("More").at(0.0, 300.0);
        let ranked = scorer.score(&[same.clone(), same.clone(), same], &intent, None);
        let order: Vec<usize> = ranked.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_non_finite_geometry_is_skipped() {
        let scorer = ElementScorer::new();
        let intent = Intent::new("log in", ActionType::Click);
        let broken = Element::new("button").at(f64::NAN, 10.0);
        let ranked = scorer.score(&[broken, login_button()], &intent, None);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 1);

        let err = scorer
            .score_element(0, &Element::new("a").sized(f64::INFINITY, 1.0), &intent, &[], None)
            .unwrap_err();
        assert!(matches!(err, ScorerError::InvalidElement { index: 0, .. }));
    }

    #[test]
    fn test_custom_weights_change_totals() {
        let text_only = ScoringWeights::new(1.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        let scorer = ElementScorer::with_weights(text_only).unwrap();
        let intent = Intent::new("log in", ActionType::Click).with_keywords(["login"]);
        let ranked = scorer.score(&[login_button()], &intent, None);
        assert!((ranked[0].total_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_explanation_lists_every_feature() {
        let scorer = ElementScorer::new();
        let intent = Intent::new("log in", ActionType::Click).with_keywords(["login"]);
        let ranked = scorer.score(&[login_button()], &intent, None);
        let text = scorer.explain_score(&ranked[0]);
        assert!(text.contains("Score:"));
        assert!(text.contains("Confidence:"));
        for feature in ScoreFeature::ALL {
            assert!(text.contains(feature.name()));
        }
    }

    #[test]
    fn test_top_candidates_filters_then_truncates() {
        let scorer = ElementScorer::new();
        let intent = Intent::new("log in", ActionType::Click).with_keywords(["login"]);
        let elements = vec![
            login_button(),
            Element::new("a").with_text("Login help").at(0.0, 100.0).visible(),
            Element::new("div").at(0.0, 2000.0),
        ];
        let ranked = scorer.score(&elements, &intent, None);
        let top = top_candidates(&ranked, 1, 0.0);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].index, 0);

        let strong = top_candidates(&ranked, 10, 0.6);
        assert!(strong.iter().all(|c| c.total_score >= 0.6));
        assert!(strong.len() < ranked.len());
    }
}
