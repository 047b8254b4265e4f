//! The five sub-score functions; each returns a value within `[0, 1]`

use navis_core_types::{clamp_unit, ActionType, Element, InteractionHistory};

use crate::semantics::expected_targets;
use crate::similarity::similarity;

/// Token similarity above which a keyword counts as a fuzzy hit.
pub const FUZZY_KEYWORD_THRESHOLD: f64 = 0.8;
/// Credit given to a fuzzy keyword hit relative to an exact one.
pub const FUZZY_KEYWORD_WEIGHT: f64 = 0.5;
/// Signature similarity above which a history entry is borrowed.
pub const HISTORY_SIMILARITY_THRESHOLD: f64 = 0.7;
/// Score used when no history applies.
pub const NEUTRAL_HISTORY_SCORE: f64 = 0.5;

const LANDMARK_TAGS: [&str; 3] = ["header", "nav", "main"];
/// Area (px²) at which the size contribution saturates.
const FULL_PROMINENCE_AREA: f64 = 20_000.0;

/// Fraction of keywords present in the element's text fields.
pub fn text_match(element: &Element, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let combined = element.combined_text();
    if combined.is_empty() {
        return 0.0;
    }
    let tokens: Vec<&str> = combined.split_whitespace().collect();

    let hits: f64 = keywords
        .iter()
        .map(|keyword| {
            if combined.contains(keyword.as_str()) {
                1.0
            } else if tokens
                .iter()
                .any(|token| similarity(keyword, token) > FUZZY_KEYWORD_THRESHOLD)
            {
                FUZZY_KEYWORD_WEIGHT
            } else {
                0.0
            }
        })
        .sum();

    clamp_unit(hits / keywords.len() as f64)
}

/// How well tag, attributes and role fit the requested action.
pub fn semantic_relevance(element: &Element, action_type: ActionType) -> f64 {
    let mut score = expected_targets(action_type).match_score(element);
    if element.clickable || element.is_displayed {
        score += 0.1;
    }
    clamp_unit(score)
}

/// Vertical position, landmark nesting and nearby context clues.
pub fn contextual_position(element: &Element, context_clues: &[String]) -> f64 {
    let mut score = 0.5;

    let y = element.position.y;
    if y < 200.0 {
        score += 0.3;
    } else if y < 500.0 {
        score += 0.1;
    }

    let in_landmark = element
        .parent_tags
        .iter()
        .any(|tag| LANDMARK_TAGS.contains(&tag.trim().to_ascii_lowercase().as_str()));
    if in_landmark {
        score += 0.2;
    }

    if !context_clues.is_empty() {
        let nearby = element.nearby_text.to_lowercase();
        let clue_present = context_clues
            .iter()
            .map(|clue| clue.trim().to_lowercase())
            .filter(|clue| !clue.is_empty())
            .any(|clue| nearby.contains(&clue));
        if clue_present {
            score += 0.3;
        }
    }

    clamp_unit(score)
}

/// Size, visibility, enabled state and stacking order.
pub fn visual_prominence(element: &Element) -> f64 {
    let mut score = 0.0;

    let area = element.size.area();
    if area > 0.0 {
        score += (area / FULL_PROMINENCE_AREA).min(1.0) * 0.4;
    }
    if element.is_displayed {
        score += 0.3;
    }
    if element.is_enabled {
        score += 0.2;
    }
    if element.z_index > 0 {
        score += 0.1;
    }

    clamp_unit(score)
}

/// Past success with this element, or with the most similar known element.
pub fn interaction_history(
    element: &Element,
    action_type: ActionType,
    history: Option<&InteractionHistory>,
) -> f64 {
    let Some(history) = history.filter(|h| !h.is_empty()) else {
        return NEUTRAL_HISTORY_SCORE;
    };

    let signature = element.signature();
    if let Some(score) = history.get(action_type, &signature) {
        return clamp_unit(score);
    }

    // Highest similarity wins; equal similarities keep the first in signature order.
    let mut nearest: Option<(f64, f64)> = None;
    for (known, score) in history.entries_for(action_type) {
        let sim = similarity(signature.as_str(), known.as_str());
        if sim > HISTORY_SIMILARITY_THRESHOLD && nearest.map_or(true, |(best, _)| sim > best) {
            nearest = Some((sim, score));
        }
    }

    match nearest {
        Some((sim, score)) => clamp_unit(score * sim),
        None => NEUTRAL_HISTORY_SCORE,
    }
}
