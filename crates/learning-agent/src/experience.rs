//! Experiences, feedback and the bounded experience buffer

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use navis_core_types::{Intent, PageContext, ScoreBreakdown, ScoredElement};
use serde::{Deserialize, Serialize};

use crate::errors::AgentError;
use crate::signature::{ActionSignature, StateSignature};

/// Intent plus page context a decision was taken in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionState {
    pub intent: Intent,
    pub context: PageContext,
}

impl DecisionState {
    pub fn new(intent: Intent, context: PageContext) -> Self {
        Self { intent, context }
    }

    pub fn signature(&self) -> StateSignature {
        StateSignature::of(&self.intent, &self.context)
    }
}

/// Kind of human feedback attached to an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    CorrectAction,
    WrongAction,
    BetterAlternative,
    UserSelection,
    /// Logged for the alternative the user pointed at; no adjustment
    UserCorrection,
}

impl FeedbackKind {
    /// Amount added to the base reward before clamping.
    pub fn reward_adjustment(&self) -> f64 {
        match self {
            FeedbackKind::CorrectAction => 0.5,
            FeedbackKind::WrongAction => -0.5,
            FeedbackKind::BetterAlternative => -0.2,
            FeedbackKind::UserSelection => 0.3,
            FeedbackKind::UserCorrection => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::CorrectAction => "correct_action",
            FeedbackKind::WrongAction => "wrong_action",
            FeedbackKind::BetterAlternative => "better_alternative",
            FeedbackKind::UserSelection => "user_selection",
            FeedbackKind::UserCorrection => "user_correction",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackKind {
    type Err = AgentError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "correct_action" | "correct" => Ok(FeedbackKind::CorrectAction),
            "wrong_action" | "wrong" => Ok(FeedbackKind::WrongAction),
            "better_alternative" => Ok(FeedbackKind::BetterAlternative),
            "user_selection" => Ok(FeedbackKind::UserSelection),
            "user_correction" => Ok(FeedbackKind::UserCorrection),
            other => Err(AgentError::UnknownFeedback(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    /// Element the user preferred instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<ActionSignature>,
    /// Whether the user's pick was the top-ranked candidate shown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_recommended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Feedback {
    pub fn new(kind: FeedbackKind) -> Self {
        Self {
            kind,
            alternative: None,
            was_recommended: None,
            comment: None,
        }
    }

    pub fn with_alternative(mut self, alternative: ActionSignature) -> Self {
        self.alternative = Some(alternative);
        self
    }

    pub fn recommended(mut self, was_recommended: bool) -> Self {
        self.was_recommended = Some(was_recommended);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Base reward shifted by the feedback adjustment, clamped to `[-1, 1]`.
///
/// A non-finite base reward counts as neutral.
pub fn effective_reward(reward: f64, feedback: Option<&Feedback>) -> f64 {
    let base = if reward.is_finite() { reward } else { 0.0 };
    let adjusted = base + feedback.map_or(0.0, |f| f.kind.reward_adjustment());
    adjusted.clamp(-1.0, 1.0)
}

/// One recorded outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub state: StateSignature,
    pub action: ActionSignature,
    pub scores: ScoreBreakdown,
    /// Effective reward in `[-1, 1]`
    pub reward: f64,
    pub next_state: Option<StateSignature>,
    pub feedback: Option<Feedback>,
    pub timestamp: DateTime<Utc>,
}

impl Experience {
    pub fn new(
        state: &DecisionState,
        action: &ScoredElement,
        reward: f64,
        next_state: Option<&DecisionState>,
        feedback: Option<Feedback>,
    ) -> Self {
        Self {
            state: state.signature(),
            action: action.signature(),
            scores: action.scores,
            reward,
            next_state: next_state.map(DecisionState::signature),
            feedback,
            timestamp: Utc::now(),
        }
    }
}

/// Fixed-capacity experience ring; the oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct ExperienceBuffer {
    capacity: usize,
    data: VecDeque<Experience>,
}

impl ExperienceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            data: VecDeque::new(),
        }
    }

    pub fn push(&mut self, experience: Experience) {
        if self.data.len() == self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(experience);
    }

    /// Up to `n` most recent experiences, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Experience> {
        let skip = self.data.len().saturating_sub(n);
        self.data.iter().skip(skip)
    }

    /// Every buffered experience, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
