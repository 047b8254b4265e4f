//! Parsed user intent

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{clamp_unit, deserialize_unit, CoreError};

/// Kind of action the user wants performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Navigate,
    Search,
    FillForm,
    Purchase,
    Contact,
    Read,
    Click,
    Select,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Navigate => "navigate",
            ActionType::Search => "search",
            ActionType::FillForm => "fill_form",
            ActionType::Purchase => "purchase",
            ActionType::Contact => "contact",
            ActionType::Read => "read",
            ActionType::Click => "click",
            ActionType::Select => "select",
        }
    }

    pub fn all() -> [ActionType; 8] {
        [
            ActionType::Navigate,
            ActionType::Search,
            ActionType::FillForm,
            ActionType::Purchase,
            ActionType::Contact,
            ActionType::Read,
            ActionType::Click,
            ActionType::Select,
        ]
    }
}

impl Default for ActionType {
    fn default() -> Self {
        ActionType::Click
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ActionType::all()
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownActionType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

/// Structured representation of a user's goal, produced once by the intent parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub goal: String,
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub requires_confirmation: bool,
    /// Parser confidence, always within `[0, 1]`.
    #[serde(default, deserialize_with = "deserialize_unit")]
    pub confidence: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub context_clues: Vec<String>,
}

impl Intent {
    pub fn new(goal: impl Into<String>, action_type: ActionType) -> Self {
        Self {
            goal: goal.into(),
            action_type,
            target: String::new(),
            urgency: Urgency::default(),
            requires_confirmation: false,
            confidence: 1.0,
            keywords: Vec::new(),
            context_clues: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context_clues<I, S>(mut self, clues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context_clues = clues.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }

    pub fn requiring_confirmation(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    /// Keywords with surrounding whitespace removed and blanks dropped.
    pub fn normalized_keywords(&self) -> Vec<String> {
        self.keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_round_trips_through_str() {
        for kind in ActionType::all() {
            assert_eq!(kind.as_str().parse::<ActionType>().unwrap(), kind);
        }
        assert!("teleport".parse::<ActionType>().is_err());
        assert_eq!(" Fill_Form ".parse::<ActionType>().unwrap(), ActionType::FillForm);
    }

    #[test]
    fn test_intent_deserializes_with_defaults() {
        let intent: Intent =
            serde_json::from_str(r#"{"goal":"log in","action_type":"fill_form"}"#).unwrap();
        assert_eq!(intent.action_type, ActionType::FillForm);
        assert_eq!(intent.urgency, Urgency::Medium);
        assert!(intent.keywords.is_empty());
    }

    #[test]
    fn test_builder_clamps_confidence() {
        let intent = Intent::new("buy", ActionType::Purchase).with_confidence(3.0);
        assert_eq!(intent.confidence, 1.0);
    }

    #[test]
    fn test_deserialized_confidence_is_clamped() {
        let high: Intent = serde_json::from_str(r#"{"goal":"buy","confidence":4.2}"#).unwrap();
        assert_eq!(high.confidence, 1.0);
        let low: Intent = serde_json::from_str(r#"{"goal":"buy","confidence":-0.5}"#).unwrap();
        assert_eq!(low.confidence, 0.0);
        let kept: Intent = serde_json::from_str(r#"{"goal":"buy","confidence":0.75}"#).unwrap();
        assert_eq!(kept.confidence, 0.75);
    }

    #[test]
    fn test_normalized_keywords_drop_blanks() {
        let intent = Intent::new("login", ActionType::Click).with_keywords(["  Login ", "", "  "]);
        assert_eq!(intent.normalized_keywords(), vec!["login".to_string()]);
    }
}
