//! Interaction history consulted by the scorer

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{clamp_unit, ActionType, ElementSignature};

/// Past success per `(action type, element signature)`, each value within `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InteractionHistory {
    entries: BTreeMap<ActionType, BTreeMap<ElementSignature, f64>>,
}

impl<'de> Deserialize<'de> for InteractionHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries =
            BTreeMap::<ActionType, BTreeMap<ElementSignature, f64>>::deserialize(deserializer)?;
        for score in entries.values_mut().flat_map(BTreeMap::values_mut) {
            *score = clamp_unit(*score);
        }
        Ok(Self { entries })
    }
}

impl InteractionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry; the score is clamped to `[0, 1]`.
    pub fn record(&mut self, action_type: ActionType, signature: ElementSignature, score: f64) {
        self.entries
            .entry(action_type)
            .or_default()
            .insert(signature, clamp_unit(score));
    }

    pub fn with_entry(
        mut self,
        action_type: ActionType,
        signature: impl Into<String>,
        score: f64,
    ) -> Self {
        self.record(action_type, ElementSignature(signature.into()), score);
        self
    }

    pub fn get(&self, action_type: ActionType, signature: &ElementSignature) -> Option<f64> {
        self.entries
            .get(&action_type)
            .and_then(|by_sig| by_sig.get(signature))
            .copied()
    }

    /// Entries recorded for one action type, in signature order.
    pub fn entries_for(
        &self,
        action_type: ActionType,
    ) -> impl Iterator<Item = (&ElementSignature, f64)> + '_ {
        self.entries
            .get(&action_type)
            .into_iter()
            .flat_map(|by_sig| by_sig.iter().map(|(sig, score)| (sig, *score)))
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
