//! Value estimates per (state, action)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::signature::{ActionSignature, StateSignature};

/// Two-level map `state -> action -> value`.
///
/// Entries are created lazily on first update and never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueTable {
    entries: BTreeMap<StateSignature, BTreeMap<ActionSignature, f64>>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current estimate; 0.0 when unseen.
    pub fn get(&self, state: &StateSignature, action: &ActionSignature) -> f64 {
        self.entries
            .get(state)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Best estimate recorded for any action in `state`.
    pub fn max_for_state(&self, state: &StateSignature) -> Option<f64> {
        self.entries
            .get(state)?
            .values()
            .copied()
            .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v))))
    }

    pub fn set(&mut self, state: StateSignature, action: ActionSignature, value: f64) {
        self.entries.entry(state).or_default().insert(action, value);
    }

    /// Total number of (state, action) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mean(&self) -> f64 {
        let len = self.len();
        if len == 0 {
            return 0.0;
        }
        self.values().sum::<f64>() / len as f64
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.values().flat_map(|actions| actions.values().copied())
    }
}
