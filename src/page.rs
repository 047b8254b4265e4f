//! Page snapshots handed in by page inspection

use std::path::Path;

use anyhow::{Context, Result};
use learning_agent::DecisionState;
use navis_core_types::{Element, Intent, PageContext};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// A parsed intent together with the elements visible on the page at that moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub intent: Intent,
    #[serde(default)]
    pub context: PageContext,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl PageSnapshot {
    pub fn new(intent: Intent, context: PageContext, elements: Vec<Element>) -> Self {
        Self {
            intent,
            context,
            elements,
        }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let mut snapshot: PageSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parsing page snapshot {}", path.display()))?;
        if snapshot.context.interactive_element_count == 0 {
            snapshot.context.interactive_element_count = snapshot.elements.len();
        }
        Ok(snapshot)
    }

    pub fn decision_state(&self) -> DecisionState {
        DecisionState::new(self.intent.clone(), self.context.clone())
    }
}
