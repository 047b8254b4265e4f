//! Compaction keys for the value table

use std::fmt;

use navis_core_types::{Intent, PageContext};
use serde::{Deserialize, Serialize};

/// Action signatures are element signatures: `tag:type:role:first-20-chars(text)`.
pub use navis_core_types::ElementSignature as ActionSignature;

/// Characters of the URL kept in a state signature.
pub const STATE_URL_CHARS: usize = 50;

/// `action_type:first-50-chars(url):interactive element count`.
///
/// Lossy on purpose: two pages sharing a URL prefix and element count map to the same state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSignature(pub String);

impl StateSignature {
    pub fn of(intent: &Intent, context: &PageContext) -> Self {
        let url: String = context.url.chars().take(STATE_URL_CHARS).collect();
        Self(format!(
            "{}:{}:{}",
            intent.action_type, url, context.interactive_element_count
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
