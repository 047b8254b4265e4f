//! Element scorer - intent-aware ranking of page elements
//!
//! Each candidate element is scored on five independent signals:
//! - Text match against the intent keywords (exact and fuzzy)
//! - Semantic relevance of tag/attribute/role for the requested action
//! - Contextual position on the page and within landmarks
//! - Visual prominence (size, visibility, stacking)
//! - Past interaction history with similar elements
//!
//! The weighted sum gives the total score; agreement between the signals gives the confidence.

pub mod errors;
pub mod features;
pub mod scorer;
pub mod semantics;
pub mod similarity;
pub mod weights;

pub use errors::*;
pub use scorer::*;
pub use weights::*;
