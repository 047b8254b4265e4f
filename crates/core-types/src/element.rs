//! Page element snapshots

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading text characters that take part in an element signature.
pub const SIGNATURE_TEXT_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Size {
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Interactive element as reported by page inspection. Never mutated after capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    pub tag: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub role: String,
    pub text: String,
    pub aria_label: String,
    pub title: String,
    pub placeholder: String,
    pub value: String,
    pub position: Position,
    pub size: Size,
    pub is_displayed: bool,
    pub is_enabled: bool,
    pub clickable: bool,
    pub z_index: i32,
    pub parent_tags: Vec<String>,
    pub nearby_text: String,
    /// Any further attributes captured by the inspector.
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = element_type.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = label.into();
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = Size { width, height };
        self
    }

    pub fn visible(mut self) -> Self {
        self.is_displayed = true;
        self.is_enabled = true;
        self
    }

    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_tags = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_nearby_text(mut self, text: impl Into<String>) -> Self {
        self.nearby_text = text.into();
        self
    }

    /// Look up an attribute by its HTML name, covering the first-class fields.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        let value = match name {
            "type" => self.element_type.as_str(),
            "role" => self.role.as_str(),
            "aria-label" | "aria_label" => self.aria_label.as_str(),
            "title" => self.title.as_str(),
            "placeholder" => self.placeholder.as_str(),
            "value" => self.value.as_str(),
            other => return self.attributes.get(other).map(String::as_str),
        };
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Lowercased concatenation of every human-readable text field.
    pub fn combined_text(&self) -> String {
        [
            self.text.as_str(),
            self.aria_label.as_str(),
            self.title.as_str(),
            self.placeholder.as_str(),
            self.value.as_str(),
        ]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }

    pub fn signature(&self) -> ElementSignature {
        ElementSignature::of(self)
    }

    /// Whether the geometry is usable for scoring.
    pub fn has_finite_geometry(&self) -> bool {
        [
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Compact, intentionally lossy key identifying an element across snapshots:
/// `tag:type:role:first-20-chars(text)`, lowercased, blank parts omitted.
///
/// Distinct elements sharing these four fields collide on the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementSignature(pub String);

impl ElementSignature {
    pub fn of(element: &Element) -> Self {
        let text: String = element.text.trim().chars().take(SIGNATURE_TEXT_CHARS).collect();
        let joined = [
            element.tag.trim(),
            element.element_type.trim(),
            element.role.trim(),
            text.trim(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(":");
        Self(joined.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page-level context accompanying an element snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub interactive_element_count: usize,
}

impl PageContext {
    pub fn new(url: impl Into<String>, interactive_element_count: usize) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            interactive_element_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_omits_blank_fields_and_truncates_text() {
        let element = Element::new("BUTTON")
            .with_type("submit")
            .with_text("Login to your account right now");
        assert_eq!(
            element.signature().as_str(),
            "button:submit:login to your accoun"
        );

        let bare = Element::new("a").with_text("Sign in");
        assert_eq!(bare.signature().as_str(), "a:sign in");
    }

    #[test]
    fn test_combined_text_joins_non_empty_fields() {
        let element = Element::new("button")
            .with_text("Login")
            .with_aria_label("Login button");
        assert_eq!(element.combined_text(), "login login button");
    }

    #[test]
    fn test_attribute_lookup_covers_fields_and_extras() {
        let mut element = Element::new("input").with_type("search");
        element
            .attributes
            .insert("name".to_string(), "q".to_string());
        assert_eq!(element.attribute("type"), Some("search"));
        assert_eq!(element.attribute("name"), Some("q"));
        assert_eq!(element.attribute("role"), None);
    }

    #[test]
    fn test_element_deserializes_type_field() {
        let element: Element = serde_json::from_str(
            r#"{"tag":"input","type":"text","position":{"y":30},"is_displayed":true}"#,
        )
        .unwrap();
        assert_eq!(element.element_type, "text");
        assert_eq!(element.position.y, 30.0);
        assert!(element.is_displayed);
        assert!(!element.is_enabled);
    }

    #[test]
    fn test_non_finite_geometry_is_detected() {
        let element = Element::new("div").sized(f64::NAN, 10.0);
        assert!(!element.has_finite_geometry());
        assert!(Element::new("div").sized(10.0, 10.0).has_finite_geometry());
    }
}
