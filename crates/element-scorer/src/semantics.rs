//! Expected element shapes per action type

use navis_core_types::{ActionType, Element};

/// `tag[attribute="value"]` pattern.
#[derive(Debug, Clone, Copy)]
pub struct TagAttribute {
    pub tag: &'static str,
    pub attribute: &'static str,
    pub value: &'static str,
}

const fn attr(tag: &'static str, attribute: &'static str, value: &'static str) -> TagAttribute {
    TagAttribute {
        tag,
        attribute,
        value,
    }
}

/// Tags, tag+attribute combinations and roles an action is expected to target.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedTargets {
    pub tag_attributes: &'static [TagAttribute],
    pub tags: &'static [&'static str],
    pub roles: &'static [&'static str],
}

pub const EXACT_MATCH_SCORE: f64 = 1.0;
pub const TAG_MATCH_SCORE: f64 = 0.8;
pub const ROLE_MATCH_SCORE: f64 = 0.7;

pub fn expected_targets(action_type: ActionType) -> ExpectedTargets {
    match action_type {
        ActionType::Click => ExpectedTargets {
            tag_attributes: {
                const T: &[TagAttribute] = &[
                    attr("input", "type", "submit"),
                    attr("input", "type", "button"),
                    attr("button", "type", "submit"),
                ];
                T
            },
            tags: &["button", "a"],
            roles: &["button", "link", "menuitem"],
        },
        ActionType::Navigate => ExpectedTargets {
            tag_attributes: &[],
            tags: &["a", "button", "nav"],
            roles: &["link", "navigation"],
        },
        ActionType::FillForm => ExpectedTargets {
            tag_attributes: {
                const T: &[TagAttribute] = &[
                    attr("input", "type", "text"),
                    attr("input", "type", "email"),
                    attr("input", "type", "password"),
                ];
                T
            },
            tags: &["input", "textarea", "select"],
            roles: &["textbox", "searchbox", "combobox"],
        },
        ActionType::Search => ExpectedTargets {
            tag_attributes: {
                const T: &[TagAttribute] = &[
                    attr("input", "type", "search"),
                    attr("input", "type", "text"),
                ];
                T
            },
            tags: &["form"],
            roles: &["searchbox", "textbox"],
        },
        ActionType::Purchase => ExpectedTargets {
            tag_attributes: {
                const T: &[TagAttribute] = &[
                    attr("button", "type", "submit"),
                    attr("input", "type", "submit"),
                ];
                T
            },
            tags: &["button", "a"],
            roles: &["button", "link"],
        },
        ActionType::Contact => ExpectedTargets {
            tag_attributes: {
                const T: &[TagAttribute] =
                    &[attr("input", "type", "email"), attr("input", "type", "tel")];
                T
            },
            tags: &["a", "button", "form", "textarea"],
            roles: &["link", "button", "textbox"],
        },
        ActionType::Read => ExpectedTargets {
            tag_attributes: &[],
            tags: &["article", "main", "section", "p", "a"],
            roles: &["article", "main", "link", "heading"],
        },
        ActionType::Select => ExpectedTargets {
            tag_attributes: {
                const T: &[TagAttribute] = &[
                    attr("input", "type", "radio"),
                    attr("input", "type", "checkbox"),
                ];
                T
            },
            tags: &["select", "option"],
            roles: &["option", "radio", "checkbox", "listbox", "combobox"],
        },
    }
}

impl ExpectedTargets {
    /// Best of exact tag+attribute (1.0), tag-only (0.8) and role-only (0.7); 0.0 when nothing
    /// matches.
    pub fn match_score(&self, element: &Element) -> f64 {
        let tag = element.tag.trim().to_ascii_lowercase();
        let role = element.role.trim().to_ascii_lowercase();
        let mut score: f64 = 0.0;

        let exact = self.tag_attributes.iter().any(|pattern| {
            pattern.tag == tag
                && element
                    .attribute(pattern.attribute)
                    .map(|v| v.trim().eq_ignore_ascii_case(pattern.value))
                    .unwrap_or(false)
        });
        if exact {
            score = score.max(EXACT_MATCH_SCORE);
        }
        if self.tags.contains(&tag.as_str()) {
            score = score.max(TAG_MATCH_SCORE);
        }
        if !role.is_empty() && self.roles.contains(&role.as_str()) {
            score = score.max(ROLE_MATCH_SCORE);
        }
        score
    }
}
