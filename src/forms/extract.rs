//! Form control extraction
//!
//! Converts a single parsed element into a [`FieldDescriptor`]. Selection
//! lists reuse the radio rules, and take the value of their *last* option.

use crate::forms::field::{FieldDescriptor, FieldKind};
use scraper::ElementRef;

/// Builds a field descriptor from a form control element
///
/// # Rules
///
/// | Element | Kind | Value |
/// |---------|------|-------|
/// | `input`, `button` | `type` attribute | `value`, or `"on"` for checkboxes without one |
/// | `select` | radio | `value` of the last child option |
/// | `textarea` | text | text content |
/// | anything else | empty | empty |
///
/// Never fails: missing attributes and empty selects yield empty strings.
pub fn extract_field(element: ElementRef<'_>) -> FieldDescriptor {
    let node = element.value();

    let (kind, value) = match node.name() {
        "input" | "button" => {
            let tag = node.attr("type").unwrap_or("");
            let fallback = if tag == "checkbox" { "on" } else { "" };
            let value = node.attr("value").unwrap_or(fallback);
            (FieldKind::parse(tag), value.to_string())
        }
        "select" => {
            let value = element
                .children()
                .filter_map(ElementRef::wrap)
                .last()
                .and_then(|option| option.value().attr("value"))
                .unwrap_or("");
            (FieldKind::Radio, value.to_string())
        }
        "textarea" => (FieldKind::parse("text"), element.text().collect()),
        _ => (FieldKind::parse(""), String::new()),
    };

    FieldDescriptor {
        kind,
        name: node.attr("name").unwrap_or("").to_string(),
        value,
        attributes: node
            .attrs()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    }
}
