use crate::forms::extract::extract_field;
use crate::forms::field::FieldDescriptor;
use scraper::{Html, Selector};

/// A form found in a page, with its controls in document order
#[derive(Debug, Clone)]
pub struct DiscoveredForm {
    /// Raw `action` attribute (may be relative)
    pub action: String,

    /// Upper-cased `method` attribute, `GET` when absent
    pub method: String,

    /// Extracted controls
    pub fields: Vec<FieldDescriptor>,
}

/// Finds every form with an `action` attribute and extracts its controls
///
/// Controls are `input`, `button`, `select` and `textarea` elements nested in
/// the form, kept in document order since the fill engine depends on it.
pub fn discover_forms(html: &str) -> Vec<DiscoveredForm> {
    let document = Html::parse_document(html);
    let mut forms = Vec::new();

    let (Ok(form_selector), Ok(control_selector)) = (
        Selector::parse("form[action]"),
        Selector::parse("input, button, select, textarea"),
    ) else {
        return forms;
    };

    for form in document.select(&form_selector) {
        let action = form.value().attr("action").unwrap_or("").to_string();
        let method = form
            .value()
            .attr("method")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("get")
            .trim()
            .to_uppercase();

        let fields: Vec<FieldDescriptor> = form
            .select(&control_selector)
            .map(extract_field)
            .collect();

        tracing::debug!(
            "Discovered form {} {} with {} fields",
            method,
            action,
            fields.len()
        );

        forms.push(DiscoveredForm {
            action,
            method,
            fields,
        });
    }

    forms
}
