//! Form fill inference
//!
//! Two ordered passes over the fields of one form:
//!
//! 1. Structural values. The first radio of a name wins, the last checkbox of
//!    a name wins, any other field with a non-empty value keeps it.
//! 2. Inference. Every name still missing from the map, or holding an empty
//!    value, gets a value derived from its kind and the [`FillProfile`].
//!
//! The result is a pure function of the field order, the fields and the
//! profile. Empty names and values are not filtered here.

use crate::forms::field::{FieldDescriptor, FieldKind};
use crate::forms::profile::FillProfile;
use std::collections::HashMap;

/// Field name to suggested value
pub type SuggestionMap = HashMap<String, String>;

const DEFAULT_MIN: i64 = 1;
const DEFAULT_MAX: i64 = 10;
const DEFAULT_STEP: i64 = 1;

/// Suggests a value for every distinct field name
///
/// # Arguments
///
/// * `fields` - The form's fields, in document order
/// * `profile` - Defaults used for inferred values
///
/// # Example
///
/// ```
/// use sumi_formfill::forms::{fill_suggestions, FieldDescriptor, FillProfile};
///
/// let fields = vec![
///     FieldDescriptor::new("radio", "color", "red"),
///     FieldDescriptor::new("radio", "color", "blue"),
///     FieldDescriptor::new("number", "age", "")
///         .with_attribute("min", "50")
///         .with_attribute("max", "80"),
/// ];
/// let suggestions = fill_suggestions(&fields, &FillProfile::default());
/// assert_eq!(suggestions["color"], "red");
/// assert_eq!(suggestions["age"], "51");
/// ```
pub fn fill_suggestions(fields: &[FieldDescriptor], profile: &FillProfile) -> SuggestionMap {
    let mut data = SuggestionMap::new();

    for field in fields {
        match field.kind {
            FieldKind::Radio => {
                data.entry(field.name.clone())
                    .or_insert_with(|| field.value.clone());
            }
            FieldKind::Checkbox => {
                data.insert(field.name.clone(), field.value.clone());
            }
            _ if !field.value.is_empty() => {
                data.insert(field.name.clone(), field.value.clone());
            }
            _ => {}
        }
    }

    for field in fields {
        if data.get(&field.name).is_some_and(|value| !value.is_empty()) {
            continue;
        }
        data.insert(field.name.clone(), infer_value(field, profile));
    }

    data
}

/// Picks a value for a field that carried none
fn infer_value(field: &FieldDescriptor, profile: &FillProfile) -> String {
    match field.kind {
        FieldKind::Email => profile.email.clone(),
        FieldKind::Color => profile.color.clone(),
        FieldKind::Number | FieldKind::Range => numeric_value(&field.attributes).to_string(),
        // tel shares the password default, not the phone number
        FieldKind::Password | FieldKind::Tel => profile.password.clone(),
        FieldKind::Radio | FieldKind::Checkbox | FieldKind::Other(_) => {
            profile.placeholder.clone()
        }
    }
}

/// One step above `min`, or one step below `max` when that overshoots
fn numeric_value(attributes: &HashMap<String, String>) -> i64 {
    let min = int_attribute(attributes, "min", DEFAULT_MIN);
    let max = int_attribute(attributes, "max", DEFAULT_MAX);
    let step = int_attribute(attributes, "step", DEFAULT_STEP);

    let value = min.saturating_add(step);
    if value > max {
        max.saturating_sub(step)
    } else {
        value
    }
}

fn int_attribute(attributes: &HashMap<String, String>, key: &str, default: i64) -> i64 {
    match attributes.get(key).map(|raw| raw.parse::<i64>()) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            tracing::debug!("Ignoring non-integer {} attribute: {}", key, e);
            default
        }
        None => default,
    }
}
