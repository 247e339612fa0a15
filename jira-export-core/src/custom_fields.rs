//! Normalization of dynamically-typed Jira custom fields.
//!
//! Jira returns custom fields as `customfield_NNNNN` keys whose values can be
//! strings, numbers, option objects, user objects, arrays of any of those, or
//! whole ADF documents. [`normalize`] turns that bag into an ordered map of
//! display name → display string.
//!
//! Fields that the canonical document already carries in a dedicated slot
//! (sprint, story points, epic, ...) are excluded by name, so they never show
//! up twice in an export.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::adf;

/// Custom field id → human readable name, as returned by `GET /rest/api/3/field`.
pub type FieldNames = HashMap<String, String>;

/// Prefix Jira uses for every custom field key.
pub const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// Lowercase fragments of field names that are surfaced elsewhere.
pub const EXCLUDED_NAME_FRAGMENTS: [&str; 9] = [
    "sprint",
    "story point",
    "epic",
    "rank",
    "flagged",
    "development",
    "team",
    "color",
    "change",
];

/// Attributes preferred, in order, when an object stands in for a scalar.
const PREFERRED_ATTRIBUTES: [&str; 3] = ["value", "name", "displayName"];

pub fn is_custom_field(key: &str) -> bool {
    key.starts_with(CUSTOM_FIELD_PREFIX)
}

/// Resolve a field id through the lookup, falling back to the id itself.
pub fn resolve_name<'a>(key: &'a str, lookup: Option<&'a FieldNames>) -> &'a str {
    lookup
        .and_then(|names| names.get(key))
        .map(String::as_str)
        .unwrap_or(key)
}

pub fn is_excluded(name: &str) -> bool {
    let lower = name.to_lowercase();
    EXCLUDED_NAME_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}

/// Produce the generic custom-field section of an issue.
///
/// Emission follows the iteration order of `raw_fields`. When two ids resolve
/// to the same name the later value replaces the earlier one, keeping the
/// position of the first.
pub fn normalize(
    raw_fields: &Map<String,
    Value>,
    lookup: Option<&FieldNames>,
) -> IndexMap<String, String> {
    let mut out = IndexMap::new();

    for (key, value) in raw_fields {
        if !is_custom_field(key) {
            continue;
        }
        let name = resolve_name(key, lookup);
        if is_excluded(name) {
            continue;
        }
        match coerce(value) {
            Some(text) if !text.is_empty() => {
                out.insert(name.to_owned(), text);
            }
            _ => {}
        }
    }

    debug!(fields = out.len(), "Normalized custom fields");
    out
}

/// Coerce one custom-field value to display text. `None` drops the field.
pub fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_to_string(n)),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(coerce_element).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(_) if adf::is_document(value) => {
            let text = adf::flatten(&adf::Node::from_value(value));
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Object(map) => preferred_attribute(map),
        _ => None,
    }
}

fn coerce_element(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => (!s.is_empty()).then(|| s.clone()),
        Value::Number(n) => Some(number_to_string(n)),
        Value::Object(map) => preferred_attribute(map).or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}

fn preferred_attribute(map: &Map<String, Value>) -> Option<String> {
    PREFERRED_ATTRIBUTES.iter().find_map(|attr| match map.get(*attr) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(number_to_string(n)),
        _ => None,
    })
}

/// Decimal form of a JSON number; integral floats print without a fraction.
pub fn number_to_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
