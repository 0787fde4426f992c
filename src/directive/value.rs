//! Lenient field extraction from YAML values.
//!
//! Directive payloads are hand-written, so nothing here fails: a value
//! that cannot be read resolves to "unset".

use serde_yaml::Value;

/// Coerces a YAML value into a finite number.
///
/// Accepts numeric literals and strings holding a number (surrounding
/// whitespace allowed). Everything else, including `NaN` and infinities,
/// resolves to `None`.
#[must_use]
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Tagged(tagged) => return coerce_number(&tagged.value),
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Renders a scalar as text, or `None` for empty strings and non-scalars.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

/// Finds the first usable image reference in a value.
///
/// - string: the string itself
/// - sequence: the first resolvable element, in order, descending into
///   nested sequences (`[[map.png]]` reads as a sequence of sequences)
/// - mapping: the first key, when it is a string; its value is ignored
///
/// Returns an empty string when nothing resolves.
#[must_use]
pub fn extract_image_reference(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(extract_image_reference)
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default(),
        Value::Mapping(map) => match map.keys().next() {
            Some(Value::String(key)) => key.clone(),
            _ => String::new(),
        },
        Value::Tagged(tagged) => extract_image_reference(&tagged.value),
        _ => String::new(),
    }
}
