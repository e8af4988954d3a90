//! Redaction of template variables before they are written to disk.

use serde_json::Value;
use std::collections::BTreeMap;

/// Replacement for redacted values
pub const REDACTED: &str = "[REDACTED]";

/// Case-insensitive key fragments that mark a variable as sensitive
pub const SENSITIVE_KEY_FRAGMENTS: &[&str] = &["password", "token", "secret", "key", "email"];

pub fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}

/// Copy of `variables` with every sensitive value replaced by [`REDACTED`].
pub fn sanitize_variables(variables: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    variables
        .iter()
        .map(|(key, value)| (key.clone(), sanitize_entry(key, value)))
        .collect()
}

/// Redact sensitive keys at any depth of a JSON value.
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| (key.clone(), sanitize_entry(key, val)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        other => other.clone(),
    }
}

fn sanitize_entry(key: &str, value: &Value) -> Value {
    if is_sensitive_key(key) {
        Value::String(REDACTED.to_string())
    } else {
        sanitize_value(value)
    }
}
