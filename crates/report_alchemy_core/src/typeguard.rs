//! Runtime shape checks for untrusted JSON values.

use serde_json::Value;

/// Returns true if the value is a JSON string.
pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

/// Returns true if the value is an array and every element satisfies `element_test`.
///
/// A missing value (`None`) is never an array.
pub fn is_array_of<F>(value: Option<&Value>, element_test: F) -> bool
where
    F: Fn(&Value) -> bool,
{
    match value {
        Some(Value::Array(items)) => items.iter().all(element_test),
        _ => false,
    }
}
