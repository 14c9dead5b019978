//! Typed accessors over the untyped settings bag.
//!
//! Contract: a missing key takes the caller's default and never fails; a
//! present key with the wrong shape is a `RenderError::TypeMismatch`, which
//! the dispatcher isolates at the section boundary.

use serde_json::Value;
use vitrine_document::Settings;

use crate::error::RenderError;

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn string_or(settings: &Settings, key: &str, default: &str) -> Result<String, RenderError> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(RenderError::TypeMismatch {
            key: key.to_string(),
            expected: "string",
            found: value_kind(other),
        }),
    }
}

pub fn bool_or(settings: &Settings, key: &str, default: bool) -> Result<bool, RenderError> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(RenderError::TypeMismatch {
            key: key.to_string(),
            expected: "boolean",
            found: value_kind(other),
        }),
    }
}

pub fn u64_or(settings: &Settings, key: &str, default: u64) -> Result<u64, RenderError> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n.as_u64().ok_or(RenderError::TypeMismatch {
            key: key.to_string(),
            expected: "unsigned integer",
            found: "number",
        }),
        Some(other) => Err(RenderError::TypeMismatch {
            key: key.to_string(),
            expected: "unsigned integer",
            found: value_kind(other),
        }),
    }
}

/// Missing arrays default to empty, never to an error
pub fn array_or_empty(settings: &Settings, key: &str) -> Result<Vec<Value>, RenderError> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(RenderError::TypeMismatch {
            key: key.to_string(),
            expected: "array",
            found: value_kind(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(pairs: &[(&str, Value)]) -> Settings {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_missing_key_takes_default() {
        let bag = Settings::new();
        assert_eq!(string_or(&bag, "title", "fallback").unwrap(), "fallback");
        assert!(bool_or(&bag, "dismissible", true).unwrap());
        assert_eq!(u64_or(&bag, "columns", 4).unwrap(), 4);
        assert!(array_or_empty(&bag, "images").unwrap().is_empty());
    }

    #[test]
    fn test_null_behaves_like_missing() {
        let bag = settings(&[("title", Value::Null)]);
        assert_eq!(string_or(&bag, "title", "fallback").unwrap(), "fallback");
    }

    #[test]
    fn test_present_value_is_read() {
        let bag = settings(&[("title", json!("Sale")), ("columns", json!(3))]);
        assert_eq!(string_or(&bag, "title", "x").unwrap(), "Sale");
        assert_eq!(u64_or(&bag, "columns", 4).unwrap(), 3);
    }

    #[test]
    fn test_wrong_shape_is_type_mismatch() {
        let bag = settings(&[("images", json!("not-an-array"))]);
        let err = array_or_empty(&bag, "images").unwrap_err();
        assert_eq!(
            err,
            RenderError::TypeMismatch {
                key: "images".to_string(),
                expected: "array",
                found: "string",
            }
        );
    }
}
