//! Dynamic, metadata-driven record fields.
//!
//! Catalog rows, filter candidates, selection entries and creation payloads all
//! share one shape: a JSON object keyed by platform field API names. The column
//! set is decided by remote field metadata, so it cannot be a fixed struct.

use serde_json::Value;

/// A record's fields, keyed by field API name (e.g. `"Quantity"`).
pub type FieldMap = serde_json::Map<String, Value>;

/// Text rendering of a field value, for filtering and display.
///
/// Numbers and booleans render through their canonical string form; nulls,
/// arrays and nested objects have no text rendering.
pub fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// True when a field is absent, null, or an empty/whitespace-only string.
///
/// This is the emptiness test used by commit validation: a numeric zero is a
/// value, an empty string is not.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_text_covers_scalar_values() {
        assert_eq!(field_text(&json!("Widget")), Some("Widget".to_string()));
        assert_eq!(field_text(&json!(42.5)), Some("42.5".to_string()));
        assert_eq!(field_text(&json!(true)), Some("true".to_string()));
        assert_eq!(field_text(&Value::Null), None);
        assert_eq!(field_text(&json!(["a"])), None);
    }

    #[test]
    fn blank_means_absent_null_or_empty_string() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&Value::Null)));
        assert!(is_blank(Some(&json!(""))));
        assert!(is_blank(Some(&json!("   "))));
        assert!(!is_blank(Some(&json!(0))));
        assert!(!is_blank(Some(&json!("0"))));
    }
}
