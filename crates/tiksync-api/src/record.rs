// Raw router records
//
// The router answers every query with a sequence of flat key/value
// objects. Values arrive as strings on the REST endpoint ("true", "1500")
// but may be native JSON scalars from other transports, so consumers go
// through `RecordExt` instead of matching on `Value` themselves.

use serde_json::{Map, Value};

/// One remote object instance (interface, ARP entry, rule, ...).
///
/// A `null` value means the same as an absent field: "not reported".
pub type RawRecord = Map<String, Value>;

/// Scalar accessors tolerant of absent fields and mixed value types.
pub trait RecordExt {
    /// The field's value, or `None` when it is absent or null.
    fn reported(&self, field: &str) -> Option<&Value>;

    /// The field rendered as text. Numbers and booleans are stringified.
    fn text(&self, field: &str) -> Option<String>;

    /// Router truthiness: `true`/`yes`/`on`, non-zero numbers and any other
    /// non-empty string count as true. Absent fields are `None`.
    fn truthy(&self, field: &str) -> Option<bool>;
}

impl RecordExt for RawRecord {
    fn reported(&self, field: &str) -> Option<&Value> {
        self.get(field).filter(|v| !v.is_null())
    }

    fn text(&self, field: &str) -> Option<String> {
        self.reported(field).and_then(scalar_text)
    }

    fn truthy(&self, field: &str) -> Option<bool> {
        self.reported(field).map(value_truthy)
    }
}

/// Render a scalar JSON value as text. Arrays and objects yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Truthiness of a reported value.
pub fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "no" | "off" | "0"
        ),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: &Value) -> RawRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn null_counts_as_absent() {
        let r = record(&json!({ "comment": null }));
        assert!(r.reported("comment").is_none());
        assert!(r.text("comment").is_none());
        assert!(r.truthy("comment").is_none());
    }

    #[test]
    fn text_stringifies_scalars() {
        let r = record(&json!({ "mtu": 1500, "running": true, "name": "ether1" }));
        assert_eq!(r.text("mtu").as_deref(), Some("1500"));
        assert_eq!(r.text("running").as_deref(), Some("true"));
        assert_eq!(r.text("name").as_deref(), Some("ether1"));
    }

    #[test]
    fn truthiness_follows_router_conventions() {
        let r = record(&json!({
            "a": "true", "b": "false", "c": "yes", "d": "no",
            "e": 1, "f": 0, "g": true, "h": ""
        }));
        assert_eq!(r.truthy("a"), Some(true));
        assert_eq!(r.truthy("b"), Some(false));
        assert_eq!(r.truthy("c"), Some(true));
        assert_eq!(r.truthy("d"), Some(false));
        assert_eq!(r.truthy("e"), Some(true));
        assert_eq!(r.truthy("f"), Some(false));
        assert_eq!(r.truthy("g"), Some(true));
        assert_eq!(r.truthy("h"), Some(false));
    }
}
