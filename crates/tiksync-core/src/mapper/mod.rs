// ── Field Mapper ──
//
// Declarative transform from a raw router record into a typed model
// record. A `MapSpec` is a static table of field specifications evaluated
// generically: the previous typed record (if any) is serialized into a
// JSON object, mapped fields are overlaid onto it, ensure fields are
// filled where still missing, joins are computed from the resolved
// fields, and the result is deserialized back into the typed record.

pub mod specs;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tiksync_api::record::{scalar_text, value_truthy};
use tiksync_api::{RawRecord, RecordExt};

use crate::error::CoreError;

// ── Mapping types ─────────────────────────────────────────────────

/// A literal default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Str(&'static str),
    Int(i64),
    Bool(bool),
    Null,
}

impl Literal {
    fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.to_owned()),
            Self::Int(i) => Value::from(i),
            Self::Bool(b) => Value::Bool(b),
            Self::Null => Value::Null,
        }
    }
}

/// How a resolved source value becomes the output value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Scalars are rendered as text.
    Text,
    /// Integer parse; unparsable values fall back to the default.
    Int,
    /// Router truthiness, optionally negated (`disabled` -> `enabled`).
    Bool { invert: bool },
    /// `true` when the value's text equals the given string.
    Equals(&'static str),
}

/// One output field of a mapped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Source field; `None` means the same as `name`.
    pub source: Option<&'static str>,
    pub default: Literal,
    /// Default-chain: when the source is absent, copy this already
    /// resolved output field instead of using `default`.
    pub default_field: Option<&'static str>,
    pub coercion: Coercion,
}

/// Start a text field that reads the source field of the same name.
pub const fn field(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        source: None,
        default: Literal::Str(""),
        default_field: None,
        coercion: Coercion::Text,
    }
}

impl FieldSpec {
    pub const fn from(self, source: &'static str) -> Self {
        Self {
            source: Some(source),
            ..self
        }
    }

    pub const fn or(self, default: Literal) -> Self {
        Self { default, ..self }
    }

    pub const fn or_str(self, default: &'static str) -> Self {
        self.or(Literal::Str(default))
    }

    pub const fn or_field(self, other: &'static str) -> Self {
        Self {
            default_field: Some(other),
            ..self
        }
    }

    pub const fn int(self) -> Self {
        Self {
            coercion: Coercion::Int,
            default: Literal::Int(0),
            ..self
        }
    }

    /// Integer field that stays absent when the source is absent.
    pub const fn optional_int(self) -> Self {
        Self {
            coercion: Coercion::Int,
            default: Literal::Null,
            ..self
        }
    }

    pub const fn boolean(self) -> Self {
        Self {
            coercion: Coercion::Bool { invert: false },
            default: Literal::Bool(false),
            ..self
        }
    }

    /// Boolean negated after the default is applied.
    pub const fn inverted(self) -> Self {
        Self {
            coercion: Coercion::Bool { invert: true },
            default: Literal::Bool(false),
            ..self
        }
    }

    pub const fn equals(self, expected: &'static str) -> Self {
        Self {
            coercion: Coercion::Equals(expected),
            ..self
        }
    }

    fn source_name(&self) -> &'static str {
        match self.source {
            Some(s) => s,
            None => self.name,
        }
    }
}

/// A field guaranteed present, defaulted only when truly absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsureSpec {
    pub name: &'static str,
    pub default: Literal,
}

pub const fn ensure(name: &'static str, default: Literal) -> EnsureSpec {
    EnsureSpec { name, default }
}

/// Piece of a joined field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPart {
    /// Text of an already resolved output field (empty if absent).
    Field(&'static str),
    Text(&'static str),
}

/// A field computed by concatenating resolved fields and separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSpec {
    pub name: &'static str,
    pub parts: &'static [JoinPart],
}

/// Restricts which raw records are considered at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Equals {
        field: &'static str,
        value: &'static str,
    },
    /// Skip records where the field is truthy (`invalid`, `local`).
    NotTruthy(&'static str),
}

impl Filter {
    fn accepts(&self, raw: &RawRecord) -> bool {
        match *self {
            Self::Equals { field, value } => raw.text(field).as_deref() == Some(value),
            Self::NotTruthy(field) => !raw.truthy(field).unwrap_or(false),
        }
    }
}

/// Full mapping table for one collection.
#[derive(Debug, Clone, Copy)]
pub struct MapSpec {
    /// Entity name used in diagnostics.
    pub entity: &'static str,
    /// Raw field holding the record's key.
    pub key: &'static str,
    /// Secondary key field for records lacking `key`.
    pub key_fallback: Option<&'static str>,
    pub filter: Option<Filter>,
    pub fields: &'static [FieldSpec],
    pub ensure: &'static [EnsureSpec],
    pub joins: &'static [JoinSpec],
}

// ── Evaluation ──────────────────────────────────────────────────────

impl MapSpec {
    /// Whether the filter admits this raw record.
    pub fn accepts(&self, raw: &RawRecord) -> bool {
        self.filter.as_ref().is_none_or(|f| f.accepts(raw))
    }

    /// The record's key, or `None` when the record must be skipped.
    pub fn key_of(&self, raw: &RawRecord) -> Option<String> {
        let non_empty = |field: &str| raw.text(field).filter(|k| !k.is_empty());
        non_empty(self.key).or_else(|| self.key_fallback.and_then(non_empty))
    }

    /// Map `raw` onto `existing` (or an empty record) as a JSON object.
    pub fn apply_object(&self, existing: Map<String, Value>, raw: &RawRecord) -> Map<String, Value> {
        let mut out = existing;

        for spec in self.fields {
            let value = resolve(spec, raw, &out);
            out.insert(spec.name.to_owned(), value);
        }

        for spec in self.ensure {
            let missing = out.get(spec.name).is_none_or(Value::is_null);
            if missing {
                out.insert(spec.name.to_owned(), spec.default.to_value());
            }
        }

        for join in self.joins {
            let joined: String = join
                .parts
                .iter()
                .map(|part| match *part {
                    JoinPart::Field(name) => out.get(name).and_then(scalar_text).unwrap_or_default(),
                    JoinPart::Text(text) => text.to_owned(),
                })
                .collect();
            out.insert(join.name.to_owned(), Value::String(joined));
        }

        out
    }

    /// Map `raw` into a typed record, overlaying `existing`.
    ///
    /// Fields the table does not mention carry over from `existing`, so
    /// values computed outside the mapper survive cycles where the raw
    /// source does not re-supply them.
    pub fn apply<T>(&self, existing: Option<&T>, raw: &RawRecord) -> Result<T, CoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let base = match existing {
            Some(record) => to_object(record).map_err(|e| self.malformed(raw, &e))?,
            None => Map::new(),
        };

        let mut out = self.apply_object(base, raw);
        out.retain(|_, v| !v.is_null());

        serde_json::from_value(Value::Object(out)).map_err(|e| self.malformed(raw, &e))
    }

    fn malformed(&self, raw: &RawRecord, err: &serde_json::Error) -> CoreError {
        CoreError::Malformed {
            entity_type: self.entity.to_owned(),
            key: self.key_of(raw).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

fn to_object<T: Serialize>(record: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Resolve one field: source value, else default-chain, else literal,
/// then coerce.
fn resolve(spec: &FieldSpec, raw: &RawRecord, out: &Map<String, Value>) -> Value {
    let input = raw
        .reported(spec.source_name())
        .cloned()
        .or_else(|| {
            spec.default_field
                .and_then(|other| out.get(other))
                .filter(|v| !v.is_null())
                .cloned()
        })
        .unwrap_or_else(|| spec.default.to_value());

    match spec.coercion {
        Coercion::Text => scalar_text(&input).map_or(Value::Null, Value::String),
        Coercion::Int => coerce_int(&input)
            .or_else(|| coerce_int(&spec.default.to_value()))
            .map_or(Value::Null, Value::from),
        Coercion::Bool { invert } => Value::Bool(value_truthy(&input) != invert),
        Coercion::Equals(expected) => {
            Value::Bool(scalar_text(&input).is_some_and(|s| s == expected))
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "kebab-case", default)]
    struct Port {
        default_name: String,
        name: String,
        enabled: bool,
        mtu: i64,
        client_ip_address: String,
        label: String,
    }

    const PORT: MapSpec = MapSpec {
        entity: "port",
        key: "default-name",
        key_fallback: Some("name"),
        filter: None,
        fields: &[
            field("default-name"),
            field("name").or_field("default-name"),
            field("enabled").from("disabled").inverted(),
            field("mtu").from("actual-mtu").int(),
        ],
        ensure: &[ensure("client-ip-address", Literal::Str(""))],
        joins: &[JoinSpec {
            name: "label",
            parts: &[JoinPart::Field("name"), JoinPart::Text("@"), JoinPart::Field("mtu")],
        }],
    };

    fn raw(value: &Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn name_defaults_to_default_name() {
        let port: Port = PORT
            .apply(None, &raw(&json!({ "default-name": "ether1" })))
            .unwrap();
        assert_eq!(port.name, "ether1");
    }

    #[test]
    fn explicit_name_wins_over_chain() {
        let port: Port = PORT
            .apply(None, &raw(&json!({ "default-name": "ether1", "name": "wan" })))
            .unwrap();
        assert_eq!(port.name, "wan");
        assert_eq!(port.label, "wan@0");
    }

    #[test]
    fn inverted_bool_follows_disabled_flag() {
        let on: Port = PORT
            .apply(None, &raw(&json!({ "default-name": "e", "disabled": "false" })))
            .unwrap();
        let off: Port = PORT
            .apply(None, &raw(&json!({ "default-name": "e", "disabled": "true" })))
            .unwrap();
        let unreported: Port = PORT.apply(None, &raw(&json!({ "default-name": "e" }))).unwrap();

        assert!(on.enabled);
        assert!(!off.enabled);
        assert!(unreported.enabled);
    }

    #[test]
    fn ensure_never_overwrites_existing_value() {
        let previous = Port {
            default_name: "ether2".into(),
            client_ip_address: "10.0.0.5".into(),
            ..Port::default()
        };
        let port: Port = PORT
            .apply(Some(&previous), &raw(&json!({ "default-name": "ether2" })))
            .unwrap();
        assert_eq!(port.client_ip_address, "10.0.0.5");
    }

    #[test]
    fn int_coercion_parses_router_strings() {
        let port: Port = PORT
            .apply(None, &raw(&json!({ "default-name": "e", "actual-mtu": "1500" })))
            .unwrap();
        assert_eq!(port.mtu, 1500);

        let garbage: Port = PORT
            .apply(None, &raw(&json!({ "default-name": "e", "actual-mtu": "n/a" })))
            .unwrap();
        assert_eq!(garbage.mtu, 0);
    }

    #[test]
    fn key_falls_back_then_skips() {
        assert_eq!(
            PORT.key_of(&raw(&json!({ "name": "bridge" }))).as_deref(),
            Some("bridge")
        );
        assert_eq!(PORT.key_of(&raw(&json!({ "mtu": "1500" }))), None);
        assert_eq!(PORT.key_of(&raw(&json!({ "default-name": null }))), None);
    }

    #[test]
    fn filters_admit_matching_records_only() {
        let dst_nat = Filter::Equals {
            field: "action",
            value: "dst-nat",
        };
        assert!(dst_nat.accepts(&raw(&json!({ "action": "dst-nat" }))));
        assert!(!dst_nat.accepts(&raw(&json!({ "action": "masquerade" }))));

        let valid = Filter::NotTruthy("invalid");
        assert!(valid.accepts(&raw(&json!({}))));
        assert!(!valid.accepts(&raw(&json!({ "invalid": "true" }))));
    }

    #[test]
    fn equals_coercion() {
        const STATUS: FieldSpec = field("available").from("status").equals("bound");
        let out = Map::new();
        assert_eq!(
            resolve(&STATUS, &raw(&json!({ "status": "bound" })), &out),
            Value::Bool(true)
        );
        assert_eq!(resolve(&STATUS, &raw(&json!({})), &out), Value::Bool(false));
    }
}
