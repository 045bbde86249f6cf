//! Typed field values and their mapping to plain JSON.
//!
//! The REST API wraps every value in a one-key object naming its type
//! (`{"stringValue": "Thorn"}`); 64-bit integers travel as strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub type Fields = BTreeMap<String, FirestoreValue>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

impl FirestoreValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::StringValue(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON view. Integers that do not fit `i64` stay strings;
    /// timestamps, references and bytes become strings.
    pub fn into_json(self) -> Value {
        match self {
            Self::NullValue(()) => Value::Null,
            Self::BooleanValue(b) => Value::Bool(b),
            Self::IntegerValue(raw) => match raw.parse::<i64>() {
                Ok(i) => Value::from(i),
                Err(_) => Value::String(raw),
            },
            Self::DoubleValue(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            Self::TimestampValue(s)
            | Self::StringValue(s)
            | Self::BytesValue(s)
            | Self::ReferenceValue(s) => Value::String(s),
            Self::GeoPointValue(point) => serde_json::json!({
                "latitude": point.latitude,
                "longitude": point.longitude,
            }),
            Self::ArrayValue(array) => {
                Value::Array(array.values.into_iter().map(Self::into_json).collect())
            }
            Self::MapValue(map) => Value::Object(decode_fields(map.fields)),
        }
    }
}

impl From<&Value> for FirestoreValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::NullValue(()),
            Value::Bool(b) => Self::BooleanValue(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::IntegerValue(i.to_string()),
                None => Self::DoubleValue(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::StringValue(s.clone()),
            Value::Array(items) => Self::ArrayValue(ArrayValue {
                values: items.iter().map(Self::from).collect(),
            }),
            Value::Object(map) => Self::MapValue(MapValue {
                fields: encode_fields(map),
            }),
        }
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Fields {
    map.iter()
        .map(|(key, value)| (key.clone(), FirestoreValue::from(value)))
        .collect()
}

pub fn decode_fields(fields: Fields) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key, value.into_json()))
        .collect()
}

fn is_simple_field_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Field path for a top-level key, backtick-quoted unless it is a plain
/// identifier (`name`, `weaponSkills`, but `` `damage bonus` ``).
pub fn quote_field_path(name: &str) -> String {
    if is_simple_field_name(name) {
        return name.to_string();
    }
    let escaped = name.replace('\\', "\\\\").replace('`', "\\`");
    format!("`{}`", escaped)
}
