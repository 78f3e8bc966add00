//! Conversion between [`Value`] and `serde_json::Value`.
//!
//! Inputs for decoding frequently start life as JSON. The bridge keeps the
//! obvious mappings and resolves the two asymmetries explicitly: JSON has no
//! byte string (bytes become arrays of numbers) and no record snapshot
//! (records become objects keyed by field name, annotations ignored).

use crate::value::{MapEntry, Value};

impl Value {
    /// Convert a JSON tree into the value model.
    ///
    /// Numbers become [`Value::Int`], [`Value::Uint`], or [`Value::Float`]
    /// depending on what the literal fits in.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Seq(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| MapEntry {
                        key: Value::String(k.clone()),
                        value: Value::from_json(v),
                    })
                    .collect(),
            ),
        }
    }

    /// Convert into a JSON tree.
    ///
    /// [`Value::Number`] literals are re-parsed into the narrowest JSON
    /// number and fall back to a string when they do not parse. Non-finite
    /// floats and map entries without a stringifiable key become `null` /
    /// are dropped, matching what JSON can represent.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Uint(u) => serde_json::Value::from(*u),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Number(s) => {
                if let Ok(i) = s.parse::<i64>() {
                    serde_json::Value::from(i)
                } else if let Ok(u) = s.parse::<u64>() {
                    serde_json::Value::from(u)
                } else if let Ok(f) = s.parse::<f64>() {
                    serde_json::Number::from_f64(f)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                } else {
                    serde_json::Value::String(s.clone())
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => serde_json::Value::Array(
                bytes.iter().map(|b| serde_json::Value::from(*b)).collect(),
            ),
            Value::Seq(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => {
                let mut object = serde_json::Map::new();
                for entry in entries {
                    if let Some(key) = json_key(&entry.key) {
                        object.insert(key, entry.value.to_json());
                    }
                }
                serde_json::Value::Object(object)
            }
            Value::Record(record) => {
                let mut object = serde_json::Map::new();
                for field in &record.fields {
                    object.insert(field.name.to_string(), field.value.to_json());
                }
                serde_json::Value::Object(object)
            }
        }
    }
}

/// Render a map key as a JSON object key, if it has a scalar rendering.
fn json_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Uint(u) => Some(u.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from_json(json)
    }
}
