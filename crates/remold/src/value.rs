//! The loosely typed value model.
//!
//! [`Value`] is the dynamic tree the decode engine reads from and, in the
//! encode direction, writes into. It mirrors what generic deserialization
//! produces: nulls, scalars, byte strings, sequences, and ordered maps,
//! plus two shapes of its own:
//!
//! - [`Value::Number`] holds an unparsed numeric literal, deferring the
//!   int/uint/float decision until a concrete target is known.
//! - [`Value::Record`] is a snapshot of a typed struct together with its
//!   field annotations, produced by [`Mold::to_value`](crate::Mold::to_value)
//!   and consumed when a struct is used as decode input.

/// A dynamically shaped value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent or explicit null.
    Null,

    /// Boolean.
    Bool(bool),

    /// Signed integer.
    Int(i64),

    /// Unsigned integer. Kept separate from `Int` so the full `u64` range
    /// survives until a target is chosen.
    Uint(u64),

    /// Floating point.
    Float(f64),

    /// An unparsed numeric literal, e.g. from a JSON number kept as text.
    Number(String),

    /// UTF-8 string.
    String(String),

    /// Raw byte string.
    Bytes(Vec<u8>),

    /// Sequence of values.
    Seq(Vec<Value>),

    /// Ordered map. Keys are full values; insertion order is preserved.
    Map(Vec<MapEntry>),

    /// Snapshot of an annotated struct.
    Record(Record),
}

/// One key/value pair of a [`Value::Map`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    /// Entry key.
    pub key: Value,

    /// Entry value.
    pub value: Value,
}

impl MapEntry {
    /// Create an entry.
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of a typed struct: its name plus every field with the raw
/// annotation strings attached at the declaration site.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Short type name of the struct this was taken from.
    pub type_name: &'static str,

    /// Fields in declaration order.
    pub fields: Vec<RecordField>,
}

/// One field of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Rust field identifier.
    pub name: &'static str,

    /// Raw annotation strings, keyed by namespace. Parsing happens at
    /// decode time so the configured tag namespace applies.
    pub tags: &'static [(&'static str, &'static str)],

    /// Snapshot of the field value.
    pub value: Value,

    /// Whether the field held its declared zero value. Computed from the
    /// typed side, which distinguishes `None` from `Some(Default::default())`
    /// even though their snapshots can look alike.
    pub zero: bool,
}

impl Record {
    /// Look up a field by its Rust identifier.
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Classification of values and decode targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Null value.
    Null,
    /// Boolean.
    Bool,
    /// Signed integer of any width.
    Int,
    /// Unsigned integer of any width.
    Uint,
    /// Floating point of any width.
    Float,
    /// Deferred numeric literal.
    Number,
    /// String.
    String,
    /// Byte string.
    Bytes,
    /// Sequence.
    Seq,
    /// Map.
    Map,
    /// Struct or record snapshot.
    Struct,
    /// Optional target.
    Option,
    /// Catch-all target that accepts any value.
    Any,
}

impl Kind {
    /// Lowercase label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Seq => "sequence",
            Kind::Map => "map",
            Kind::Struct => "record",
            Kind::Option => "option",
            Kind::Any => "any",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Value {
    /// Kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float(_) => Kind::Float,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Bytes(_) => Kind::Bytes,
            Value::Seq(_) => Kind::Seq,
            Value::Map(_) => Kind::Map,
            Value::Record(_) => Kind::Struct,
        }
    }

    /// Check for null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as a bool if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as a string slice if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as sequence elements if this is a sequence.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Get as map entries if this is a map.
    pub fn as_map(&self) -> Option<&[MapEntry]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Get as a record snapshot if this is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Look up a string key in a map value. The first entry whose key is the
    /// given string wins.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|e| e.key.as_str() == Some(key))
            .map(|e| &e.value)
    }

    /// Emptiness under `omitempty` semantics: null, `false`, numeric zero,
    /// or a zero-length string/bytes/sequence/map. Records are never empty.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Uint(n) => *n == 0,
            Value::Float(n) => *n == 0.0,
            Value::Number(s) => s.is_empty(),
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Seq(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            Value::Record(_) => false,
        }
    }

    /// Zero-ness under `omitzero` semantics: like [`Value::is_empty_value`],
    /// except a record is zero when every one of its fields was zero on the
    /// typed side.
    pub fn is_zero_value(&self) -> bool {
        match self {
            Value::Record(record) => record.fields.iter().all(|f| f.zero),
            other => other.is_empty_value(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

impl From<Vec<MapEntry>> for Value {
    fn from(v: Vec<MapEntry>) -> Self {
        Value::Map(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(Value::Null.kind().label(), "null");
        assert_eq!(Value::Int(1).kind().label(), "int");
        assert_eq!(Value::Seq(vec![]).kind().label(), "sequence");
        assert_eq!(Kind::Struct.label(), "record");
    }

    #[test]
    fn test_map_get() {
        let map = Value::Map(vec![
            MapEntry::new("a", 1i64),
            MapEntry::new("b", "two"),
        ]);

        assert_eq!(map.get("a"), Some(&Value::Int(1)));
        assert_eq!(map.get("b"), Some(&Value::String("two".to_string())));
        assert_eq!(map.get("c"), None);
        assert_eq!(Value::Null.get("a"), None);
    }

    #[test]
    fn test_empty_values() {
        assert!(Value::Null.is_empty_value());
        assert!(Value::Bool(false).is_empty_value());
        assert!(Value::Int(0).is_empty_value());
        assert!(Value::Float(0.0).is_empty_value());
        assert!(Value::String(String::new()).is_empty_value());
        assert!(Value::Seq(vec![]).is_empty_value());
        assert!(Value::Map(vec![]).is_empty_value());

        assert!(!Value::Bool(true).is_empty_value());
        assert!(!Value::Int(3).is_empty_value());
        assert!(!Value::String("x".to_string()).is_empty_value());
        assert!(!Value::Seq(vec![Value::Null]).is_empty_value());
    }

    #[test]
    fn test_record_is_never_empty_but_can_be_zero() {
        let record = Value::Record(Record {
            type_name: "T",
            fields: vec![
                RecordField {
                    name: "a",
                    tags: &[],
                    value: Value::Int(0),
                    zero: true,
                },
                RecordField {
                    name: "b",
                    tags: &[],
                    value: Value::String(String::new()),
                    zero: true,
                },
            ],
        });

        assert!(!record.is_empty_value());
        assert!(record.is_zero_value());
    }

    #[test]
    fn test_record_with_nonzero_field_is_not_zero() {
        let record = Value::Record(Record {
            type_name: "T",
            fields: vec![RecordField {
                name: "a",
                tags: &[],
                value: Value::Int(0),
                zero: false,
            }],
        });

        assert!(!record.is_zero_value());
    }

    #[test]
    fn test_number_emptiness_tracks_literal_length() {
        assert!(Value::Number(String::new()).is_empty_value());
        assert!(!Value::Number("0".to_string()).is_empty_value());
    }
}
