// Records: an identifier plus a bag of named field values

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable unique identifier of a record
///
/// Source data uses both integer ids (`1`) and string ids (`"m11"`). Ids
/// compare by their textual form, so `1` and `"1"` name the same record, but
/// the JSON kind is remembered for writing the record back out.
#[derive(Debug, Clone)]
pub struct RecordId {
    text: String,
    numeric: bool,
}

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId {
            text: id.into(),
            numeric: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Read an identifier from a JSON value; only strings and integers qualify
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(RecordId::new(s.clone())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(RecordId {
                text: n.to_string(),
                numeric: true,
            }),
            _ => None,
        }
    }

    /// The identifier as JSON, in the kind it was read with
    pub fn to_json(&self) -> Value {
        if self.numeric {
            if let Ok(n) = self.text.parse::<i64>() {
                return Value::from(n);
            }
            if let Ok(n) = self.text.parse::<u64>() {
                return Value::from(n);
            }
        }
        Value::String(self.text.clone())
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for RecordId {}

impl Hash for RecordId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for RecordId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::new(s)
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId {
            text: n.to_string(),
            numeric: true,
        }
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        RecordId::from(i64::from(n))
    }
}

/// Value types a record field can hold
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    /// Nested arrays/objects, kept as their JSON text
    Json(String),
}

impl FieldValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(FieldValue::Integer(i)),
                // Past i64 range: keep the digits so they round-trip exactly
                None if n.is_u64() => Some(FieldValue::Json(n.to_string())),
                None => n.as_f64().map(FieldValue::Number),
            },
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            other => Some(FieldValue::Json(other.to_string())),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Json(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Case-insensitive substring test against the value's display form
    pub fn contains_ci(&self, needle_lower: &str) -> bool {
        match self {
            FieldValue::Text(s) => s.to_lowercase().contains(needle_lower),
            other => other.to_string().to_lowercase().contains(needle_lower),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Json(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(i64::from(n))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// One domain item (transaction, restaurant, job, product)
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Record {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a record from a JSON object, reading the identifier from `id_field`.
    ///
    /// Returns `None` when the identifier is missing or not a string/integer;
    /// null-valued fields are dropped.
    pub fn from_json(object: &Map<String, Value>, id_field: &str) -> Option<Self> {
        let id = object.get(id_field).and_then(RecordId::from_json)?;
        let fields = object
            .iter()
            .filter(|(name, _)| name.as_str() != id_field)
            .filter_map(|(name, value)| FieldValue::from_json(value).map(|v| (name.clone(), v)))
            .collect();
        Some(Record { id, fields })
    }

    /// Render back into a JSON object with the identifier under `id_field`
    pub fn to_json(&self, id_field: &str) -> Map<String, Value> {
        let mut object: Map<String, Value> = self.fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
        object.insert(id_field.to_string(), self.id.to_json());
        object
    }
}
