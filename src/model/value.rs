//! Universal value type of the document model.
//!
//! Every value that enters comparison or arithmetic goes through one of the
//! constructors in this module, which collapse `NaN`, `±Infinity` and absent
//! values to [`Value::Null`].

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::TypeWeight;

/// Object members. Insertion order is kept for display; comparison ignores it.
pub type Object = IndexMap<String, Value>;

/// Dynamically-typed document value.
///
/// Maps one-to-one onto JSON: `null`, booleans, numbers (always `f64`),
/// strings, arrays and objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

/// Shared `null` used when probing missing members.
pub(crate) static NULL: Value = Value::Null;

// ============================================================================
// Construction
// ============================================================================

impl Value {
    /// Build a number, collapsing non-finite input to `Null`.
    pub fn number(n: f64) -> Self {
        if n.is_finite() { Value::Number(n) } else { Value::Null }
    }

    /// Empty object.
    pub fn object() -> Self {
        Value::Object(Object::new())
    }

    /// Recursively replace every non-finite number with `Null`.
    pub fn fix(self) -> Self {
        match self {
            Value::Number(n) => Value::number(n),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::fix).collect()),
            Value::Object(members) => {
                Value::Object(members.into_iter().map(|(k, v)| (k, v.fix())).collect())
            }
            other => other,
        }
    }

    /// Copy with object members sorted by name at every level.
    pub fn normalized(&self) -> Self {
        match self {
            Value::Array(items) => Value::Array(items.iter().map(Value::normalized).collect()),
            Value::Object(members) => {
                let mut names: Vec<&String> = members.keys().collect();
                names.sort();
                Value::Object(
                    names
                        .into_iter()
                        .map(|name| (name.clone(), members[name].normalized()))
                        .collect(),
                )
            }
            Value::Number(n) => Value::number(*n),
            other => other.clone(),
        }
    }
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_weight(&self) -> TypeWeight {
        TypeWeight::of(self)
    }

    pub fn type_name(&self) -> &'static str {
        match self.type_weight() {
            TypeWeight::Null => "null",
            TypeWeight::Bool => "boolean",
            TypeWeight::Number => "number",
            TypeWeight::String => "string",
            TypeWeight::Array => "array",
            TypeWeight::Object => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        self.type_weight() == TypeWeight::Null
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Attempt to extract a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }
}

// ============================================================================
// Member access
// ============================================================================

impl Value {
    /// Object member by name. Missing members and non-objects yield `Null`.
    pub fn get(&self, name: &str) -> &Value {
        match self {
            Value::Object(members) => members.get(name).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Array element by position. Negative positions count from the end;
    /// out-of-range positions and non-arrays yield `Null`.
    pub fn index(&self, position: i64) -> &Value {
        let Value::Array(items) = self else {
            return &NULL;
        };
        let len = items.len() as i64;
        let position = if position < 0 { len + position } else { position };
        if (0..len).contains(&position) {
            &items[position as usize]
        } else {
            &NULL
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Number(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(members) => Value::Object(
                members.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(members) => serde_json::Value::Object(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) if !n.is_finite() => write!(f, "null"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Object(members) => {
                write!(f, "{{")?;
                for (i, (k, v)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{k}\": {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
