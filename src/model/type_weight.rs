//! Ordinal type classes.

use serde::{Deserialize, Serialize};

use super::Value;

/// Ordering class of a [`Value`].
///
/// The gaps between the discriminants are intentional; only the relative
/// order matters. Cross-type comparisons are decided by this order alone, so
/// any number sorts before any string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TypeWeight {
    Null = 0,
    Bool = 1,
    Number = 2,
    String = 4,
    Array = 8,
    Object = 16,
}

impl TypeWeight {
    /// Classify a value. Non-finite numbers are `Null`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => TypeWeight::Null,
            Value::Bool(_) => TypeWeight::Bool,
            Value::Number(n) if !n.is_finite() => TypeWeight::Null,
            Value::Number(_) => TypeWeight::Number,
            Value::String(_) => TypeWeight::String,
            Value::Array(_) => TypeWeight::Array,
            Value::Object(_) => TypeWeight::Object,
        }
    }

    /// Numeric weight.
    pub fn weight(self) -> u8 {
        self as u8
    }

    /// Arrays and objects are compared member by member.
    pub fn is_container(self) -> bool {
        self >= TypeWeight::Array
    }
}
