//! Member sets driving structural comparison.

use std::ops::Range;

use crate::model::Value;
use crate::model::value::NULL;

/// The members two containers are compared on, in comparison order.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySet<'a> {
    /// `0..max(len(a), len(b))` for two arrays.
    Indices(Range<usize>),
    /// Sorted union of member names for two objects.
    Names(Vec<&'a str>),
}

impl<'a> KeySet<'a> {
    /// Key set of two values of the same container type. Mixed or scalar
    /// inputs have an empty key set.
    pub fn of(lhs: &'a Value, rhs: &'a Value) -> Self {
        match (lhs, rhs) {
            (Value::Array(l), Value::Array(r)) => KeySet::Indices(0..l.len().max(r.len())),
            (Value::Object(l), Value::Object(r)) => {
                let mut names: Vec<&str> = l
                    .keys()
                    .chain(r.keys().filter(|k| !l.contains_key(*k)))
                    .map(String::as_str)
                    .collect();
                names.sort_unstable();
                KeySet::Names(names)
            }
            _ => KeySet::Indices(0..0),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            KeySet::Indices(range) => range.len(),
            KeySet::Names(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pairs of members in key order. Missing members probe as `Null`.
    pub fn members(&self, lhs: &'a Value, rhs: &'a Value) -> Vec<(&'a Value, &'a Value)> {
        match self {
            KeySet::Indices(range) => range
                .clone()
                .map(|i| (member_at(lhs, i), member_at(rhs, i)))
                .collect(),
            KeySet::Names(names) => names.iter().map(|n| (lhs.get(n), rhs.get(n))).collect(),
        }
    }
}

fn member_at(value: &Value, i: usize) -> &Value {
    value.as_array().and_then(|items| items.get(i)).unwrap_or(&NULL)
}
