//! Example-document matching.
//!
//! An element matches an example object when every member of the example is
//! equal to the element's member of the same name. A list of examples is an
//! alternation: the first matching example wins.

use crate::model::Value;

use super::Comparator;

/// Index of the first example `element` matches.
///
/// `examples` is a single example or an array of them. Non-object examples
/// are skipped with a warning; an empty example list warns and never matches.
pub fn matches_index(element: &Value, examples: &Value) -> Option<usize> {
    if !element.is_object() {
        return None;
    }
    let examples = match examples {
        Value::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };
    if examples.is_empty() {
        tracing::warn!("example list is empty");
        return None;
    }

    let cmp = Comparator::new();
    examples.iter().position(|example| {
        let Some(members) = example.as_object() else {
            tracing::warn!(got = example.type_name(), "example must be an object");
            return false;
        };
        members
            .iter()
            .all(|(name, expected)| cmp.equal(element.get(name), expected))
    })
}

/// Whether `element` matches any of `examples`.
pub fn matches(element: &Value, examples: &Value) -> bool {
    matches_index(element, examples).is_some()
}

/// A single example object stands for a one-element list.
pub fn as_example_list(examples: Value) -> Value {
    match examples {
        Value::Object(_) => Value::Array(vec![examples]),
        other => other,
    }
}

/// Whether `examples` leaves a selection untouched: absent or an empty list.
pub fn is_unrestricted(examples: Option<&Value>) -> bool {
    match examples {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Keep the items whose value matches `examples`. Unrestricted examples keep
/// everything.
pub fn filter_by_example<T>(items: Vec<T>, examples: Option<&Value>, value: impl Fn(&T) -> Value) -> Vec<T> {
    let Some(examples) = examples.filter(|e| !is_unrestricted(Some(*e))) else {
        return items;
    };
    items.into_iter().filter(|item| matches(&value(item), examples)).collect()
}
