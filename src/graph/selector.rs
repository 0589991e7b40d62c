//! Vertex selection by example.
//!
//! | Example | Selects |
//! |---------|---------|
//! | `null`, `{}`, `[]` | every document of the candidate collections |
//! | `"coll/key"` | that document |
//! | `{"_id": ...}` | that document, further matched against the other members |
//! | any other object | every document matching it |
//! | array | the union of its entries, in first-seen order |

use hashbrown::HashSet;

use crate::compare;
use crate::model::{document, DocumentId, Value, Vertex};
use crate::storage::Datasource;
use crate::Result;

/// Whether `example` narrows the selection at all.
pub fn is_example_set(example: &Value) -> bool {
    match example {
        Value::String(_) => true,
        Value::Array(items) => !items.is_empty(),
        Value::Object(members) => !members.is_empty(),
        _ => false,
    }
}

/// Vertices of `collections` selected by `example`.
///
/// Unknown collections are errors. Ids pointing outside `collections` or at
/// missing documents select nothing.
pub fn select_vertices<D: Datasource + ?Sized>(
    datasource: &D,
    collections: &[String],
    example: &Value,
) -> Result<Vec<Vertex>> {
    for name in collections {
        datasource.resolve_collection(name)?;
    }

    let examples: Vec<Value> = match example {
        Value::Array(items) if !items.is_empty() => items.iter().map(as_example).collect(),
        other if is_example_set(other) => vec![as_example(other)],
        _ => vec![Value::object()],
    };

    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for example in &examples {
        for vertex in select_one(datasource, collections, example)? {
            if seen.insert(vertex.id.clone()) {
                selected.push(vertex);
            }
        }
    }
    Ok(selected)
}

/// A string entry stands for `{"_id": string}`.
fn as_example(entry: &Value) -> Value {
    match entry {
        Value::String(id) => {
            let mut members = crate::model::Object::new();
            members.insert(document::ID.into(), Value::String(id.clone()));
            Value::Object(members)
        }
        other => other.clone(),
    }
}

fn select_one<D: Datasource + ?Sized>(
    datasource: &D,
    collections: &[String],
    example: &Value,
) -> Result<Vec<Vertex>> {
    let Value::Object(members) = example else {
        tracing::warn!(got = example.type_name(), "vertex example must be an object or a document id");
        return Ok(Vec::new());
    };

    if let Some(id) = members.get(document::ID) {
        let Some(id) = id.as_str().and_then(DocumentId::parse) else {
            return Ok(Vec::new());
        };
        if !collections.iter().any(|c| c == id.collection()) {
            return Ok(Vec::new());
        }
        let found = datasource
            .document(&id)
            .and_then(Vertex::from_document)
            .filter(|vertex| members.len() == 1 || compare::matches(&vertex.to_value(), example));
        return Ok(found.into_iter().collect());
    }

    let mut selected = Vec::new();
    for name in collections {
        for doc in datasource.documents(name)? {
            let Some(vertex) = Vertex::from_document(doc) else {
                continue;
            };
            if members.is_empty() || compare::matches(&vertex.to_value(), example) {
                selected.push(vertex);
            }
        }
    }
    Ok(selected)
}
