//! Edge in the document graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::document::{self, Document, DocumentId};
use super::value::{NULL, Value};
use crate::Error;

/// Traversal direction relative to the vertex being expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Outbound,
    Inbound,
    Any,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
            Direction::Any => Direction::Any,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Inbound => "inbound",
            Direction::Any => "any",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "outbound" => Ok(Direction::Outbound),
            "inbound" => Ok(Direction::Inbound),
            "any" => Ok(Direction::Any),
            other => Err(Error::InvalidArgument(format!("invalid direction '{other}'"))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge document connecting `_from` to `_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: DocumentId,
    pub from: DocumentId,
    pub to: DocumentId,
    pub data: Document,
}

impl Edge {
    /// Wrap a stored edge document. `_id`, `_from` and `_to` must all be
    /// well-formed document handles.
    pub fn from_document(data: Document) -> Option<Self> {
        let handle = |name: &str| data.get(name)?.as_str().and_then(DocumentId::parse);
        let id = handle(document::ID)?;
        let from = handle(document::FROM)?;
        let to = handle(document::TO)?;
        Some(Self { id, from, to, data })
    }

    pub fn collection(&self) -> &str {
        self.id.collection()
    }

    pub fn get(&self, name: &str) -> &Value {
        self.data.get(name).unwrap_or(&NULL)
    }

    /// The opposite end of the edge from `vertex`.
    pub fn other_end(&self, vertex: &DocumentId) -> Option<&DocumentId> {
        if *vertex == self.from {
            Some(&self.to)
        } else if *vertex == self.to {
            Some(&self.from)
        } else {
            None
        }
    }

    /// The end reached when the edge is followed from `vertex` in `direction`.
    pub fn target(&self, vertex: &DocumentId, direction: Direction) -> Option<&DocumentId> {
        match direction {
            Direction::Outbound if self.from == *vertex => Some(&self.to),
            Direction::Inbound if self.to == *vertex => Some(&self.from),
            Direction::Any => self.other_end(vertex),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edge() -> Edge {
        let Value::Object(doc) = Value::from(json!({
            "_id": "e/1", "_key": "1", "_from": "v/a", "_to": "v/b", "w": 3
        })) else {
            unreachable!()
        };
        Edge::from_document(doc).unwrap()
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("OUTBOUND".parse::<Direction>().unwrap(), Direction::Outbound);
        assert_eq!("any".parse::<Direction>().unwrap(), Direction::Any);
        assert!(matches!("sideways".parse::<Direction>(), Err(Error::InvalidArgument(_))));
        assert_eq!(Direction::Inbound.reverse(), Direction::Outbound);
    }

    #[test]
    fn test_edge_ends() {
        let e = edge();
        let a = DocumentId::new("v", "a");
        let b = DocumentId::new("v", "b");
        assert_eq!(e.other_end(&a), Some(&b));
        assert_eq!(e.target(&a, Direction::Outbound), Some(&b));
        assert_eq!(e.target(&a, Direction::Inbound), None);
        assert_eq!(e.target(&b, Direction::Inbound), Some(&a));
        assert_eq!(e.get("w"), &Value::Number(3.0));
    }
}
