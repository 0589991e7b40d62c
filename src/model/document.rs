//! Document identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::Object;

/// A stored document: an object with at least `_id` and `_key` members.
pub type Document = Object;

/// Reserved attribute names.
pub const ID: &str = "_id";
pub const KEY: &str = "_key";
pub const FROM: &str = "_from";
pub const TO: &str = "_to";

/// `collection/key` document handle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(collection: &str, key: &str) -> Self {
        Self(format!("{collection}/{key}"))
    }

    /// Accepts only `collection/key` with both parts non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.split_once('/') {
            Some((c, k)) if !c.is_empty() && !k.is_empty() => Some(Self(raw.to_owned())),
            _ => None,
        }
    }

    /// A full handle, or a bare key completed with `collection`.
    pub fn resolve(collection: &str, handle: &str) -> Option<Self> {
        if handle.contains('/') {
            Self::parse(handle)
        } else if handle.is_empty() || collection.is_empty() {
            None
        } else {
            Some(Self::new(collection, handle))
        }
    }

    pub fn collection(&self) -> &str {
        self.0.split_once('/').map_or(&self.0, |(c, _)| c)
    }

    pub fn key(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, k)| k)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let id = DocumentId::parse("persons/alice").unwrap();
        assert_eq!(id.collection(), "persons");
        assert_eq!(id.key(), "alice");
        assert_eq!(id, DocumentId::new("persons", "alice"));
        assert!(DocumentId::parse("alice").is_none());
        assert!(DocumentId::parse("/alice").is_none());
        assert!(DocumentId::parse("persons/").is_none());
    }

    #[test]
    fn test_resolve_bare_key() {
        assert_eq!(DocumentId::resolve("persons", "bob"), Some(DocumentId::new("persons", "bob")));
        assert_eq!(DocumentId::resolve("persons", "cities/bonn"), Some(DocumentId::new("cities", "bonn")));
        assert_eq!(DocumentId::resolve("persons", ""), None);
    }
}
