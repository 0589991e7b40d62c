//! Index descriptors.
//!
//! The engine never uses indexes for lookups itself. Callers building a
//! datasource locate fulltext or geo indexes by field name through
//! [`Datasource::find_index`](crate::storage::Datasource::find_index).

use serde::{Deserialize, Serialize};

/// Type of index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Primary key index, present on every collection.
    Primary,
    /// `_from`/`_to` index, present on every edge collection.
    Edge,
    /// Hash index for equality lookups.
    Hash,
    /// Sorted index for equality and range lookups.
    Skiplist,
    /// Full-text search index.
    Fulltext,
    /// Geo index over one location field or a latitude/longitude pair.
    Geo,
}

/// An index registered on a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// `collection/number`
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IndexType,
    pub fields: Vec<String>,
}

impl IndexInfo {
    /// Whether this index is of `kind` and starts with `field`.
    pub fn covers(&self, kind: IndexType, field: &str) -> bool {
        self.kind == kind && self.fields.first().is_some_and(|f| f == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_first_field_only() {
        let idx = IndexInfo {
            id: "places/3".into(),
            kind: IndexType::Geo,
            fields: vec!["lat".into(), "lon".into()],
        };
        assert!(idx.covers(IndexType::Geo, "lat"));
        assert!(!idx.covers(IndexType::Geo, "lon"));
        assert!(!idx.covers(IndexType::Fulltext, "lat"));
    }
}
