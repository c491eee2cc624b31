//! Document store interface
//!
//! The loader talks to its target only through [`DocumentStore`], so the
//! Elasticsearch client and the in-memory store are interchangeable.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// One addressed write; indexing the same id twice replaces the document
#[derive(Debug, Clone, PartialEq)]
pub struct IndexAction {
    pub id: String,
    pub document: Value,
}

impl IndexAction {
    pub fn new(id: impl Into<String>, document: Value) -> Self {
        Self {
            id: id.into(),
            document,
        }
    }
}

/// A document the store refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemError {
    pub id: String,
    pub status: u16,
    pub reason: String,
}

/// Outcome of one bulk request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkResponse {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BulkItemError>,
}

/// Document count for one term of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Create `index` with the given mapping.
    ///
    /// Fails with [`crate::error::EtlError::IndexExists`] when it is already there.
    async fn create_index(&self, index: &str, mapping: &Value) -> Result<()>;

    /// Returns false when there was nothing to delete
    async fn delete_index(&self, index: &str) -> Result<bool>;

    /// Write all actions in one request; per-document failures are reported,
    /// not raised
    async fn bulk_index(&self, index: &str, actions: &[IndexAction]) -> Result<BulkResponse>;

    /// Make recent writes visible to search
    async fn refresh(&self, index: &str) -> Result<()>;

    async fn count(&self, index: &str) -> Result<u64>;

    /// Document counts per distinct value of `field`, largest first
    async fn terms_aggregation(&self, index: &str, field: &str) -> Result<Vec<TermCount>>;

    async fn get(&self, index: &str, id: &str) -> Result<Option<Value>>;

    /// Returns false when the document did not exist
    async fn delete(&self, index: &str, id: &str) -> Result<bool>;
}
