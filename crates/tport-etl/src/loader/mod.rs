//! Bulk loading into a document store

pub mod bulk;
pub mod elasticsearch;
pub mod mapping;
pub mod memory;
pub mod store;

pub use bulk::{BulkLoader, LoadStats};
pub use elasticsearch::{ClusterHealth, ElasticsearchClient};
pub use mapping::{index_mapping, provision_index};
pub use memory::InMemoryStore;
pub use store::{BulkItemError, BulkResponse, DocumentStore, IndexAction, TermCount};
