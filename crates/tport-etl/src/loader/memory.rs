//! In-memory document store for dry runs and tests

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::store::{BulkItemError, BulkResponse, DocumentStore, IndexAction, TermCount};
use crate::error::{EtlError, Result};

#[derive(Debug, Default)]
struct MemoryIndex {
    mapping: Value,
    documents: BTreeMap<String, Value>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    indices: Mutex<HashMap<String, MemoryIndex>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, MemoryIndex>>> {
        self.indices
            .lock()
            .map_err(|_| EtlError::store("in-memory store lock poisoned"))
    }

    /// Mapping the index was created with
    pub fn mapping(&self, index: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(index).map(|idx| idx.mapping.clone()))
    }
}

/// Follow a dotted path such as `owner.type`
fn field_value<'v>(document: &'v Value, field: &str) -> Option<&'v Value> {
    field
        .split('.')
        .try_fold(document, |value, key| value.get(key))
}

fn missing(index: &str) -> EtlError {
    EtlError::IndexNotFound(index.to_string())
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(index))
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<()> {
        let mut indices = self.lock()?;
        if indices.contains_key(index) {
            return Err(EtlError::IndexExists(index.to_string()));
        }
        indices.insert(
            index.to_string(),
            MemoryIndex {
                mapping: mapping.clone(),
                documents: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<bool> {
        Ok(self.lock()?.remove(index).is_some())
    }

    async fn bulk_index(&self, index: &str, actions: &[IndexAction]) -> Result<BulkResponse> {
        let mut indices = self.lock()?;
        let target = indices.get_mut(index).ok_or_else(|| missing(index))?;

        let mut response = BulkResponse::default();
        for action in actions {
            if action.id.is_empty() || !action.document.is_object() {
                response.failed += 1;
                response.errors.push(BulkItemError {
                    id: action.id.clone(),
                    status: 400,
                    reason: "document must be a JSON object with a non-empty id".to_string(),
                });
                continue;
            }
            target.documents.insert(action.id.clone(), action.document.clone());
            response.succeeded += 1;
        }
        Ok(response)
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        if self.lock()?.contains_key(index) {
            Ok(())
        } else {
            Err(missing(index))
        }
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let indices = self.lock()?;
        let target = indices.get(index).ok_or_else(|| missing(index))?;
        Ok(target.documents.len() as u64)
    }

    async fn terms_aggregation(&self, index: &str, field: &str) -> Result<Vec<TermCount>> {
        let indices = self.lock()?;
        let target = indices.get(index).ok_or_else(|| missing(index))?;

        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for document in target.documents.values() {
            if let Some(Value::String(term)) = field_value(document, field) {
                *counts.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<TermCount> = counts
            .into_iter()
            .map(|(term, count)| TermCount { term, count })
            .collect();
        terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        Ok(terms)
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<Value>> {
        let indices = self.lock()?;
        let target = indices.get(index).ok_or_else(|| missing(index))?;
        Ok(target.documents.get(id).cloned())
    }

    async fn delete(&self, index: &str, id: &str) -> Result<bool> {
        let mut indices = self.lock()?;
        let target = indices.get_mut(index).ok_or_else(|| missing(index))?;
        Ok(target.documents.remove(id).is_some())
    }
}
