//! Chunked bulk loader
//!
//! Records are written addressed by `transport_id`, so loading the same
//! record again replaces the stored document. A document the store refuses
//! is counted and its siblings still land; a chunk that cannot be submitted
//! at all is counted as errors and the next chunk is attempted.

use std::sync::Arc;

use tport_common::schema::UnifiedRecord;
use tracing::{debug, info, warn};

use super::store::{DocumentStore, IndexAction};
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::{EtlError, Result};

/// Refused documents logged per chunk
const MAX_LOGGED_ERRORS: usize = 5;

/// Aggregate outcome of a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub total: usize,
    pub success_count: usize,
    pub error_count: usize,
}

impl LoadStats {
    /// Percentage of submitted documents that were stored
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.success_count as f64 / self.total as f64 * 100.0
        }
    }
}

pub struct BulkLoader {
    store: Arc<dyn DocumentStore>,
    index: String,
    chunk_size: usize,
    refresh: bool,
}

impl BulkLoader {
    pub fn new(store: Arc<dyn DocumentStore>, index: impl Into<String>) -> Self {
        Self {
            store,
            index: index.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            refresh: true,
        }
    }

    /// Documents per bulk request; zero is treated as one
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Refresh the index after the last chunk
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Fail unless the target index exists; indices are never created here
    pub async fn ensure_index(&self) -> Result<()> {
        if self.store.index_exists(&self.index).await? {
            Ok(())
        } else {
            Err(EtlError::IndexNotFound(self.index.clone()))
        }
    }

    /// Load validated records, encoding one chunk at a time
    pub async fn load(&self, records: &[UnifiedRecord]) -> Result<LoadStats> {
        self.ensure_index().await?;
        self.log_start(records.len());

        let mut stats = LoadStats {
            total: records.len(),
            ..Default::default()
        };
        let chunk_count = records.len().div_ceil(self.chunk_size);

        for (n, chunk) in records.chunks(self.chunk_size).enumerate() {
            let mut actions = Vec::with_capacity(chunk.len());
            for record in chunk {
                match record.to_document() {
                    Ok(document) => actions.push(IndexAction::new(record.transport_id(), document)),
                    Err(e) => {
                        warn!(id = record.transport_id(), error = %e, "Failed to encode record");
                        stats.error_count += 1;
                    },
                }
            }
            if !actions.is_empty() {
                self.submit_chunk(n, chunk_count, &actions, &mut stats).await;
            }
        }

        self.finish(stats).await
    }

    /// Load prepared actions in chunks
    pub async fn load_actions(&self, actions: &[IndexAction]) -> Result<LoadStats> {
        self.ensure_index().await?;
        self.log_start(actions.len());

        let mut stats = LoadStats {
            total: actions.len(),
            ..Default::default()
        };
        let chunk_count = actions.len().div_ceil(self.chunk_size);

        for (n, chunk) in actions.chunks(self.chunk_size).enumerate() {
            self.submit_chunk(n, chunk_count, chunk, &mut stats).await;
        }

        self.finish(stats).await
    }

    fn log_start(&self, documents: usize) {
        info!(
            index = %self.index,
            store = self.store.name(),
            documents,
            chunks = documents.div_ceil(self.chunk_size),
            chunk_size = self.chunk_size,
            "Loading documents"
        );
    }

    /// Send chunk `n` and fold its outcome into `stats`; a failed request counts every document
    async fn submit_chunk(&self, n: usize, chunk_count: usize, chunk: &[IndexAction], stats: &mut LoadStats) {
        match self.store.bulk_index(&self.index, chunk).await {
            Ok(response) => {
                stats.success_count += response.succeeded;
                stats.error_count += response.failed;

                for error in response.errors.iter().take(MAX_LOGGED_ERRORS) {
                    warn!(id = %error.id, status = error.status, reason = %error.reason, "Document rejected");
                }
                if response.errors.len() > MAX_LOGGED_ERRORS {
                    warn!(
                        chunk = n + 1,
                        more = response.errors.len() - MAX_LOGGED_ERRORS,
                        "Further document rejections not shown"
                    );
                }
                debug!(
                    chunk = n + 1,
                    of = chunk_count,
                    succeeded = response.succeeded,
                    failed = response.failed,
                    "Chunk loaded"
                );
            },
            Err(e) => {
                warn!(chunk = n + 1, documents = chunk.len(), error = %e, "Chunk submission failed");
                stats.error_count += chunk.len();
            },
        }

        if (n + 1) % 10 == 0 {
            info!(
                loaded = stats.success_count,
                errors = stats.error_count,
                total = stats.total,
                "Loading progress"
            );
        }
    }

    async fn finish(&self, stats: LoadStats) -> Result<LoadStats> {
        if self.refresh {
            self.store.refresh(&self.index).await?;
        }

        info!(
            index = %self.index,
            loaded = stats.success_count,
            errors = stats.error_count,
            "Load finished"
        );

        Ok(stats)
    }
}
