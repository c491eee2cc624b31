//! Registry ETL pipeline
//!
//! Orchestrates one source from archive download to indexed documents:
//!
//! 1. Extraction: fetch and unpack the registry files
//! 2. Transformation: build the reference index, normalize every MASTER row
//! 3. Loading: bulk write the records
//! 4. Index statistics: document totals per transport type

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tport_common::schema::DataSource;
use tracing::{info, warn};

use crate::codes::CodeDictionary;
use crate::config::EtlConfig;
use crate::error::{EtlError, Result};
use crate::faa::{FaaExtractor, FaaNormalizer, FaaTransformer, MasterLayout, TransformStats};
use crate::loader::{BulkLoader, DocumentStore, LoadStats, TermCount};
use crate::reference::ReferenceIndex;

/// Sources with an extractor
pub const SUPPORTED_SOURCES: &[DataSource] = &[DataSource::Faa];

/// Field the index statistics are grouped by
const TRANSPORT_TYPE_FIELD: &str = "transport_type";

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stop after this many data rows
    pub limit: Option<usize>,
    /// Download the archive even when extracted files exist
    pub force_download: bool,
    /// Refresh the index after loading
    pub refresh: bool,
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            limit: None,
            force_download: false,
            refresh: true,
            show_progress: true,
        }
    }
}

/// Document totals of the target index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub total: u64,
    pub by_transport_type: Vec<TermCount>,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} documents", self.total)?;
        for term in &self.by_transport_type {
            write!(f, ", {}={}", term.term, term.count)?;
        }
        Ok(())
    }
}

/// Count documents in `index`, grouped by transport type
pub async fn index_stats(store: &dyn DocumentStore, index: &str) -> Result<IndexStats> {
    if !store.index_exists(index).await? {
        return Err(EtlError::IndexNotFound(index.to_string()));
    }

    Ok(IndexStats {
        total: store.count(index).await?,
        by_transport_type: store.terms_aggregation(index, TRANSPORT_TYPE_FIELD).await?,
    })
}

/// Result of running the pipeline for one source
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub source: DataSource,
    pub transform: TransformStats,
    pub load: LoadStats,
    /// Absent when statistics could not be read after loading
    pub index_stats: Option<IndexStats>,
    pub duration: Duration,
}

impl PipelineResult {
    /// Loaded documents as a percentage of transformed records
    pub fn success_rate(&self) -> f64 {
        if self.transform.transformed == 0 {
            0.0
        } else {
            self.load.success_count as f64 / self.transform.transformed as f64 * 100.0
        }
    }

    /// Every transformed record was loaded
    pub fn is_success(&self) -> bool {
        self.load.success_count > 0 && self.load.error_count == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} transformed, {} rejected, {} loaded, {} errors ({:.1}% success) in {:.1}s",
            self.source,
            self.transform.transformed,
            self.transform.rejected(),
            self.load.success_count,
            self.load.error_count,
            self.success_rate(),
            self.duration.as_secs_f64()
        )
    }
}

pub struct EtlPipeline {
    config: EtlConfig,
    store: Arc<dyn DocumentStore>,
    layout: MasterLayout,
}

impl EtlPipeline {
    pub fn new(config: EtlConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            store,
            layout: MasterLayout::default(),
        }
    }

    /// Read the optional MASTER columns described by `layout`
    pub fn with_layout(mut self, layout: MasterLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Run every source in `sources` in order, stopping at the first failure
    pub async fn run_all(&self, sources: &[DataSource], options: &RunOptions) -> Result<Vec<PipelineResult>> {
        let mut results = Vec::with_capacity(sources.len());
        for source in sources {
            results.push(self.run(*source, options).await?);
        }
        Ok(results)
    }

    pub async fn run(&self, source: DataSource, options: &RunOptions) -> Result<PipelineResult> {
        match source {
            DataSource::Faa => self.run_faa(options).await,
            other => Err(EtlError::config(format!("no extractor is available for source '{}'", other))),
        }
    }

    /// Run the FAA registry pipeline
    pub async fn run_faa(&self, options: &RunOptions) -> Result<PipelineResult> {
        let started = Instant::now();
        info!(
            index = %self.config.index,
            store = self.store.name(),
            "Starting FAA registry pipeline"
        );

        let loader = BulkLoader::new(self.store.clone(), self.config.index.clone())
            .with_chunk_size(self.config.chunk_size)
            .with_refresh(options.refresh);

        // Checked up front so a missing index does not cost a download
        loader.ensure_index().await?;

        info!("Phase 1: Extraction");
        let extractor = FaaExtractor::new(&self.config)?.with_progress(options.show_progress);
        let files = extractor.extract(options.force_download).await?;

        info!("Phase 2: Transformation");
        let references = ReferenceIndex::load(&files.aircraft_ref, &files.engine)?;
        if let Some(limit) = options.limit {
            warn!(limit, "Row limit is set, only the first {} rows will be processed", limit);
        }
        let normalizer =
            FaaNormalizer::new(CodeDictionary::faa(), &references).with_layout(self.layout);
        let output = FaaTransformer::new(normalizer).transform_file(&files.master, options.limit)?;

        if output.records.is_empty() {
            return Err(EtlError::NoValidRecords(files.master.display().to_string()));
        }

        info!("Phase 3: Loading");
        let load = loader.load(&output.records).await?;

        info!("Phase 4: Index statistics");
        let stats = match index_stats(self.store.as_ref(), &self.config.index).await {
            Ok(stats) => {
                info!(index = %self.config.index, "Index now holds {}", stats);
                Some(stats)
            },
            Err(e) => {
                warn!(error = %e, "Could not read index statistics");
                None
            },
        };

        let result = PipelineResult {
            source: DataSource::Faa,
            transform: output.stats,
            load,
            index_stats: stats,
            duration: started.elapsed(),
        };
        info!("{}", result.summary());

        Ok(result)
    }
}
