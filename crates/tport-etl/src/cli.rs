//! Command-line definition for the `tport-etl` binary

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tport_common::schema::DataSource;

use crate::config::EtlConfig;
use crate::pipeline::{RunOptions, SUPPORTED_SOURCES};

/// Transport registry ETL
#[derive(Parser, Debug)]
#[command(name = "tport-etl")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging, including every rejected row
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Elasticsearch URL (overrides TPORT_ES_URL)
    #[arg(long, global = true)]
    pub es_url: Option<String>,

    /// Target index (overrides TPORT_INDEX)
    #[arg(long, global = true)]
    pub index: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, transform and load registry data
    Run {
        /// Data source to process
        #[arg(long, value_enum, default_value_t = SourceArg::Faa)]
        source: SourceArg,

        /// Limit number of rows to process (for testing)
        #[arg(long)]
        limit: Option<usize>,

        /// Process all rows, ignoring --limit
        #[arg(long)]
        full: bool,

        /// Re-download source data even when extracted files exist
        #[arg(long)]
        force_download: bool,

        /// Skip the index refresh after loading
        #[arg(long)]
        no_refresh: bool,

        /// Load into an in-memory store instead of Elasticsearch
        #[arg(long)]
        dry_run: bool,

        /// Documents per bulk request (overrides TPORT_CHUNK_SIZE)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Download and extraction directory (overrides TPORT_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Also read status, airworthiness, Mode S and kit columns from MASTER
        #[arg(long)]
        extended_layout: bool,
    },

    /// Create the unified index
    CreateIndex {
        /// Drop and recreate the index if it already exists
        #[arg(long)]
        recreate: bool,
    },

    /// Show document totals of the index
    Stats,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    /// FAA aircraft registry
    Faa,
    /// Every source with an extractor
    All,
}

impl SourceArg {
    pub fn sources(self) -> Vec<DataSource> {
        match self {
            SourceArg::Faa => vec![DataSource::Faa],
            SourceArg::All => SUPPORTED_SOURCES.to_vec(),
        }
    }
}

impl Cli {
    /// Apply global flag overrides on top of an environment-derived config
    pub fn apply_overrides(&self, config: &mut EtlConfig) {
        if let Some(ref url) = self.es_url {
            config.es_url = url.clone();
        }
        if let Some(ref index) = self.index {
            config.index = index.clone();
        }
        if let Commands::Run {
            chunk_size,
            data_dir,
            ..
        } = &self.command
        {
            if let Some(size) = chunk_size {
                config.chunk_size = *size;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir.clone();
            }
        }
    }
}

/// Run options implied by the `run` flags
pub fn run_options(limit: Option<usize>, full: bool, force_download: bool, no_refresh: bool) -> RunOptions {
    RunOptions {
        limit: if full { None } else { limit },
        force_download,
        refresh: !no_refresh,
        ..Default::default()
    }
}
