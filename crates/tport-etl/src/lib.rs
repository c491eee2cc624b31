//! Transport Registry ETL
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Turns public vehicle registry extracts into unified transport records and
//! bulk loads them into Elasticsearch.
//!
//! # Overview
//!
//! - **Code Dictionary** ([`codes`]): registry codes to canonical tokens
//! - **Reference Index** ([`reference`]): aircraft and engine lookup tables
//! - **Record Normalizer** ([`normalize`], [`faa`]): raw rows to validated records
//! - **Bulk Loader** ([`loader`]): chunked, idempotent writes to a document store
//! - **Pipeline** ([`pipeline`]): extract, transform, load for one source
//!
//! The unified schema and its validator live in `tport_common::schema`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tport_etl::config::EtlConfig;
//! use tport_etl::loader::ElasticsearchClient;
//! use tport_etl::pipeline::{EtlPipeline, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EtlConfig::from_env()?;
//!     let store = Arc::new(ElasticsearchClient::new(&config)?);
//!     let pipeline = EtlPipeline::new(config, store);
//!
//!     let result = pipeline.run_faa(&RunOptions::default()).await?;
//!     println!("{}", result.summary());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod codes;
pub mod config;
pub mod error;
pub mod faa;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod reference;

// Re-export commonly used types
pub use error::{EtlError, Result};
