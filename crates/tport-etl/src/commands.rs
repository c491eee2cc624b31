//! Command handlers
//!
//! User-facing results go to stdout; diagnostics go through `tracing`.

use std::sync::Arc;

use tracing::{info, warn};

use tport_etl::cli::{run_options, Cli, Commands};
use tport_etl::config::EtlConfig;
use tport_etl::error::Result;
use tport_etl::faa::MasterLayout;
use tport_etl::loader::{provision_index, DocumentStore, ElasticsearchClient, InMemoryStore};
use tport_etl::pipeline::{index_stats, EtlPipeline, PipelineResult};

/// Execute the parsed command line
pub async fn execute(cli: &Cli) -> Result<()> {
    let mut config = EtlConfig::from_env()?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    match &cli.command {
        Commands::Run {
            source,
            limit,
            full,
            force_download,
            no_refresh,
            dry_run,
            extended_layout,
            ..
        } => {
            let store = if *dry_run {
                dry_run_store(&config.index).await?
            } else {
                elasticsearch_store(&config).await?
            };

            let mut pipeline = EtlPipeline::new(config, store);
            if *extended_layout {
                pipeline = pipeline.with_layout(MasterLayout::extended());
            }

            let options = run_options(*limit, *full, *force_download, *no_refresh);
            let results = pipeline.run_all(&source.sources(), &options).await?;
            report(&results);
            Ok(())
        },

        Commands::CreateIndex { recreate } => {
            let client = ElasticsearchClient::new(&config)?;
            provision_index(&client, &config.index, *recreate).await?;
            println!("Created index '{}'", config.index);
            Ok(())
        },

        Commands::Stats => {
            let client = ElasticsearchClient::new(&config)?;
            let stats = index_stats(&client, &config.index).await?;
            println!("Index '{}': {} documents", config.index, stats.total);
            for term in &stats.by_transport_type {
                println!("  - {}: {}", term.term, term.count);
            }
            Ok(())
        },
    }
}

async fn elasticsearch_store(config: &EtlConfig) -> Result<Arc<dyn DocumentStore>> {
    let client = ElasticsearchClient::new(config)?;
    match client.health().await {
        Ok(health) => info!(
            cluster = %health.cluster_name,
            status = %health.status,
            nodes = health.number_of_nodes,
            "Connected to Elasticsearch"
        ),
        Err(e) => warn!(url = client.base_url(), error = %e, "Cluster health unavailable"),
    }
    Ok(Arc::new(client))
}

/// In-memory store with the target index already provisioned
async fn dry_run_store(index: &str) -> Result<Arc<dyn DocumentStore>> {
    let store = InMemoryStore::new();
    provision_index(&store, index, false).await?;
    warn!(index, "Dry run: documents are loaded into memory and discarded");
    Ok(Arc::new(store))
}

fn report(results: &[PipelineResult]) {
    for result in results {
        println!("{}", result.summary());
        if let Some(ref stats) = result.index_stats {
            println!("Index holds {}", stats);
        }
    }
    if results.iter().all(PipelineResult::is_success) {
        println!("ETL pipeline completed successfully");
    } else {
        println!("ETL pipeline completed with load errors");
    }
}
