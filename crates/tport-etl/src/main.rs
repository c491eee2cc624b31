//! tport-etl - Main entry point

mod commands;

use std::process;

use clap::Parser;
use tport_common::logging::{init_logging, LogConfig, LogOutput};
use tport_etl::cli::Cli;
use tracing::{error, Level};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .file_prefix("tport-etl")
        .build();

    // LOG_* variables take precedence over the defaults above
    let log_config = match log_config.clone().merge_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring logging environment: {}", e);
            log_config
        },
    };

    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        },
    };

    if let Err(e) = commands::execute(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
