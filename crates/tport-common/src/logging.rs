//! Logging configuration and initialization
//!
//! Every binary in the workspace installs one global `tracing` subscriber
//! through [`init_logging`]. Output can go to the console, to daily rolling
//! files, or both, as text or JSON.
//!
//! Library code logs with the `tracing` macros only. Row-level noise
//! (rejected rows, reference misses) belongs at `debug!`, run milestones at
//! `info!`, recoverable store failures at `warn!`.
//!
//! # Example
//!
//! ```no_run
//! use tport_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!
//!     tracing::info!(source = "faa", "Run started");
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use anyhow::Context;
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, format::FmtSpan, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    const NAMES: &'static [(&'static str, LogOutput)] = &[
        ("console", LogOutput::Console),
        ("stdout", LogOutput::Console),
        ("file", LogOutput::File),
        ("both", LogOutput::Both),
    ];

    fn writes_console(self) -> bool {
        self != LogOutput::File
    }

    fn writes_file(self) -> bool {
        self != LogOutput::Console
    }
}

impl std::str::FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        parse_choice("log output", raw, Self::NAMES)
    }
}

/// Line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    const NAMES: &'static [(&'static str, LogFormat)] = &[
        ("text", LogFormat::Text),
        ("pretty", LogFormat::Text),
        ("json", LogFormat::Json),
    ];
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        parse_choice("log format", raw, Self::NAMES)
    }
}

/// Case-insensitive lookup of `raw` in a name table
fn parse_choice<T: Copy>(kind: &str, raw: &str, choices: &[(&str, T)]) -> anyhow::Result<T> {
    let wanted = raw.trim().to_ascii_lowercase();
    choices
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            let names: Vec<&str> = choices.iter().map(|(name, _)| *name).collect();
            anyhow::anyhow!("Unknown {} '{}', expected one of: {}", kind, raw, names.join(", "))
        })
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level that passes the filter
    pub level: Level,
    pub output: LogOutput,
    pub format: LogFormat,
    /// Directory for rolling files; unused for console-only output
    pub log_dir: PathBuf,
    /// File name stem, e.g. "tport-etl" -> "tport-etl.2026-01-18"
    pub file_prefix: String,
    /// Extra directives such as "reqwest=warn" or "tport_etl::loader=debug"
    pub directives: Vec<String>,
    /// Source file and line on every event
    pub with_location: bool,
    pub with_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            output: LogOutput::default(),
            format: LogFormat::default(),
            log_dir: PathBuf::from("logs"),
            file_prefix: "tport".to_string(),
            directives: Vec::new(),
            with_location: false,
            with_targets: true,
        }
    }
}

impl LogConfig {
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder(Self::default())
    }

    /// Defaults overlaid with the `LOG_*` environment, see [`LogConfig::merge_env`]
    pub fn from_env() -> anyhow::Result<Self> {
        Self::default().merge_env()
    }

    /// Overlay the `LOG_*` variables that are set.
    ///
    /// | variable | value |
    /// |---|---|
    /// | `LOG_LEVEL` | trace, debug, info, warn, error |
    /// | `LOG_OUTPUT` | console, file, both |
    /// | `LOG_FORMAT` | text, json |
    /// | `LOG_DIR` | directory for rolling files |
    /// | `LOG_FILE_PREFIX` | file name stem |
    /// | `LOG_FILTER` | comma separated filter directives |
    /// | `LOG_INCLUDE_LOCATION` | true, false |
    pub fn merge_env(mut self) -> anyhow::Result<Self> {
        let var = |key: &str| std::env::var(key).ok().filter(|value| !value.trim().is_empty());

        if let Some(level) = var("LOG_LEVEL") {
            self.level = level
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown log level '{}'", level))?;
        }
        if let Some(output) = var("LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(dir) = var("LOG_DIR") {
            self.log_dir = dir.into();
        }
        if let Some(prefix) = var("LOG_FILE_PREFIX") {
            self.file_prefix = prefix;
        }
        if let Some(filter) = var("LOG_FILTER") {
            self.directives
                .extend(filter.split(',').map(str::trim).filter(|d| !d.is_empty()).map(str::to_string));
        }
        if let Some(flag) = var("LOG_INCLUDE_LOCATION") {
            self.with_location = flag.trim().eq_ignore_ascii_case("true");
        }

        Ok(self)
    }

    fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        self.directives
            .iter()
            .try_fold(EnvFilter::from_default_env().add_directive(self.level.into()), |filter, raw| {
                let directive = raw
                    .parse()
                    .with_context(|| format!("Invalid log filter directive '{}'", raw))?;
                Ok(filter.add_directive(directive))
            })
    }
}

/// Builder for [`LogConfig`]
pub struct LogConfigBuilder(LogConfig);

impl LogConfigBuilder {
    pub fn level(mut self, level: Level) -> Self {
        self.0.level = level;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.0.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.0.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.0.log_dir = dir.into();
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.0.file_prefix = prefix.into();
        self
    }

    /// Add one filter directive; may be called repeatedly
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.0.directives.push(directive.into());
        self
    }

    pub fn with_location(mut self, enabled: bool) -> Self {
        self.0.with_location = enabled;
        self
    }

    pub fn build(self) -> LogConfig {
        self.0
    }
}

/// Keeps the non-blocking file writer flushing until dropped.
///
/// Hold it in `main` for the lifetime of the process.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// One formatting layer writing to `writer`
fn format_layer<S, W>(config: &LogConfig, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(config.with_targets)
        .with_file(config.with_location)
        .with_line_number(config.with_location)
        .with_span_events(FmtSpan::CLOSE);

    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Text => layer.boxed(),
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails if a subscriber is already installed or a filter directive is malformed.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<LogGuard> {
    let filter = config.env_filter()?;

    let mut guard = None;
    let file_layer = if config.output.writes_file() {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.file_prefix);
        let (writer, worker) = tracing_appender::non_blocking(appender);
        guard = Some(worker);
        Some(format_layer(config, writer, false))
    } else {
        None
    };

    let console_layer = config
        .output
        .writes_console()
        .then(|| format_layer(config, std::io::stdout, true));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LogGuard { _file: guard })
}
