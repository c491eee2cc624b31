//! ETL configuration
//!
//! Values come from `TPORT_*` environment variables (a `.env` file is loaded
//! first when present), falling back to the defaults below. CLI flags
//! override individual fields after loading.

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

/// Elasticsearch endpoint
pub const DEFAULT_ES_URL: &str = "http://localhost:9200";

/// Index that receives unified records
pub const DEFAULT_INDEX: &str = "transport-unified";

/// Where the FAA archive is downloaded and extracted
pub const DEFAULT_DATA_DIR: &str = "./data/faa";

/// FAA releasable aircraft database
pub const DEFAULT_FAA_URL: &str = "https://registry.faa.gov/database/ReleasableAircraft.zip";

/// Documents per bulk request
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout, sized for the ~60 MB FAA archive
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay between attempts; doubles after each failure
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct EtlConfig {
    pub es_url: String,
    pub index: String,
    pub data_dir: PathBuf,
    pub faa_url: String,
    pub chunk_size: usize,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            es_url: DEFAULT_ES_URL.to_string(),
            index: DEFAULT_INDEX.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            faa_url: DEFAULT_FAA_URL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
        }
    }
}

impl EtlConfig {
    /// Load from `.env` and the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            es_url: std::env::var("TPORT_ES_URL").unwrap_or_else(|_| DEFAULT_ES_URL.to_string()),
            index: std::env::var("TPORT_INDEX").unwrap_or_else(|_| DEFAULT_INDEX.to_string()),
            data_dir: std::env::var("TPORT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            faa_url: std::env::var("TPORT_FAA_URL").unwrap_or_else(|_| DEFAULT_FAA_URL.to_string()),
            chunk_size: parse_env("TPORT_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            connect_timeout_secs: parse_env(
                "TPORT_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
            read_timeout_secs: parse_env("TPORT_READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT_SECS)?,
            max_retries: parse_env("TPORT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_delay_secs: parse_env("TPORT_RETRY_DELAY_SECS", DEFAULT_RETRY_DELAY_SECS)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.es_url.is_empty() {
            anyhow::bail!("Elasticsearch URL cannot be empty");
        }

        if !self.es_url.starts_with("http://") && !self.es_url.starts_with("https://") {
            anyhow::bail!("Elasticsearch URL must start with http:// or https://, got '{}'", self.es_url);
        }

        if self.index.is_empty() || self.index != self.index.to_lowercase() {
            anyhow::bail!("Index name must be non-empty and lowercase, got '{}'", self.index);
        }

        if self.chunk_size == 0 {
            anyhow::bail!("Chunk size must be greater than 0");
        }

        if self.max_retries == 0 {
            anyhow::bail!("Max retries must be at least 1");
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Parse an env var, keeping `default` when unset and failing when malformed
fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value '{}' for {}: {}", raw, key, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EtlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.index, "transport-unified");
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.read_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EtlConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.chunk_size = 10;
        config.index = "Transport".to_string();
        assert!(config.validate().is_err());

        config.index = "transport".to_string();
        config.es_url = "localhost:9200".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_default_when_unset() {
        let value: usize = parse_env("TPORT_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
