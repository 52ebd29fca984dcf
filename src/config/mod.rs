//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Prefix of environment overrides, e.g. `FPL__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "FPL";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to load config: {0}")]
    LoadError(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// FPL API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-attempt timeout for standard calls
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Per-attempt timeout for large payloads
    #[serde(default = "default_long_timeout")]
    pub long_timeout_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry budget for per-manager enrichment calls
    #[serde(default = "default_manager_retries")]
    pub manager_retries: u32,

    #[serde(default = "default_backoff_step")]
    pub backoff_step_ms: u64,
}

fn default_base_url() -> String {
    "https://fantasy.premierleague.com/api/".to_string()
}

fn default_user_agent() -> String {
    format!("fpl-league/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    10
}

fn default_long_timeout() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    2
}

fn default_manager_retries() -> u32 {
    1
}

fn default_backoff_step() -> u64 {
    1000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            long_timeout_seconds: default_long_timeout(),
            max_retries: default_max_retries(),
            manager_retries: default_manager_retries(),
            backoff_step_ms: default_backoff_step(),
        }
    }
}

/// Aggregation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Standings entries enriched per league
    #[serde(default = "default_max_managers")]
    pub max_managers: usize,

    /// Concurrent upstream requests during enrichment
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_enrichment_deadline")]
    pub enrichment_deadline_seconds: u64,
}

fn default_max_managers() -> usize {
    15
}

fn default_concurrency() -> usize {
    3
}

fn default_enrichment_deadline() -> u64 {
    20
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_managers: default_max_managers(),
            concurrency: default_concurrency(),
            enrichment_deadline_seconds: default_enrichment_deadline(),
        }
    }
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Freshness window
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,

    /// How long entries are kept for stale fallback
    #[serde(default = "default_retention")]
    pub retention_seconds: u64,

    /// Redis connection URL; in-process cache when unset
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_ttl() -> u64 {
    120
}

fn default_retention() -> u64 {
    24 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            retention_seconds: default_retention(),
            redis_url: None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub aggregation: AggregationConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file layered with
    /// `FPL__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.server.port == 0 {
            return invalid("Server port must be greater than 0");
        }
        if self.upstream.timeout_seconds == 0 || self.upstream.long_timeout_seconds == 0 {
            return invalid("Upstream timeouts must be greater than 0");
        }
        if self.aggregation.concurrency == 0 {
            return invalid("Aggregation concurrency must be greater than 0");
        }
        if self.aggregation.max_managers == 0 {
            return invalid("Aggregation max_managers must be greater than 0");
        }
        if self.aggregation.enrichment_deadline_seconds == 0 {
            return invalid("Enrichment deadline must be greater than 0");
        }
        if self.cache.ttl_seconds == 0 {
            return invalid("Cache TTL must be greater than 0");
        }
        if self.cache.retention_seconds < self.cache.ttl_seconds {
            return invalid("Cache retention must not be shorter than the TTL");
        }

        Ok(())
    }
}
