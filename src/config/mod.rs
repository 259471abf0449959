//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::calculate::DEFAULT_INVALID_STATE_CODES;
use crate::fetch::FetcherConfig;
use crate::normalize::DEFAULT_MAX_WINNERS_PER_ENTRY;
use crate::parse_duration;
use crate::suggest::DEFAULT_STRATUM_SIZE;

/// Upper bound for the frequency strata, so top and bottom never overlap.
pub const MAX_STRATUM_SIZE: usize = 30;

/// Largest accepted `max_winners_per_entry`.
pub const WINNERS_PER_ENTRY_LIMIT: u32 = 1_000_000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Draw data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint returning the full draw history as a JSON array
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// How long a cached response is fresh, e.g. "1h", "30m"
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_url() -> String {
    "https://loteriascaixa-api.herokuapp.com/api/megasena".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_cache_ttl() -> String {
    "1h".to_string()
}

fn default_user_agent() -> String {
    format!("megasena-analytics/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
            cache_ttl: default_cache_ttl(),
            user_agent: default_user_agent(),
        }
    }
}

impl SourceConfig {
    pub fn cache_ttl_duration(&self) -> Option<Duration> {
        parse_duration(&self.cache_ttl)
    }

    /// Fetcher settings caching under `cache_dir`.
    pub fn fetcher_config(&self, cache_dir: PathBuf) -> FetcherConfig {
        let defaults = FetcherConfig::default();
        FetcherConfig {
            cache_dir,
            cache_ttl: self.cache_ttl_duration().unwrap_or(defaults.cache_ttl),
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
            ..defaults
        }
    }
}

/// Analysis parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// State codes excluded from prize aggregation
    #[serde(default = "default_invalid_state_codes")]
    pub invalid_state_codes: Vec<String>,

    /// Size of the high and low frequency strata
    #[serde(default = "default_stratum_size")]
    pub stratum_size: usize,

    /// Winner entries reporting more winners than this are dropped
    #[serde(default = "default_max_winners_per_entry")]
    pub max_winners_per_entry: u32,
}

fn default_invalid_state_codes() -> Vec<String> {
    DEFAULT_INVALID_STATE_CODES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_stratum_size() -> usize {
    DEFAULT_STRATUM_SIZE
}

fn default_max_winners_per_entry() -> u32 {
    DEFAULT_MAX_WINNERS_PER_ENTRY
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            invalid_state_codes: default_invalid_state_codes(),
            stratum_size: default_stratum_size(),
            max_winners_per_entry: default_max_winners_per_entry(),
        }
    }
}

/// Suggestion request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsConfig {
    /// Suggestions per category when none is requested
    #[serde(default = "default_count")]
    pub default_count: usize,

    #[serde(default = "default_max_count")]
    pub max_count: usize,
}

fn default_count() -> usize {
    1
}

fn default_max_count() -> usize {
    30
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            max_count: default_max_count(),
        }
    }
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

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub suggestions: SuggestionsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            source: SourceConfig::default(),
            analysis: AnalysisConfig::default(),
            suggestions: SuggestionsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Source timeout must be greater than 0".to_string(),
            ));
        }

        if self.source.cache_ttl_duration().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Unparseable cache TTL: {:?}",
                self.source.cache_ttl
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let stratum = self.analysis.stratum_size;
        if !(6..=MAX_STRATUM_SIZE).contains(&stratum) {
            return Err(ConfigError::ValidationError(format!(
                "Stratum size must be between 6 and {}, got {}",
                MAX_STRATUM_SIZE, stratum
            )));
        }

        let cap = self.analysis.max_winners_per_entry;
        if !(1..=WINNERS_PER_ENTRY_LIMIT).contains(&cap) {
            return Err(ConfigError::ValidationError(format!(
                "Max winners per entry must be between 1 and {}, got {}",
                WINNERS_PER_ENTRY_LIMIT, cap
            )));
        }

        let s = &self.suggestions;
        if s.default_count == 0 || s.default_count > s.max_count {
            return Err(ConfigError::ValidationError(format!(
                "Suggestion counts must satisfy 1 <= default ({}) <= max ({})",
                s.default_count, s.max_count
            )));
        }

        Ok(())
    }
}
