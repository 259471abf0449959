//! Raw draw sources.
//!
//! A source yields the raw JSON draw records; normalization happens later.
//! All sources implement the `DrawSource` trait.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::fetch::{FetchError, Fetcher};

/// Errors that can occur while loading raw draws.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array of draws, got {0}")]
    UnexpectedShape(&'static str),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Provider of raw draw records.
#[async_trait]
pub trait DrawSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Load every raw draw. `fresh` bypasses any response cache.
    async fn load(&self, fresh: bool) -> Result<Vec<Value>, SourceError>;
}

/// Parse a response body into raw draw records.
///
/// A single object (a "latest draw" endpoint) is accepted as a one-draw list.
pub fn parse_draw_list(text: &str) -> Result<Vec<Value>, SourceError> {
    match serde_json::from_str(text)? {
        Value::Array(items) => Ok(items),
        object @ Value::Object(_) => Ok(vec![object]),
        Value::Null => Err(SourceError::UnexpectedShape("null")),
        Value::Bool(_) => Err(SourceError::UnexpectedShape("a boolean")),
        Value::Number(_) => Err(SourceError::UnexpectedShape("a number")),
        Value::String(_) => Err(SourceError::UnexpectedShape("a string")),
    }
}

/// The public results API, read through the caching fetcher.
pub struct HttpDrawSource {
    fetcher: Fetcher,
    url: Url,
}

impl HttpDrawSource {
    pub fn new(fetcher: Fetcher, url: Url) -> Self {
        Self { fetcher, url }
    }
}

#[async_trait]
impl DrawSource for HttpDrawSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn load(&self, fresh: bool) -> Result<Vec<Value>, SourceError> {
        let fetched = if fresh {
            self.fetcher.fetch_fresh(&self.url).await
        } else {
            self.fetcher.fetch(&self.url).await
        };

        let result = match fetched {
            Ok(result) => result,
            Err(e) => match self.fetcher.get_cached(&self.url, true).await {
                Some(stale) => {
                    warn!(
                        "Fetching {} failed ({}), using cached copy from {}",
                        self.url, e, stale.fetched_at
                    );
                    stale
                }
                None => return Err(e.into()),
            },
        };

        let text = self.fetcher.read_cached_text(&result).await?;
        let draws = parse_draw_list(&text)?;
        info!(
            "Loaded {} raw draws from {} (cached: {})",
            draws.len(),
            self.url,
            result.from_cache
        );
        Ok(draws)
    }
}

/// A local JSON file holding the same payload as the API.
pub struct FileDrawSource {
    path: PathBuf,
}

impl FileDrawSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DrawSource for FileDrawSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, _fresh: bool) -> Result<Vec<Value>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let draws = parse_draw_list(&text)?;
        info!("Loaded {} raw draws from {:?}", draws.len(), self.path);
        Ok(draws)
    }
}

/// In-memory draws, or a source that always fails.
#[derive(Debug, Clone)]
pub struct MemoryDrawSource {
    draws: Option<Vec<Value>>,
}

impl MemoryDrawSource {
    pub fn new(draws: Vec<Value>) -> Self {
        Self { draws: Some(draws) }
    }

    /// A source whose every load fails.
    pub fn unavailable() -> Self {
        Self { draws: None }
    }
}

#[async_trait]
impl DrawSource for MemoryDrawSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, _fresh: bool) -> Result<Vec<Value>, SourceError> {
        self.draws
            .clone()
            .ok_or_else(|| SourceError::Unavailable("no draws configured".to_string()))
    }
}
