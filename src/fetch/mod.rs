//! HTTP fetching with caching.
//!
//! Fetches raw API responses and caches them under the raw data directory, so
//! an analysis can be rebuilt without the network. A cached response past its
//! TTL is not served by [`Fetcher::fetch`] but stays available as a stale
//! fallback through [`Fetcher::get_cached`].

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a fetch operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    /// Original URL that was fetched
    pub url: Url,

    /// Path where content is cached
    pub cache_path: PathBuf,

    pub content_type: Option<String>,

    /// Content length in bytes
    pub content_length: usize,

    /// When the content was fetched
    pub fetched_at: DateTime<Utc>,

    /// Whether this was served from cache
    pub from_cache: bool,

    /// Whether the cached copy is past its TTL
    pub stale: bool,

    /// ETag if provided by server
    pub etag: Option<String>,
}

/// Metadata stored alongside cached content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub content_type: Option<String>,
    pub content_length: usize,
    pub etag: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Directory to cache raw responses
    pub cache_dir: PathBuf,

    /// How long cached content is considered fresh
    pub cache_ttl: Duration,

    /// Maximum response size (default 64MB)
    pub max_content_size: usize,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/raw"),
            cache_ttl: Duration::from_secs(3600),
            max_content_size: 64 * 1024 * 1024,
            timeout: Duration::from_secs(30),
            user_agent: format!("megasena-analytics/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP fetcher with local caching.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("megasena-analytics")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch a URL, using cache if available and fresh.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        if let Some(result) = self.check_cache(url, false).await? {
            return Ok(result);
        }
        self.fetch_and_cache(url).await
    }

    /// Force fetch from network, ignoring cache.
    pub async fn fetch_fresh(&self, url: &Url) -> Result<FetchResult, FetchError> {
        self.fetch_and_cache(url).await
    }

    /// Get content from cache without network fallback.
    ///
    /// With `allow_stale`, an expired entry is still returned, flagged `stale`.
    pub async fn get_cached(&self, url: &Url, allow_stale: bool) -> Option<FetchResult> {
        self.check_cache(url, allow_stale).await.ok().flatten()
    }

    async fn check_cache(
        &self,
        url: &Url,
        allow_stale: bool,
    ) -> Result<Option<FetchResult>, FetchError> {
        let cache_path = self.cache_path_for_url(url);
        let meta_path = self.meta_path_for_url(url);
        if !cache_path.exists() || !meta_path.exists() {
            return Ok(None);
        }

        let meta_content = fs::read_to_string(&meta_path).await?;
        let meta: CacheMetadata = match serde_json::from_str(&meta_content) {
            Ok(m) => m,
            Err(_) => return Ok(None),
        };

        let age = Utc::now().signed_duration_since(meta.fetched_at);
        let stale = age.num_seconds() > self.config.cache_ttl.as_secs() as i64;
        if stale && !allow_stale {
            debug!("Cache expired for {}", url);
            return Ok(None);
        }

        if stale {
            info!("Serving stale cached copy of {}", url);
        } else {
            info!("Serving {} from cache", url);
        }
        Ok(Some(FetchResult {
            url: url.clone(),
            cache_path,
            content_type: meta.content_type,
            content_length: meta.content_length,
            fetched_at: meta.fetched_at,
            from_cache: true,
            stale,
            etag: meta.etag,
        }))
    }

    async fn fetch_and_cache(&self, url: &Url) -> Result<FetchResult, FetchError> {
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };
        let content_type = header("content-type");
        let etag = header("etag");

        let content = response.bytes().await?;

        if content.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len(),
                max_size: self.config.max_content_size,
            });
        }

        self.write_cache(url, &content, content_type, etag, Utc::now())
            .await
    }

    /// Store `content` for `url` as if fetched at `fetched_at`.
    pub(crate) async fn write_cache(
        &self,
        url: &Url,
        content: &[u8],
        content_type: Option<String>,
        etag: Option<String>,
        fetched_at: DateTime<Utc>,
    ) -> Result<FetchResult, FetchError> {
        let cache_path = self.cache_path_for_url(url);
        let meta_path = self.meta_path_for_url(url);

        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&cache_path).await?;
        file.write_all(content).await?;
        file.flush().await?;

        let meta = CacheMetadata {
            url: url.to_string(),
            fetched_at,
            content_type: content_type.clone(),
            content_length: content.len(),
            etag: etag.clone(),
            expires_at: Some(
                fetched_at + chrono::Duration::seconds(self.config.cache_ttl.as_secs() as i64),
            ),
        };

        let meta_json = serde_json::to_string_pretty(&meta)?;
        fs::write(&meta_path, meta_json).await?;

        Ok(FetchResult {
            url: url.clone(),
            cache_path,
            content_type,
            content_length: content.len(),
            fetched_at,
            from_cache: false,
            stale: false,
            etag,
        })
    }

    fn cache_path_for_url(&self, url: &Url) -> PathBuf {
        self.host_dir(url).join(format!("{}.json", Self::url_hash(url)))
    }

    fn meta_path_for_url(&self, url: &Url) -> PathBuf {
        self.host_dir(url)
            .join(format!("{}.meta.json", Self::url_hash(url)))
    }

    fn host_dir(&self, url: &Url) -> PathBuf {
        self.config
            .cache_dir
            .join(url.host_str().unwrap_or("unknown"))
    }

    /// Hash a URL to a short string.
    fn url_hash(url: &Url) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    /// Read cached content as a string.
    pub async fn read_cached_text(&self, result: &FetchResult) -> Result<String, FetchError> {
        Ok(fs::read_to_string(&result.cache_path).await?)
    }
}

/// Parse `raw` as a URL, mapping failures to [`FetchError::InvalidUrl`].
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))
}
