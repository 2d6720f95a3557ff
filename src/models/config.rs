//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SelectorsConfig;
use crate::services::Schemas;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote source location and fixture range
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Local mirror layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// CSS selectors for listing, detail, and classification pages
    #[serde(default)]
    pub selectors: SelectorsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(AppError::validation("source.base_url is empty"));
        }
        Url::parse(&self.source.base_url)?;
        if self.source.fixture_start > self.source.fixture_end {
            return Err(AppError::validation(
                "source.fixture_start must be <= source.fixture_end",
            ));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        Schemas::compile(&self.selectors)?;
        Ok(())
    }
}

/// Where fixtures are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Scheme + host prepended to relative links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path + query prefix the fixture ID is appended to
    #[serde(default = "defaults::listing_endpoint")]
    pub listing_endpoint: String,

    /// First fixture ID of the range (inclusive)
    #[serde(default = "defaults::fixture_start")]
    pub fixture_start: u64,

    /// Last fixture ID of the range (inclusive)
    #[serde(default = "defaults::fixture_end")]
    pub fixture_end: u64,

    /// Fixture whose page carries the classification table
    #[serde(default = "defaults::fixture_end")]
    pub classification_fixture_id: u64,
}

impl SourceConfig {
    /// Listing URL for one fixture.
    pub fn listing_url(&self, fixture_id: u64) -> String {
        format!("{}{}{}", self.base_url, self.listing_endpoint, fixture_id)
    }

    /// Configured fixture IDs in ascending order.
    pub fn fixture_ids(&self) -> std::ops::RangeInclusive<u64> {
        self.fixture_start..=self.fixture_end
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            listing_endpoint: defaults::listing_endpoint(),
            fixture_start: defaults::fixture_start(),
            fixture_end: defaults::fixture_end(),
            classification_fixture_id: defaults::fixture_end(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum interval between outgoing requests in milliseconds (0 disables)
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum items processed concurrently
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Extra attempts after a failed fetch (0 disables retry)
    #[serde(default)]
    pub max_retries: u32,

    /// Base backoff between retries in milliseconds, doubled per attempt
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Fetch assets again even when the destination file exists
    #[serde(default)]
    pub redownload_assets: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            max_retries: 0,
            retry_backoff_ms: defaults::retry_backoff(),
            redownload_assets: false,
        }
    }
}

/// Local mirror layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory of the mirrored tree
    #[serde(default = "defaults::root")]
    pub root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: defaults::root(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn base_url() -> String {
        "https://resultados.fpf.pt".into()
    }
    pub fn listing_endpoint() -> String {
        "/Competition/GetClassificationAndMatchesByFixture?fixtureId=".into()
    }
    pub fn fixture_start() -> u64 {
        505659
    }
    pub fn fixture_end() -> u64 {
        505680
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; fixture-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn retry_backoff() -> u64 {
        500
    }

    // Path defaults
    pub fn root() -> PathBuf {
        PathBuf::from("data")
    }
}
