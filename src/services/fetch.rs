// src/services/fetch.rs

//! Fetcher: network retrieval of pages, listings, and images.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::services::RateLimiter;

/// How a response body should be requested and decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Html,
    Json,
    Binary,
}

impl FetchKind {
    fn accept(&self) -> &'static str {
        match self {
            FetchKind::Html => "text/html,application/xhtml+xml",
            FetchKind::Json => "application/json",
            FetchKind::Binary => "image/*,*/*",
        }
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    /// Body as text; binary bodies are decoded lossily.
    pub fn into_text(self) -> String {
        match self {
            Payload::Text(text) => text,
            Payload::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }
}

/// Retrieves a single resource. Implementations do not retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, failing with [`AppError::Network`] on transport errors,
    /// timeouts, and non-2xx statuses.
    async fn fetch(&self, url: &str, kind: FetchKind) -> Result<Payload>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &CrawlerConfig) -> Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))
}

/// `reqwest`-backed fetcher with an optional shared rate limiter.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    limiter: Option<Arc<RateLimiter>>,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            limiter: None,
        }
    }

    /// Build a client and limiter from the crawler settings.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        let fetcher = Self::new(create_client(config)?);
        Ok(match RateLimiter::from_millis(config.request_delay_ms) {
            Some(limiter) => fetcher.with_rate_limiter(Arc::new(limiter)),
            None => fetcher,
        })
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, kind: FetchKind) -> Result<Payload> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }

        log::debug!("GET {url} ({kind:?})");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, kind.accept())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::network(url, e))?;

        match kind {
            FetchKind::Binary => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| AppError::network(url, e))?;
                Ok(Payload::Binary(bytes.to_vec()))
            }
            FetchKind::Html | FetchKind::Json => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| AppError::network(url, e))?;
                Ok(Payload::Text(text))
            }
        }
    }
}
