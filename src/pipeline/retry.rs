// src/pipeline/retry.rs

//! Bounded retry with exponential backoff around a single fetch.
//!
//! Only transport-level failures are retried. Once the budget is spent the
//! last error is returned and the caller skips the item.

use std::time::Duration;

use crate::error::Result;
use crate::models::CrawlerConfig;
use crate::services::{FetchKind, Fetcher, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each later one
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &str,
    kind: FetchKind,
    policy: RetryPolicy,
) -> Result<Payload> {
    let mut attempt = 0;
    loop {
        match fetcher.fetch(url, kind).await {
            Ok(payload) => return Ok(payload),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay(attempt);
                attempt += 1;
                log::warn!(
                    "Fetch failed ({e}), retry {attempt}/{} in {delay:?}",
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
