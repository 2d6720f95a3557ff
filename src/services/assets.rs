// src/services/assets.rs

//! Asset mirror.
//!
//! Downloads team logos and player photos to deterministic paths under the
//! mirror root. One mirror instance lives for one run: within that run,
//! concurrent requests for the same destination share a single download.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::error::{AppError, Result};
use crate::models::AssetRef;
use crate::pipeline::retry::{RetryPolicy, fetch_with_retry};
use crate::services::{FetchKind, Fetcher};
use crate::storage::local::write_atomic;

type SharedOutcome = std::result::Result<PathBuf, String>;

/// Destination claimed by a source URL during this run.
struct Slot {
    url: String,
    outcome: Arc<OnceCell<SharedOutcome>>,
}

/// Run-scoped asset downloader with per-path coalescing.
pub struct AssetMirror {
    root: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    retry: RetryPolicy,
    redownload: bool,
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl AssetMirror {
    pub fn new(root: impl Into<PathBuf>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            root: root.into(),
            fetcher,
            retry: RetryPolicy::none(),
            redownload: false,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch assets again even when the destination already exists.
    pub fn with_redownload(mut self, redownload: bool) -> Self {
        self.redownload = redownload;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Mirror one asset and return its path relative to the root.
    ///
    /// An existing destination counts as already mirrored. The first caller
    /// for a destination downloads; concurrent callers wait for and share
    /// its result, success or failure. A second URL mapping to a path that
    /// another URL already claimed is refused.
    pub async fn mirror(&self, asset: &AssetRef) -> Result<PathBuf> {
        let relative = asset.relative_path();

        let cell = {
            let mut slots = self.slots.lock().await;
            match slots.get(&relative) {
                Some(slot) if slot.url != asset.url => {
                    return Err(AppError::asset(
                        &asset.url,
                        format!(
                            "{} already mirrored from {}",
                            relative.display(),
                            slot.url
                        ),
                    ));
                }
                Some(slot) => Arc::clone(&slot.outcome),
                None => {
                    let cell = Arc::new(OnceCell::new());
                    slots.insert(
                        relative.clone(),
                        Slot {
                            url: asset.url.clone(),
                            outcome: Arc::clone(&cell),
                        },
                    );
                    cell
                }
            }
        };

        cell.get_or_init(|| self.download(asset, &relative))
            .await
            .clone()
            .map_err(|message| AppError::asset(&asset.url, message))
    }

    async fn download(&self, asset: &AssetRef, relative: &Path) -> SharedOutcome {
        let dest = self.root.join(relative);

        if !self.redownload && tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            log::debug!("Asset already mirrored: {}", dest.display());
            return Ok(relative.to_path_buf());
        }

        let bytes = fetch_with_retry(self.fetcher.as_ref(), &asset.url, FetchKind::Binary, self.retry)
            .await
            .map_err(|e| e.to_string())?
            .into_bytes();

        write_atomic(&dest, &bytes).await.map_err(|e| e.to_string())?;
        log::debug!("Mirrored {} -> {}", asset.url, dest.display());
        Ok(relative.to_path_buf())
    }
}
