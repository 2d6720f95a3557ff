// src/pipeline/context.rs

//! State shared by the workers of a single run.
//!
//! A fresh [`RunContext`] is built at the start of every run and dropped at
//! its end, so nothing in here outlives the run that created it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{ItemOutcome, ItemState, ListingEntry, RunState};
use crate::services::AssetMirror;

/// Per-run resources handed to every worker.
pub struct RunContext {
    pub mirror: AssetMirror,
    pub listings: ListingCache,
}

impl RunContext {
    pub fn new(mirror: AssetMirror) -> Self {
        Self {
            mirror,
            listings: ListingCache::default(),
        }
    }
}

/// Listings fetched earlier in the same run, keyed by fixture ID.
#[derive(Default)]
pub struct ListingCache {
    entries: RwLock<HashMap<String, Arc<Vec<ListingEntry>>>>,
}

impl ListingCache {
    pub async fn get(&self, fixture_id: &str) -> Option<Arc<Vec<ListingEntry>>> {
        self.entries.read().await.get(fixture_id).cloned()
    }

    /// Store a listing and hand back the shared copy.
    pub async fn insert(
        &self,
        fixture_id: impl Into<String>,
        entries: Vec<ListingEntry>,
    ) -> Arc<Vec<ListingEntry>> {
        let entries = Arc::new(entries);
        self.entries
            .write()
            .await
            .insert(fixture_id.into(), Arc::clone(&entries));
        entries
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Log a non-terminal state change of one item.
pub(crate) fn trace(item: &str, state: ItemState) {
    log::debug!("{item}: {state}");
}

/// Fold one item's result into the run.
///
/// Every failure skips the item. A failure that is not item-local is also
/// kept in `fatal` so the run can report it once all items have drained.
pub(crate) fn settle<P: AsRef<Path>>(
    state: &mut RunState,
    item: &str,
    result: Result<P>,
    fatal: &mut Option<AppError>,
) {
    match result {
        Ok(path) => {
            log::debug!("{item}: saved to {}", path.as_ref().display());
            state.record(item, ItemOutcome::Persisted);
        }
        Err(e) => {
            state.record(item, ItemOutcome::skipped(&e));
            if !e.is_item_recoverable() && fatal.is_none() {
                *fatal = Some(e);
            }
        }
    }
}
