// src/pipeline/classifications.rs

//! League table scrape from a single fixture page.

use crate::error::Result;
use crate::models::{ClassificationRow, ItemOutcome, ItemState, RunState};
use crate::pipeline::context::trace;
use crate::pipeline::{Orchestrator, fetch_with_retry};
use crate::services::FetchKind;
use crate::services::extract::{extract_classification, listing_markup};
use crate::services::normalize::normalize_classification_row;

impl Orchestrator {
    /// Fetch and persist the classification table.
    ///
    /// Unlike listings and details, a failed fetch or write ends the run.
    /// Rows that do not parse are dropped with a warning.
    pub(crate) async fn classifications_phase(&self, state: &mut RunState) -> Result<()> {
        let fixture_id = self.config.source.classification_fixture_id;
        let item = format!("classification:{fixture_id}");
        let url = self.config.source.listing_url(fixture_id);
        state.attempt(item.clone());

        trace(&item, ItemState::Fetching);
        let fetched =
            fetch_with_retry(self.fetcher.as_ref(), &url, FetchKind::Json, self.retry()).await;
        let body = match fetched {
            Ok(payload) => payload.into_text(),
            Err(e) => {
                state.record(item, ItemOutcome::skipped(&e));
                return Err(e);
            }
        };

        let lines = extract_classification(&listing_markup(&body), &self.schemas.classification);
        trace(&item, ItemState::Extracted);

        let rows: Vec<ClassificationRow> = lines
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| {
                let parsed = normalize_classification_row(row);
                if parsed.is_none() {
                    log::warn!("Classification row #{idx} does not parse: {row:?}");
                }
                parsed
            })
            .collect();
        trace(&item, ItemState::Normalized);
        log::info!("Parsed {} of {} classification rows", rows.len(), lines.len());

        match self.storage.save_classifications(&rows).await {
            Ok(path) => {
                log::debug!("{item}: saved to {}", path.display());
                state.record(item, ItemOutcome::Persisted);
                Ok(())
            }
            Err(e) => {
                state.record(item, ItemOutcome::skipped(&e));
                Err(e)
            }
        }
    }
}
