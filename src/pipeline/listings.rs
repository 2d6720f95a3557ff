// src/pipeline/listings.rs

//! Range mode: fetch the listing of every fixture ID in the configured range.

use std::path::PathBuf;
use std::pin::pin;

use futures::StreamExt;

use crate::error::Result;
use crate::models::{ItemState, ListingEntry, RunState};
use crate::pipeline::context::{RunContext, settle, trace};
use crate::pipeline::{Orchestrator, fetch_with_retry, pool};
use crate::services::FetchKind;
use crate::services::extract::{extract_listing, listing_markup};
use crate::services::normalize::normalize_listing_row;

fn listing_item(fixture_id: u64) -> String {
    format!("fixture:{fixture_id}")
}

impl Orchestrator {
    pub(crate) async fn listings_phase(&self, ctx: &RunContext, state: &mut RunState) -> Result<()> {
        let ids: Vec<u64> = self.config.source.fixture_ids().collect();
        log::info!(
            "Fetching {} fixture listings ({} at a time)",
            ids.len(),
            self.concurrency()
        );

        for id in &ids {
            state.attempt(listing_item(*id));
        }

        let mut results = pin!(pool::bounded(ids, self.concurrency(), |id| async move {
            (id, self.scrape_listing(ctx, id).await)
        }));

        let mut fatal = None;
        while let Some((id, result)) = results.next().await {
            settle(state, &listing_item(id), result, &mut fatal);
        }

        fatal.map_or(Ok(()), Err)
    }

    /// Fetch, extract, normalize, and persist one fixture listing.
    async fn scrape_listing(&self, ctx: &RunContext, fixture_id: u64) -> Result<PathBuf> {
        let item = listing_item(fixture_id);
        let url = self.config.source.listing_url(fixture_id);

        trace(&item, ItemState::Fetching);
        let body = fetch_with_retry(self.fetcher.as_ref(), &url, FetchKind::Json, self.retry())
            .await?
            .into_text();

        let rows = extract_listing(&listing_markup(&body), &self.schemas.listing);
        trace(&item, ItemState::Extracted);

        let base_url = &self.config.source.base_url;
        let link_prefix = &self.config.selectors.listing.detail_link_prefix;
        let entries: Vec<ListingEntry> = rows
            .into_iter()
            .map(|row| normalize_listing_row(row, base_url, link_prefix))
            .collect();
        trace(&item, ItemState::Normalized);
        log::debug!("{item}: {} matches", entries.len());

        let key = fixture_id.to_string();
        let entries = ctx.listings.insert(key.clone(), entries).await;
        self.storage.save_listing(&key, &entries).await
    }
}
