// src/pipeline/details.rs

//! Tree mode: walk the listing files, scrape every linked match page, and
//! mirror its images.

use std::collections::HashSet;
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;

use crate::error::{AppError, Result};
use crate::models::{
    AssetKind, AssetRef, ImageRef, ItemOutcome, ItemState, ListingEntry, MatchDetail, RunState,
};
use crate::pipeline::context::{RunContext, settle, trace};
use crate::pipeline::{Orchestrator, fetch_with_retry, pool};
use crate::services::FetchKind;
use crate::services::extract::extract_detail;
use crate::services::normalize::{extract_match_id, normalize_detail};
use crate::storage::ListingFile;

/// One detail page to scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailJob {
    fixture_id: String,
    link: String,
    match_id: Option<u64>,
}

impl DetailJob {
    fn new(fixture_id: &str, link: &str) -> Self {
        Self {
            fixture_id: fixture_id.to_string(),
            link: link.to_string(),
            match_id: extract_match_id(link),
        }
    }

    fn item(&self) -> String {
        format!("match:{}", self.link)
    }

    /// Jobs writing the same record share a key. Links without a match ID
    /// are keyed by the link itself.
    fn key(&self) -> (String, String) {
        let record = self
            .match_id
            .map_or_else(|| self.link.clone(), |id| id.to_string());
        (self.fixture_id.clone(), record)
    }
}

impl Orchestrator {
    pub(crate) async fn details_phase(&self, ctx: &RunContext, state: &mut RunState) -> Result<()> {
        let mut jobs = Vec::new();
        let mut seen = HashSet::new();

        let mut files = self.storage.listing_tree().files();
        while let Some(file) = files.next().await {
            let Some(entries) = self.listing_entries(ctx, &file, state).await else {
                continue;
            };
            for link in entries.iter().filter_map(|entry| entry.detail_link()) {
                let job = DetailJob::new(&file.fixture_id, link);
                if seen.insert(job.key()) {
                    jobs.push(job);
                } else {
                    log::debug!("Duplicate match link ignored: {link}");
                }
            }
        }

        log::info!(
            "Scraping {} match pages ({} at a time)",
            jobs.len(),
            self.concurrency()
        );
        for job in &jobs {
            state.attempt(job.item());
        }

        let mut results = pin!(pool::bounded(jobs, self.concurrency(), |job| async move {
            let result = self.scrape_detail(ctx, &job).await;
            (job, result)
        }));

        let mut fatal = None;
        while let Some((job, result)) = results.next().await {
            settle(state, &job.item(), result, &mut fatal);
        }

        fatal.map_or(Ok(()), Err)
    }

    /// Listing entries for one file: from this run's cache when the range
    /// phase already fetched them, otherwise decoded from disk. A file that
    /// cannot be read is skipped on its own.
    async fn listing_entries(
        &self,
        ctx: &RunContext,
        file: &ListingFile,
        state: &mut RunState,
    ) -> Option<Arc<Vec<ListingEntry>>> {
        if let Some(cached) = ctx.listings.get(&file.fixture_id).await {
            return Some(cached);
        }

        match self.storage.load_listing(&file.path).await {
            Ok(entries) => Some(Arc::new(entries)),
            Err(e) => {
                let item = format!("listing:{}", file.path.display());
                state.attempt(item.clone());
                state.record(item, ItemOutcome::skipped(&e));
                None
            }
        }
    }

    /// Fetch, extract, normalize, mirror, and persist one match.
    async fn scrape_detail(&self, ctx: &RunContext, job: &DetailJob) -> Result<PathBuf> {
        let item = job.item();
        let match_id = job
            .match_id
            .ok_or_else(|| AppError::missing("matchId", &job.link))?;

        trace(&item, ItemState::Fetching);
        let html = fetch_with_retry(self.fetcher.as_ref(), &job.link, FetchKind::Html, self.retry())
            .await?
            .into_text();

        let raw = extract_detail(&html, &self.schemas.detail, &job.link)?;
        trace(&item, ItemState::Extracted);

        let mut detail = normalize_detail(raw, match_id, &job.fixture_id, &self.config.source.base_url);
        trace(&item, ItemState::Normalized);

        mirror_images(ctx, &mut detail).await;
        self.storage.save_detail(&detail).await
    }
}

/// Mirror every image of a record, one after another. A failed image keeps
/// its remote URL and never fails the record.
async fn mirror_images(ctx: &RunContext, detail: &mut MatchDetail) {
    mirror_image(ctx, &mut detail.home_team.logo, AssetKind::TeamLogo).await;
    mirror_image(ctx, &mut detail.away_team.logo, AssetKind::TeamLogo).await;
    for player in &mut detail.players {
        mirror_image(ctx, &mut player.photo, AssetKind::PlayerPhoto).await;
    }
}

async fn mirror_image(ctx: &RunContext, image: &mut ImageRef, kind: AssetKind) {
    if image.url.is_empty() {
        return;
    }

    let mirrored = match AssetRef::new(&image.url, kind) {
        Ok(asset) => ctx.mirror.mirror(&asset).await.map(|_| asset.record_path()),
        Err(e) => Err(e),
    };

    match mirrored {
        Ok(path) => image.path = Some(path),
        Err(e) => log::warn!("Keeping remote image, mirror failed: {e}"),
    }
}
