//! Pipeline entry points for scraping runs.
//!
//! - `run_listings`: Fetch the listing of every fixture in the range
//! - `run_details`: Walk stored listings and scrape each linked match
//! - `run_classifications`: Scrape the league table
//! - `run_pipeline`: Listings, then details, sharing one listing cache

pub mod classifications;
pub mod context;
pub mod details;
pub mod listings;
pub mod pool;
pub mod retry;

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, RunMode, RunState, RunSummary};
use crate::services::{AssetMirror, Fetcher, HttpFetcher, Schemas};
use crate::storage::{LocalStorage, MatchStorage};
use crate::utils::log;

pub use context::{ListingCache, RunContext};
pub use retry::{RetryPolicy, fetch_with_retry};

/// Drives fetch, extraction, normalization, mirroring, and persistence.
///
/// Each `run_*` call is an independent run with its own context; nothing is
/// carried over between runs except what is on disk.
pub struct Orchestrator {
    config: Arc<Config>,
    schemas: Schemas,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn MatchStorage>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<dyn MatchStorage>,
    ) -> Result<Self> {
        let schemas = Schemas::compile(&config.selectors)?;
        Ok(Self {
            config: Arc::new(config),
            schemas,
            fetcher,
            storage,
        })
    }

    /// HTTP fetcher and local storage rooted at `paths.root`.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::from_config(&config.crawler)?);
        let storage = Arc::new(LocalStorage::new(config.paths.root.clone()));
        Self::new(config, fetcher, storage)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run_listings(&self) -> Result<RunSummary> {
        self.run(RunMode::Listings).await
    }

    pub async fn run_details(&self) -> Result<RunSummary> {
        self.run(RunMode::Details).await
    }

    pub async fn run_classifications(&self) -> Result<RunSummary> {
        self.run(RunMode::Classifications).await
    }

    pub async fn run_pipeline(&self) -> Result<RunSummary> {
        self.run(RunMode::Pipeline).await
    }

    async fn run(&self, mode: RunMode) -> Result<RunSummary> {
        let started_at = Utc::now();
        log::header(&format!("Starting {mode} run"));

        self.storage.prepare().await?;
        let ctx = self.context();
        let mut state = RunState::new();

        match mode {
            RunMode::Listings => self.listings_phase(&ctx, &mut state).await?,
            RunMode::Details => self.details_phase(&ctx, &mut state).await?,
            RunMode::Classifications => self.classifications_phase(&mut state).await?,
            RunMode::Pipeline => {
                log::step(1, 2, "Listings - fetching the fixture range");
                self.listings_phase(&ctx, &mut state).await?;
                log::step(2, 2, "Details - scraping match pages and images");
                self.details_phase(&ctx, &mut state).await?;
            }
        }

        let summary = state.finish(mode, started_at);
        log::summary(&summary);
        Ok(summary)
    }

    fn context(&self) -> RunContext {
        let mirror = AssetMirror::new(self.config.paths.root.clone(), Arc::clone(&self.fetcher))
            .with_redownload(self.config.crawler.redownload_assets)
            .with_retry(self.retry());
        RunContext::new(mirror)
    }

    fn retry(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.crawler)
    }

    fn concurrency(&self) -> usize {
        self.config.crawler.max_concurrent.max(1)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::error::AppError;
    use crate::models::{ListingEntry, MatchDetail};
    use crate::services::fetch::testing::ScriptedFetcher;

    const BASE: &str = "https://fpf.test";

    fn config(root: &Path, start: u64, end: u64, concurrency: usize) -> Config {
        let mut config = Config::default();
        config.source.base_url = BASE.to_string();
        config.source.listing_endpoint = "/fixtures?fixtureId=".to_string();
        config.source.fixture_start = start;
        config.source.fixture_end = end;
        config.source.classification_fixture_id = end;
        config.crawler.max_concurrent = concurrency;
        config.paths.root = root.to_path_buf();
        config
    }

    fn listing_url(fixture_id: u64) -> String {
        format!("{BASE}/fixtures?fixtureId={fixture_id}")
    }

    fn detail_url(match_id: u64) -> String {
        format!("{BASE}/Match/GetMatchInformation?matchId={match_id}")
    }

    /// Listing markup, one game block per `(home, away, score, match_id)`.
    fn listing_html(games: &[(&str, &str, &str, u64)]) -> String {
        games
            .iter()
            .map(|(home, away, score, id)| {
                format!(
                    r#"<div class="game">
                         <div class="home-team">{home}</div>
                         <span class="game-schedule">12 Mar 20:30</span>
                         <div class="game-list-stadium">Estádio</div>
                         <div class="score">{score}</div>
                         <div class="away-team">{away}</div>
                         <a class="game-link" href="/Match/GetMatchInformation?matchId={id}">ver</a>
                       </div>"#
                )
            })
            .collect()
    }

    fn detail_html(home_logo: &str, player_photo: &str) -> String {
        format!(
            r#"<html><body>
                 <div class="game-resume">
                   <div class="col-md-1"><img src="{home_logo}"></div>
                   <div class="col-md-3">FC Porto</div>
                   <div class="col-md-4"><strong>2 - 1</strong></div>
                   <div class="col-md-3 text-right">SC Braga</div>
                   <div class="col-md-1 text-right"><img src="/img/logos/scb.png"></div>
                 </div>
                 <div class="info-time-place">12 Mar 20:30 | Dragão</div>
                 <div class="info-goals"></div>
                 <div class="player">
                   <span class="player-number">99</span>
                   <span class="player-name">Diogo Costa</span>
                   <img src="{player_photo}">
                 </div>
               </body></html>"#
        )
    }

    const CLASSIFICATION_HTML: &str = "<div class=\"game classification\">\n1\nFC Porto\n10\n8\n1\n1\n20\n5\n25\n</div>\n<div class=\"game classification\">\n2\nSC Braga\nx\n</div>";

    fn orchestrator(config: Config, fetcher: Arc<ScriptedFetcher>) -> Orchestrator {
        let storage = Arc::new(LocalStorage::new(config.paths.root.clone()));
        Orchestrator::new(config, fetcher, storage).unwrap()
    }

    fn read_listing(root: &Path, fixture_id: u64) -> Vec<ListingEntry> {
        let path = root.join(format!("matches/{fixture_id}/{fixture_id}.json"));
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    fn read_detail(root: &Path, fixture_id: u64, match_id: u64) -> MatchDetail {
        let path = root.join(format!("matches/{fixture_id}/{match_id}.json"));
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    fn stored_entry(link: String) -> ListingEntry {
        ListingEntry {
            game_link: Some(link),
            home_team: "Porto".to_string(),
            away_team: "Braga".to_string(),
            stadium: String::new(),
            date: String::new(),
            hour: String::new(),
            score: "2 - 1".to_string(),
        }
    }

    fn store_listing(root: &Path, fixture_id: u64, entries: &[ListingEntry]) {
        let dir = root.join(format!("matches/{fixture_id}"));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(format!("{fixture_id}.json")),
            serde_json::to_vec(entries).unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_listing_entry_count_matches_page() {
        let tmp = TempDir::new().unwrap();
        let html = listing_html(&[("Porto", "Braga", "2 - 1", 1), ("Benfica", "Sporting", "0 - 0", 2)]);
        let fetcher = Arc::new(ScriptedFetcher::new().text(&listing_url(1), html));

        let summary = orchestrator(config(tmp.path(), 1, 1, 2), fetcher)
            .run_listings()
            .await
            .unwrap();

        assert_eq!(summary.persisted_count(), 1);
        let entries = read_listing(tmp.path(), 1);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].home_team, "Porto");
        assert_eq!(entries[0].game_link.as_deref(), Some(detail_url(1).as_str()));
    }

    #[tokio::test]
    async fn test_failed_fixture_is_skipped_and_others_persist() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .text(&listing_url(1), listing_html(&[("A", "B", "1 - 0", 10)]))
                .text(&listing_url(3), listing_html(&[("C", "D", "2 - 2", 30)])),
        );

        let summary = orchestrator(config(tmp.path(), 1, 3, 2), fetcher)
            .run_listings()
            .await
            .unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.persisted_count(), 2);
        assert!(summary.skipped.contains_key("fixture:2"));
        assert!(!tmp.path().join("matches/2").exists());
    }

    #[tokio::test]
    async fn test_concurrency_stays_bounded() {
        let tmp = TempDir::new().unwrap();
        let mut fetcher = ScriptedFetcher::new().latency(std::time::Duration::from_millis(10));
        for id in 1..=12 {
            fetcher = fetcher.text(&listing_url(id), listing_html(&[("A", "B", "1 - 0", id)]));
        }
        let fetcher = Arc::new(fetcher);

        let summary = orchestrator(config(tmp.path(), 1, 12, 3), fetcher.clone())
            .run_listings()
            .await
            .unwrap();

        assert_eq!(summary.persisted_count(), 12);
        assert!(fetcher.peak_in_flight() <= 3);
    }

    #[tokio::test]
    async fn test_details_missing_element_skips_only_that_match() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .text(
                    &listing_url(1),
                    listing_html(&[("Porto", "Braga", "2 - 1", 11), ("X", "Y", "1 - 1", 12)]),
                )
                .text(&detail_url(11), detail_html("/img/logos/fcp.png", "/photos/dc.jpg"))
                .text(&detail_url(12), "<html><body>Jogo adiado</body></html>")
                .binary(&format!("{BASE}/img/logos/fcp.png"), b"FCP")
                .binary(&format!("{BASE}/img/logos/scb.png"), b"SCB")
                .binary(&format!("{BASE}/photos/dc.jpg"), b"DC"),
        );

        let summary = orchestrator(config(tmp.path(), 1, 1, 2), fetcher)
            .run_pipeline()
            .await
            .unwrap();

        assert_eq!(summary.mode, RunMode::Pipeline);
        assert_eq!(summary.persisted_count(), 2);
        let reason = &summary.skipped[&format!("match:{}", detail_url(12))];
        assert!(reason.contains("game-resume"));

        let detail = read_detail(tmp.path(), 1, 11);
        assert_eq!(detail.match_id, 11);
        assert_eq!(detail.fixture_id, "1");
        assert_eq!(detail.home_team.name, "FC Porto");
        assert_eq!(detail.home_team.logo.path.as_deref(), Some("teams_logos/fcp.png"));
        assert_eq!(detail.players[0].photo.path.as_deref(), Some("players/dc.jpg"));
        assert_eq!(std::fs::read(tmp.path().join("teams_logos/scb.png")).unwrap(), b"SCB");
        assert!(!tmp.path().join("matches/1/12.json").exists());
    }

    #[tokio::test]
    async fn test_asset_failure_keeps_remote_url() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .text(&listing_url(1), listing_html(&[("Porto", "Braga", "2 - 1", 11)]))
                .text(&detail_url(11), detail_html("/img/logos/fcp.png", "/photos/dc.jpg"))
                .binary(&format!("{BASE}/img/logos/scb.png"), b"SCB"),
        );

        orchestrator(config(tmp.path(), 1, 1, 1), fetcher)
            .run_pipeline()
            .await
            .unwrap();

        let detail = read_detail(tmp.path(), 1, 11);
        assert_eq!(detail.home_team.logo.url, format!("{BASE}/img/logos/fcp.png"));
        assert_eq!(detail.home_team.logo.path, None);
        assert_eq!(detail.away_team.logo.path.as_deref(), Some("teams_logos/scb.png"));
    }

    #[tokio::test]
    async fn test_shared_logo_downloaded_once_per_run() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .text(
                    &listing_url(1),
                    listing_html(&[("Porto", "Braga", "2 - 1", 11), ("Porto", "Braga", "0 - 1", 12)]),
                )
                .text(&detail_url(11), detail_html("/img/logos/fcp.png", "/photos/a.jpg"))
                .text(&detail_url(12), detail_html("/img/logos/fcp.png", "/photos/b.jpg"))
                .binary(&format!("{BASE}/img/logos/fcp.png"), b"FCP")
                .binary(&format!("{BASE}/img/logos/scb.png"), b"SCB")
                .binary(&format!("{BASE}/photos/a.jpg"), b"A")
                .binary(&format!("{BASE}/photos/b.jpg"), b"B"),
        );

        orchestrator(config(tmp.path(), 1, 1, 4), fetcher.clone())
            .run_pipeline()
            .await
            .unwrap();

        assert_eq!(fetcher.calls(&format!("{BASE}/img/logos/fcp.png")), 1);
        assert_eq!(fetcher.calls(&format!("{BASE}/img/logos/scb.png")), 1);
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .text(&listing_url(1), listing_html(&[("Porto", "Braga", "2 - 1", 11)]))
                .text(&detail_url(11), detail_html("/img/logos/fcp.png", "/photos/dc.jpg"))
                .binary(&format!("{BASE}/img/logos/fcp.png"), b"FCP")
                .binary(&format!("{BASE}/img/logos/scb.png"), b"SCB")
                .binary(&format!("{BASE}/photos/dc.jpg"), b"DC"),
        );
        let orchestrator = orchestrator(config(tmp.path(), 1, 1, 2), fetcher.clone());

        orchestrator.run_pipeline().await.unwrap();
        let listing = std::fs::read(tmp.path().join("matches/1/1.json")).unwrap();
        let detail = std::fs::read(tmp.path().join("matches/1/11.json")).unwrap();

        orchestrator.run_pipeline().await.unwrap();
        assert_eq!(std::fs::read(tmp.path().join("matches/1/1.json")).unwrap(), listing);
        assert_eq!(std::fs::read(tmp.path().join("matches/1/11.json")).unwrap(), detail);
        // Assets already on disk are not fetched again
        assert_eq!(fetcher.calls(&format!("{BASE}/img/logos/fcp.png")), 1);
    }

    #[tokio::test]
    async fn test_details_skip_undecodable_listing() {
        let tmp = TempDir::new().unwrap();
        let matches = tmp.path().join("matches");
        std::fs::create_dir_all(matches.join("1")).unwrap();
        std::fs::create_dir_all(matches.join("2")).unwrap();
        std::fs::write(matches.join("1/1.json"), b"{ broken").unwrap();
        let entries = vec![ListingEntry {
            game_link: Some(detail_url(21)),
            home_team: "Porto".to_string(),
            away_team: "Braga".to_string(),
            stadium: String::new(),
            date: String::new(),
            hour: String::new(),
            score: "2 - 1".to_string(),
        }];
        std::fs::write(matches.join("2/2.json"), serde_json::to_vec(&entries).unwrap()).unwrap();

        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .text(&detail_url(21), detail_html("/img/logos/fcp.png", "/photos/dc.jpg")),
        );

        let summary = orchestrator(config(tmp.path(), 1, 2, 2), fetcher)
            .run_details()
            .await
            .unwrap();

        assert_eq!(summary.persisted_count(), 1);
        assert_eq!(summary.skipped_count(), 1);
        assert!(summary.skipped.keys().any(|k| k.starts_with("listing:")));
        assert_eq!(read_detail(tmp.path(), 2, 21).fixture_id, "2");
    }

    #[tokio::test]
    async fn test_link_without_match_id_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let matches = tmp.path().join("matches/5");
        std::fs::create_dir_all(&matches).unwrap();
        let entries = vec![ListingEntry {
            game_link: Some(format!("{BASE}/Match/GetMatchInformation?other=1")),
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            stadium: String::new(),
            date: String::new(),
            hour: String::new(),
            score: "1 - 0".to_string(),
        }];
        std::fs::write(matches.join("5.json"), serde_json::to_vec(&entries).unwrap()).unwrap();

        let fetcher = Arc::new(ScriptedFetcher::new());
        let summary = orchestrator(config(tmp.path(), 5, 5, 1), fetcher.clone())
            .run_details()
            .await
            .unwrap();

        assert_eq!(summary.skipped_count(), 1);
        assert!(summary.skipped.values().any(|r| r.contains("matchId")));
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_classifications_skip_bad_rows() {
        let tmp = TempDir::new().unwrap();
        let wrapped = serde_json::to_string(CLASSIFICATION_HTML).unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new().text(&listing_url(9), wrapped));

        let summary = orchestrator(config(tmp.path(), 1, 9, 1), fetcher)
            .run_classifications()
            .await
            .unwrap();

        assert_eq!(summary.persisted_count(), 1);
        let json: serde_json::Value = serde_json::from_slice(
            &std::fs::read(tmp.path().join("classifications/classification.json")).unwrap(),
        )
        .unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["team"], "FC Porto");
        assert_eq!(rows[0]["points"], 25);
    }

    #[tokio::test]
    async fn test_classification_fetch_failure_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new());

        let err = orchestrator(config(tmp.path(), 1, 9, 1), fetcher)
            .run_classifications()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Network { .. }));
    }

    #[tokio::test]
    async fn test_unwritable_root_fails_run() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("not-a-dir");
        std::fs::write(&root, b"x").unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new());

        let err = orchestrator(config(&root, 1, 1, 1), fetcher.clone())
            .run_listings()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FileSystem { .. }));
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_details_concurrency_counts_page_and_image_fetches() {
        let tmp = TempDir::new().unwrap();
        let entries: Vec<ListingEntry> =
            (41..=48).map(|id| stored_entry(detail_url(id))).collect();
        store_listing(tmp.path(), 4, &entries);

        let mut fetcher = ScriptedFetcher::new()
            .latency(std::time::Duration::from_millis(10))
            .binary(&format!("{BASE}/img/logos/scb.png"), b"SCB");
        for id in 41..=48 {
            let logo = format!("/img/logos/{id}.png");
            let photo = format!("/photos/{id}.jpg");
            fetcher = fetcher
                .text(&detail_url(id), detail_html(&logo, &photo))
                .binary(&format!("{BASE}{logo}"), b"LOGO")
                .binary(&format!("{BASE}{photo}"), b"PHOTO");
        }
        let fetcher = Arc::new(fetcher);

        let summary = orchestrator(config(tmp.path(), 4, 4, 2), fetcher.clone())
            .run_details()
            .await
            .unwrap();

        assert_eq!(summary.persisted_count(), 8);
        assert_eq!(fetcher.calls(&format!("{BASE}/photos/45.jpg")), 1);
        assert!(fetcher.peak_in_flight() <= 2);
    }

    #[tokio::test]
    async fn test_links_to_same_match_scrape_once() {
        let tmp = TempDir::new().unwrap();
        let first = format!("{BASE}/Match/GetMatchInformation?matchId=31&lang=pt");
        let second = format!("{BASE}/Match/GetMatchInformation?lang=pt&MATCHID=31");
        store_listing(
            tmp.path(),
            3,
            &[stored_entry(first.clone()), stored_entry(second.clone())],
        );

        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .text(&first, detail_html("/img/logos/fcp.png", "/photos/dc.jpg"))
                .text(&second, detail_html("/img/logos/fcp.png", "/photos/dc.jpg")),
        );

        let summary = orchestrator(config(tmp.path(), 3, 3, 2), fetcher.clone())
            .run_details()
            .await
            .unwrap();

        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.persisted_count(), 1);
        assert_eq!(fetcher.calls(&first), 1);
        assert_eq!(fetcher.calls(&second), 0);
        assert_eq!(read_detail(tmp.path(), 3, 31).match_id, 31);
    }

    #[tokio::test]
    async fn test_failed_classification_item_is_closed() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new());
        let orchestrator = orchestrator(config(tmp.path(), 1, 9, 1), fetcher);
        let mut state = RunState::new();

        let err = orchestrator
            .classifications_phase(&mut state)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Network { .. }));
        assert_eq!(state.pending(), 0);
        let summary = state.finish(RunMode::Classifications, Utc::now());
        assert!(summary.skipped["classification:9"].contains("Network error"));
    }
}
