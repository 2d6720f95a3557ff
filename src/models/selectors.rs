// src/models/selectors.rs

//! CSS selectors for scraping fixture pages.
//!
//! Defaults follow the markup of the source site. Every selector can be
//! overridden from `config.toml` without touching code.

use serde::{Deserialize, Serialize};

/// Selector groups for each page kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorsConfig {
    #[serde(default)]
    pub listing: ListingSelectors,

    #[serde(default)]
    pub detail: DetailSelectors,

    #[serde(default)]
    pub classification: ClassificationSelectors,
}

/// Selectors for a fixture listing page. Columns are aligned by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// One element per match; defines the row count
    #[serde(default = "defaults::home_team")]
    pub home_team: String,

    #[serde(default = "defaults::away_team")]
    pub away_team: String,

    #[serde(default = "defaults::schedule")]
    pub schedule: String,

    #[serde(default = "defaults::stadium")]
    pub stadium: String,

    #[serde(default = "defaults::score")]
    pub score: String,

    /// Anchor whose `href` points to the match detail page
    #[serde(default = "defaults::game_link")]
    pub game_link: String,

    /// Only hrefs with this prefix count as detail links
    #[serde(default = "defaults::detail_link_prefix")]
    pub detail_link_prefix: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            home_team: defaults::home_team(),
            away_team: defaults::away_team(),
            schedule: defaults::schedule(),
            stadium: defaults::stadium(),
            score: defaults::score(),
            game_link: defaults::game_link(),
            detail_link_prefix: defaults::detail_link_prefix(),
        }
    }
}

/// Selectors for a match detail page.
///
/// The first three are page-level blocks; the team and score selectors are
/// evaluated inside `game_resume`, goal info inside `info_goals`, and player
/// fields inside each `player_block`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailSelectors {
    #[serde(default = "defaults::game_resume")]
    pub game_resume: String,

    #[serde(default = "defaults::info_time_place")]
    pub info_time_place: String,

    #[serde(default = "defaults::info_goals")]
    pub info_goals: String,

    #[serde(default = "defaults::home_logo")]
    pub home_logo: String,

    #[serde(default = "defaults::home_name")]
    pub home_name: String,

    #[serde(default = "defaults::detail_score")]
    pub score: String,

    #[serde(default = "defaults::away_name")]
    pub away_name: String,

    #[serde(default = "defaults::away_logo")]
    pub away_logo: String,

    #[serde(default = "defaults::home_goals")]
    pub home_goals: String,

    #[serde(default = "defaults::away_goals")]
    pub away_goals: String,

    #[serde(default = "defaults::player_block")]
    pub player_block: String,

    #[serde(default = "defaults::player_number")]
    pub player_number: String,

    #[serde(default = "defaults::player_name")]
    pub player_name: String,

    #[serde(default = "defaults::player_photo")]
    pub player_photo: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            game_resume: defaults::game_resume(),
            info_time_place: defaults::info_time_place(),
            info_goals: defaults::info_goals(),
            home_logo: defaults::home_logo(),
            home_name: defaults::home_name(),
            score: defaults::detail_score(),
            away_name: defaults::away_name(),
            away_logo: defaults::away_logo(),
            home_goals: defaults::home_goals(),
            away_goals: defaults::away_goals(),
            player_block: defaults::player_block(),
            player_number: defaults::player_number(),
            player_name: defaults::player_name(),
            player_photo: defaults::player_photo(),
        }
    }
}

/// Selectors for the league classification table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationSelectors {
    /// One element per table row
    #[serde(default = "defaults::classification_row")]
    pub row: String,
}

impl Default for ClassificationSelectors {
    fn default() -> Self {
        Self {
            row: defaults::classification_row(),
        }
    }
}

mod defaults {
    // Listing page
    pub fn home_team() -> String {
        "div.home-team".into()
    }
    pub fn away_team() -> String {
        "div.away-team".into()
    }
    pub fn schedule() -> String {
        "span.game-schedule".into()
    }
    pub fn stadium() -> String {
        "div.game-list-stadium".into()
    }
    pub fn score() -> String {
        "div.score".into()
    }
    pub fn game_link() -> String {
        "a.game-link".into()
    }
    pub fn detail_link_prefix() -> String {
        "/Match/GetMatchInformation".into()
    }

    // Detail page
    pub fn game_resume() -> String {
        ".game-resume".into()
    }
    pub fn info_time_place() -> String {
        ".info-time-place".into()
    }
    pub fn info_goals() -> String {
        ".info-goals".into()
    }
    pub fn home_logo() -> String {
        ".col-md-1:not(.text-right) img".into()
    }
    pub fn home_name() -> String {
        ".col-md-3:not(.text-right)".into()
    }
    pub fn detail_score() -> String {
        ".col-md-4 strong".into()
    }
    pub fn away_name() -> String {
        ".col-md-3.text-right".into()
    }
    pub fn away_logo() -> String {
        ".col-md-1.text-right img".into()
    }
    pub fn home_goals() -> String {
        ".col-md-3.text-left".into()
    }
    pub fn away_goals() -> String {
        ".col-md-3.text-right".into()
    }
    pub fn player_block() -> String {
        ".player".into()
    }
    pub fn player_number() -> String {
        ".player-number".into()
    }
    pub fn player_name() -> String {
        ".player-name".into()
    }
    pub fn player_photo() -> String {
        "img".into()
    }

    // Classification table
    pub fn classification_row() -> String {
        ".game.classification".into()
    }
}
