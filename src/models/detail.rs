// src/models/detail.rs

//! Match detail records.

use serde::{Deserialize, Serialize};

use crate::models::ImageRef;

/// One match as described by its detail page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    /// Numeric ID from the detail link's `matchId` parameter
    pub match_id: u64,

    /// Listing the match was discovered from
    pub fixture_id: String,

    pub home_team: TeamSide,

    pub away_team: TeamSide,

    /// Normalized score or the `"- - -"` sentinel
    pub score: String,

    /// Raw time/place line as shown on the page
    pub schedule: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub hour: String,

    #[serde(default)]
    pub players: Vec<PlayerRef>,
}

/// One team's side of a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TeamSide {
    pub name: String,

    pub logo: ImageRef,

    /// Goal-scorer summary, empty when the page has none
    #[serde(default)]
    pub goals: String,
}

/// A player listed on a match page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRef {
    /// Jersey number as printed; empty when absent
    #[serde(default)]
    pub number: String,

    pub name: String,

    pub photo: ImageRef,
}
