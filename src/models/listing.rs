// src/models/listing.rs

//! Fixture listing rows.

use serde::{Deserialize, Serialize};

/// One match row scraped from a fixture listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    /// Absolute detail page URL, present once the match has a score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_link: Option<String>,

    pub home_team: String,

    pub away_team: String,

    #[serde(default)]
    pub stadium: String,

    /// Day and month, e.g. `"12 Mar"`
    #[serde(default)]
    pub date: String,

    /// Kick-off time `HH:MM`, empty when not announced
    #[serde(default)]
    pub hour: String,

    /// Normalized score or the `"- - -"` sentinel
    pub score: String,
}

impl ListingEntry {
    /// Detail link, if one is present and non-empty.
    pub fn detail_link(&self) -> Option<&str> {
        self.game_link.as_deref().filter(|link| !link.trim().is_empty())
    }
}
