// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod asset;
mod classification;
mod config;
mod detail;
mod listing;
mod run;
mod selectors;

// Re-export all public types
pub use asset::{AssetKind, AssetRef, ImageRef};
pub use classification::ClassificationRow;
pub use config::{Config, CrawlerConfig, PathsConfig, SourceConfig};
pub use detail::{MatchDetail, PlayerRef, TeamSide};
pub use listing::ListingEntry;
pub use run::{ItemOutcome, ItemState, RunMode, RunState, RunSummary};
pub use selectors::{
    ClassificationSelectors, DetailSelectors, ListingSelectors, SelectorsConfig,
};
