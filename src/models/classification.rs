// src/models/classification.rs

//! League classification table.

use serde::{Deserialize, Serialize};

/// One row of the classification table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRow {
    pub position: u32,
    pub team: String,
    pub matches: u32,
    pub victories: u32,
    pub defeats: u32,
    pub draws: u32,
    pub scored_goals: u32,
    pub goals_suffered: u32,
    pub points: u32,
}
