// src/models/run.rs

//! Per-run bookkeeping. Nothing here is persisted.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// Lifecycle of one work item.
///
/// `Persisted` and `Skipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Fetching,
    Extracted,
    Normalized,
    Persisted,
    Skipped,
}

impl ItemState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemState::Persisted | ItemState::Skipped)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemState::Pending => "pending",
            ItemState::Fetching => "fetching",
            ItemState::Extracted => "extracted",
            ItemState::Normalized => "normalized",
            ItemState::Persisted => "persisted",
            ItemState::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// Terminal result of one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Persisted,
    Skipped { reason: String },
}

impl ItemOutcome {
    pub fn skipped(reason: impl fmt::Display) -> Self {
        Self::Skipped {
            reason: reason.to_string(),
        }
    }

    pub fn state(&self) -> ItemState {
        match self {
            ItemOutcome::Persisted => ItemState::Persisted,
            ItemOutcome::Skipped { .. } => ItemState::Skipped,
        }
    }
}

/// Which entry mode produced a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Listings,
    Details,
    Classifications,
    Pipeline,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Listings => "listings",
            RunMode::Details => "details",
            RunMode::Classifications => "classifications",
            RunMode::Pipeline => "pipeline",
        };
        f.write_str(name)
    }
}

/// Items attempted, persisted, and skipped during one run.
#[derive(Debug, Default)]
pub struct RunState {
    attempted: Vec<String>,
    persisted: Vec<String>,
    skipped: BTreeMap<String, String>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an item as entering the pipeline.
    pub fn attempt(&mut self, item: impl Into<String>) {
        let item = item.into();
        log::trace!("{item}: {}", ItemState::Pending);
        self.attempted.push(item);
    }

    /// Record the terminal outcome of an attempted item.
    pub fn record(&mut self, item: impl Into<String>, outcome: ItemOutcome) {
        let item = item.into();
        match outcome {
            ItemOutcome::Persisted => {
                log::debug!("{item}: {}", ItemState::Persisted);
                self.persisted.push(item);
            }
            ItemOutcome::Skipped { reason } => {
                log::warn!("{item}: {} ({reason})", ItemState::Skipped);
                self.skipped.insert(item, reason);
            }
        }
    }

    /// Attempted items with no terminal outcome yet.
    pub fn pending(&self) -> usize {
        self.attempted
            .len()
            .saturating_sub(self.persisted.len() + self.skipped.len())
    }

    /// Close the run and produce its summary.
    pub fn finish(mut self, mode: RunMode, started_at: DateTime<Utc>) -> RunSummary {
        self.persisted.sort();
        RunSummary {
            mode,
            attempted: self.attempted.len(),
            persisted: self.persisted,
            skipped: self.skipped,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Outcome of a whole run, returned to the caller.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: RunMode,
    pub attempted: usize,
    pub persisted: Vec<String>,
    /// Item ID to skip reason
    pub skipped: BTreeMap<String, String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn persisted_count(&self) -> usize {
        self.persisted.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
