// src/trigger.rs

//! Route-to-run dispatch for external triggers.
//!
//! A trigger names a run by path; the response carries an HTTP-style status
//! and a human-readable message. Serving the routes over a network is left
//! to whatever embeds this crate.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::models::RunSummary;
use crate::pipeline::Orchestrator;

/// A recognized trigger path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/resumes`: fixture listings over the configured range
    Resumes,
    /// `/classifications`: the league table
    Classifications,
    /// `/detailsmatches`: match details and images from stored listings
    DetailsMatches,
    /// `/pipeline`: listings followed by details
    Pipeline,
    NotFound(String),
}

impl Route {
    /// Parse a request path. Trailing slashes and query strings are ignored.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        match trimmed.trim_end_matches('/') {
            "/resumes" => Route::Resumes,
            "/classifications" => Route::Classifications,
            "/detailsmatches" => Route::DetailsMatches,
            "/pipeline" => Route::Pipeline,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Resumes => "/resumes",
            Route::Classifications => "/classifications",
            Route::DetailsMatches => "/detailsmatches",
            Route::Pipeline => "/pipeline",
            Route::NotFound(path) => path,
        }
    }

    fn completion(&self) -> &'static str {
        match self {
            Route::Resumes => "Match listings scrape completed",
            Route::Classifications => "Classification scrape completed",
            Route::DetailsMatches => "Match details scrape completed",
            Route::Pipeline => "Full scrape completed",
            Route::NotFound(_) => "",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Trigger response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerResponse {
    pub status: u16,
    pub message: String,
}

impl TriggerResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: 200,
            message: message.into(),
        }
    }

    pub fn error(message: impl fmt::Display) -> Self {
        Self {
            status: 500,
            message: format!("Error: {message}"),
        }
    }

    pub fn not_found(route: &Route) -> Self {
        Self {
            status: 404,
            message: format!("Invalid route: {route}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Start the run a route names and report how it went.
///
/// A run that finishes is a success even when some items were skipped;
/// only a run-level failure yields a 500.
pub async fn handle(route: &Route, orchestrator: &Orchestrator) -> TriggerResponse {
    let result: Result<RunSummary> = match route {
        Route::Resumes => orchestrator.run_listings().await,
        Route::Classifications => orchestrator.run_classifications().await,
        Route::DetailsMatches => orchestrator.run_details().await,
        Route::Pipeline => orchestrator.run_pipeline().await,
        Route::NotFound(_) => {
            log::warn!("Unknown trigger route: {route}");
            return TriggerResponse::not_found(route);
        }
    };

    match result {
        Ok(summary) => TriggerResponse::ok(format!(
            "{}: {} saved, {} skipped.",
            route.completion(),
            summary.persisted_count(),
            summary.skipped_count()
        )),
        Err(e) => {
            log::error!("{route} failed: {e}");
            TriggerResponse::error(e)
        }
    }
}
