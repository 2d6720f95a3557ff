// src/utils/log.rs

//! Run banners and summaries on top of the `log` facade.
//!
//! Item-level events go straight through `log::debug!`/`log::warn!`; this
//! module only formats the framing lines around a run.

use crate::models::RunSummary;

const RULE_WIDTH: usize = 60;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    log::info!("{border}");
    log::info!("  {title}");
    log::info!("{border}");
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("[STEP {step_num}/{total}] {message}");
}

/// Log a separator line
pub fn separator() {
    log::info!("{}", "─".repeat(RULE_WIDTH));
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {message}");
}

/// Log the outcome of a run, skip reasons included.
pub fn summary(summary: &RunSummary) {
    separator();
    log::info!("[SUMMARY] {} run", summary.mode);
    for (key, value) in summary_items(summary) {
        sub_item(&format!("{key}: {value}"));
    }
    for (item, reason) in &summary.skipped {
        sub_item(&format!("skipped {item}: {reason}"));
    }
}

fn summary_items(summary: &RunSummary) -> Vec<(&'static str, String)> {
    let elapsed = summary.finished_at - summary.started_at;
    vec![
        ("Attempted", summary.attempted.to_string()),
        ("Persisted", summary.persisted_count().to_string()),
        ("Skipped", summary.skipped_count().to_string()),
        (
            "Duration",
            format!("{:.1}s", elapsed.num_milliseconds() as f64 / 1000.0),
        ),
    ]
}
