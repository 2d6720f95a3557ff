// src/services/normalize.rs

//! Record normalizer.
//!
//! Pure, deterministic conversions from scraped text into the typed fields
//! of [`ListingEntry`] and [`MatchDetail`].

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ClassificationRow, ImageRef, ListingEntry, MatchDetail, PlayerRef, TeamSide};
use crate::services::extract::{RawDetail, RawListingRow};
use crate::utils::url::{absolutize, last_path_segment, query_param};

/// Score shown for matches that have not been played.
pub const NO_SCORE: &str = "- - -";

/// Longest file name produced by [`sanitize_filename`].
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Extension given to asset names that have none.
const DEFAULT_ASSET_EXT: &str = ".png";

static SCHEDULE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+\s+\w+)(?:\s+(\d{1,2}:\d{2}))?").ok());

/// Date and optional kick-off time split out of a schedule line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    /// `"<day> <month>"`, empty when the line does not start with one
    pub date: String,
    /// `"HH:MM"`, empty when absent
    pub hour: String,
}

/// Collapse runs of whitespace (including line breaks) into single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a free-text score into `"<home> - <away>"`.
///
/// The sentinel maps to itself; anything without two numeric tokens maps to
/// the sentinel as well.
///
/// # Examples
/// ```
/// use fixture_crawler::services::normalize::parse_score;
///
/// assert_eq!(parse_score("2   -   1"), "2 - 1");
/// assert_eq!(parse_score("- - -"), "- - -");
/// assert_eq!(parse_score("postponed"), "- - -");
/// ```
pub fn parse_score(raw: &str) -> String {
    let raw = raw.trim();
    if raw == NO_SCORE {
        return NO_SCORE.to_string();
    }

    let goals: Vec<&str> = raw
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .take(2)
        .collect();

    match goals.as_slice() {
        [home, away] => format!("{home} - {away}"),
        _ => NO_SCORE.to_string(),
    }
}

/// Split a schedule line into date and time. Never fails.
pub fn parse_schedule(raw: &str) -> Schedule {
    let text = clean_text(raw);
    let Some(caps) = SCHEDULE_RE.as_ref().and_then(|re| re.captures(&text)) else {
        return Schedule::default();
    };

    Schedule {
        date: caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        hour: caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
    }
}

/// Keep only `[A-Za-z0-9_.-]` and ASCII whitespace, capped at
/// [`MAX_FILE_NAME_LEN`] characters.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') || c.is_ascii_whitespace()
        })
        .take(MAX_FILE_NAME_LEN)
        .collect()
}

/// Destination file name for an asset URL.
///
/// Derived only from the URL's last path segment, so equal URLs always give
/// equal names. Returns `None` when nothing usable is left (empty, or only
/// dots).
pub fn asset_file_name(url: &str) -> Option<String> {
    let segment = last_path_segment(url)?;
    let name = sanitize_filename(&segment);
    let name = name.trim();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        return None;
    }

    let has_ext = name
        .rfind('.')
        .is_some_and(|idx| idx > 0 && idx < name.len() - 1);
    if has_ext {
        return Some(name.to_string());
    }

    let stem: String = name
        .chars()
        .take(MAX_FILE_NAME_LEN - DEFAULT_ASSET_EXT.len())
        .collect();
    Some(format!("{stem}{DEFAULT_ASSET_EXT}"))
}

/// The one rule for match IDs: the numeric `matchId` query parameter.
pub fn extract_match_id(link: &str) -> Option<u64> {
    query_param(link, "matchId")?.trim().parse().ok()
}

/// Turn a scraped listing row into a persisted entry.
///
/// The detail link survives only when it has the expected prefix and the
/// match already has a score.
pub fn normalize_listing_row(row: RawListingRow, base_url: &str, link_prefix: &str) -> ListingEntry {
    let raw_score = row
        .score
        .map(|s| clean_text(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_SCORE.to_string());
    let schedule = parse_schedule(&row.schedule);

    let game_link = row
        .link_href
        .map(|href| href.trim().to_string())
        .filter(|href| href.starts_with(link_prefix) && raw_score != NO_SCORE)
        .map(|href| absolutize(base_url, &href));

    ListingEntry {
        game_link,
        home_team: clean_text(&row.home_team),
        away_team: clean_text(&row.away_team),
        stadium: clean_text(&row.stadium),
        date: schedule.date,
        hour: schedule.hour,
        score: parse_score(&raw_score),
    }
}

/// Turn a scraped detail page into a record. Image paths are filled in
/// later by the asset mirror.
pub fn normalize_detail(
    raw: RawDetail,
    match_id: u64,
    fixture_id: &str,
    base_url: &str,
) -> MatchDetail {
    let schedule_text = clean_text(&raw.time_place);
    let schedule = parse_schedule(&schedule_text);

    let players = raw
        .players
        .into_iter()
        .map(|p| PlayerRef {
            number: clean_text(&p.number),
            name: clean_text(&p.name),
            photo: ImageRef::remote(
                p.photo_src
                    .map(|src| absolutize(base_url, &src))
                    .unwrap_or_default(),
            ),
        })
        .collect();

    MatchDetail {
        match_id,
        fixture_id: fixture_id.to_string(),
        home_team: TeamSide {
            name: clean_text(&raw.home_name),
            logo: ImageRef::remote(absolutize(base_url, &raw.home_logo_src)),
            goals: clean_text(&raw.home_goals),
        },
        away_team: TeamSide {
            name: clean_text(&raw.away_name),
            logo: ImageRef::remote(absolutize(base_url, &raw.away_logo_src)),
            goals: clean_text(&raw.away_goals),
        },
        score: parse_score(&raw.score),
        schedule: schedule_text,
        date: schedule.date,
        hour: schedule.hour,
        players,
    }
}

/// Map the text lines of a classification row onto its columns.
///
/// Returns `None` when fewer than nine lines are present or a numeric
/// column does not parse.
pub fn normalize_classification_row(lines: &[String]) -> Option<ClassificationRow> {
    let [position, team, matches, victories, defeats, draws, scored, suffered, points, ..] =
        lines
    else {
        return None;
    };
    let num = |s: &String| s.trim().parse::<u32>().ok();

    Some(ClassificationRow {
        position: num(position)?,
        team: clean_text(team),
        matches: num(matches)?,
        victories: num(victories)?,
        defeats: num(defeats)?,
        draws: num(draws)?,
        scored_goals: num(scored)?,
        goals_suffered: num(suffered)?,
        points: num(points)?,
    })
}
