// src/services/extract.rs

//! Content extractor.
//!
//! Runs the configured CSS selectors against fetched markup. Extraction is
//! synchronous and returns owned data, so no parsed document is held across
//! an await point.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ClassificationSelectors, DetailSelectors, ListingSelectors, SelectorsConfig};

/// A compiled selector that remembers where it came from.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    css: String,
    selector: Selector,
}

impl Field {
    fn compile(name: &'static str, css: &str) -> Result<Self> {
        let selector =
            Selector::parse(css).map_err(|e| AppError::selector(css, format!("{e:?}")))?;
        Ok(Self {
            name,
            css: css.to_string(),
            selector,
        })
    }

    /// Label used in missing-field errors.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.css)
    }

    fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.select(&self.selector).next()
    }

    fn all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        scope.select(&self.selector).collect()
    }

    fn require<'a>(&self, scope: ElementRef<'a>, url: &str) -> Result<ElementRef<'a>> {
        self.first(scope)
            .ok_or_else(|| AppError::missing(self.label(), url))
    }

    /// Text of the first match, or empty when absent.
    fn text_or_empty(&self, scope: ElementRef<'_>) -> String {
        self.first(scope).map(element_text).unwrap_or_default()
    }
}

/// All selector schemas, compiled once per run.
#[derive(Debug, Clone)]
pub struct Schemas {
    pub listing: ListingSchema,
    pub detail: DetailSchema,
    pub classification: ClassificationSchema,
}

impl Schemas {
    /// Compile every configured selector, failing on the first invalid one.
    pub fn compile(config: &SelectorsConfig) -> Result<Self> {
        Ok(Self {
            listing: ListingSchema::compile(&config.listing)?,
            detail: DetailSchema::compile(&config.detail)?,
            classification: ClassificationSchema::compile(&config.classification)?,
        })
    }
}

/// Column selectors of a listing page.
#[derive(Debug, Clone)]
pub struct ListingSchema {
    home_team: Field,
    away_team: Field,
    schedule: Field,
    stadium: Field,
    score: Field,
    game_link: Field,
}

impl ListingSchema {
    pub fn compile(s: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            home_team: Field::compile("home team", &s.home_team)?,
            away_team: Field::compile("away team", &s.away_team)?,
            schedule: Field::compile("schedule", &s.schedule)?,
            stadium: Field::compile("stadium", &s.stadium)?,
            score: Field::compile("score", &s.score)?,
            game_link: Field::compile("game link", &s.game_link)?,
        })
    }
}

/// Selectors of a match detail page.
#[derive(Debug, Clone)]
pub struct DetailSchema {
    game_resume: Field,
    info_time_place: Field,
    info_goals: Field,
    home_logo: Field,
    home_name: Field,
    score: Field,
    away_name: Field,
    away_logo: Field,
    home_goals: Field,
    away_goals: Field,
    player_block: Field,
    player_number: Field,
    player_name: Field,
    player_photo: Field,
}

impl DetailSchema {
    pub fn compile(s: &DetailSelectors) -> Result<Self> {
        Ok(Self {
            game_resume: Field::compile("game resume", &s.game_resume)?,
            info_time_place: Field::compile("time and place", &s.info_time_place)?,
            info_goals: Field::compile("goals info", &s.info_goals)?,
            home_logo: Field::compile("home logo", &s.home_logo)?,
            home_name: Field::compile("home name", &s.home_name)?,
            score: Field::compile("score", &s.score)?,
            away_name: Field::compile("away name", &s.away_name)?,
            away_logo: Field::compile("away logo", &s.away_logo)?,
            home_goals: Field::compile("home goals", &s.home_goals)?,
            away_goals: Field::compile("away goals", &s.away_goals)?,
            player_block: Field::compile("player block", &s.player_block)?,
            player_number: Field::compile("player number", &s.player_number)?,
            player_name: Field::compile("player name", &s.player_name)?,
            player_photo: Field::compile("player photo", &s.player_photo)?,
        })
    }
}

/// Row selector of the classification table.
#[derive(Debug, Clone)]
pub struct ClassificationSchema {
    row: Field,
}

impl ClassificationSchema {
    pub fn compile(s: &ClassificationSelectors) -> Result<Self> {
        Ok(Self {
            row: Field::compile("classification row", &s.row)?,
        })
    }
}

/// Unnormalized listing row, aligned by index to the home-team elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListingRow {
    pub home_team: String,
    pub away_team: String,
    pub schedule: String,
    pub stadium: String,
    pub score: Option<String>,
    pub link_href: Option<String>,
}

/// Unnormalized detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDetail {
    pub home_name: String,
    pub away_name: String,
    pub home_logo_src: String,
    pub away_logo_src: String,
    pub score: String,
    pub time_place: String,
    pub home_goals: String,
    pub away_goals: String,
    pub players: Vec<RawPlayer>,
}

/// Unnormalized player block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPlayer {
    pub number: String,
    pub name: String,
    pub photo_src: Option<String>,
}

/// Concatenated text of an element.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn text_at(elements: &[ElementRef<'_>], idx: usize) -> Option<String> {
    elements.get(idx).copied().map(element_text)
}

/// Listing bodies come back either as raw HTML or as a JSON string holding
/// the HTML. Returns the markup in both cases.
pub fn listing_markup(body: &str) -> String {
    if body.trim_start().starts_with('"') {
        if let Ok(inner) = serde_json::from_str::<String>(body) {
            return inner;
        }
    }
    body.to_string()
}

/// Extract one row per home-team element. Sibling columns that are missing
/// for a row come back empty.
pub fn extract_listing(html: &str, schema: &ListingSchema) -> Vec<RawListingRow> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let home = schema.home_team.all(root);
    let away = schema.away_team.all(root);
    let schedules = schema.schedule.all(root);
    let stadiums = schema.stadium.all(root);
    let scores = schema.score.all(root);
    let links = schema.game_link.all(root);

    home.iter()
        .enumerate()
        .map(|(idx, home_el)| RawListingRow {
            home_team: element_text(*home_el),
            away_team: text_at(&away, idx).unwrap_or_default(),
            schedule: text_at(&schedules, idx).unwrap_or_default(),
            stadium: text_at(&stadiums, idx).unwrap_or_default(),
            score: text_at(&scores, idx),
            link_href: links
                .get(idx)
                .and_then(|el| el.value().attr("href"))
                .map(str::to_string),
        })
        .collect()
}

/// Extract a detail page, failing on the first missing required element.
///
/// Goal info is optional. Player blocks are extracted independently; a
/// block without a name is dropped and its siblings are kept.
pub fn extract_detail(html: &str, schema: &DetailSchema, source_url: &str) -> Result<RawDetail> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let resume = schema.game_resume.require(root, source_url)?;
    let time_place = schema.info_time_place.require(root, source_url)?;
    let goals = schema.info_goals.require(root, source_url)?;

    let home_logo_src = required_attr(&schema.home_logo, resume, "src", source_url)?;
    let home_name = schema.home_name.require(resume, source_url)?;
    let score = schema.score.require(resume, source_url)?;
    let away_name = schema.away_name.require(resume, source_url)?;
    let away_logo_src = required_attr(&schema.away_logo, resume, "src", source_url)?;

    let players = schema
        .player_block
        .all(root)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, block)| extract_player(block, schema, idx, source_url))
        .collect();

    Ok(RawDetail {
        home_name: element_text(home_name).trim().to_string(),
        away_name: element_text(away_name).trim().to_string(),
        home_logo_src,
        away_logo_src,
        score: element_text(score).trim().to_string(),
        time_place: element_text(time_place).trim().to_string(),
        home_goals: schema.home_goals.text_or_empty(goals),
        away_goals: schema.away_goals.text_or_empty(goals),
        players,
    })
}

fn required_attr(field: &Field, scope: ElementRef<'_>, attr: &str, url: &str) -> Result<String> {
    field
        .require(scope, url)?
        .value()
        .attr(attr)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::missing(format!("{}[{attr}]", field.label()), url))
}

fn extract_player(
    block: ElementRef<'_>,
    schema: &DetailSchema,
    idx: usize,
    source_url: &str,
) -> Option<RawPlayer> {
    let name = schema.player_name.text_or_empty(block).trim().to_string();
    if name.is_empty() {
        log::debug!("Player block #{idx} in {source_url} has no name, dropping it");
        return None;
    }

    Some(RawPlayer {
        number: schema.player_number.text_or_empty(block).trim().to_string(),
        name,
        photo_src: schema
            .player_photo
            .first(block)
            .and_then(|img| img.value().attr("src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty()),
    })
}

/// Non-empty, trimmed text lines of every classification row.
pub fn extract_classification(html: &str, schema: &ClassificationSchema) -> Vec<Vec<String>> {
    let document = Html::parse_document(html);
    schema
        .row
        .all(document.root_element())
        .into_iter()
        .map(|row| {
            element_text(row)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemas() -> Schemas {
        Schemas::compile(&SelectorsConfig::default()).unwrap()
    }

    const LISTING: &str = r#"
        <div class="game">
          <div class="home-team">Porto</div>
          <span class="game-schedule">12 Mar
            20:30</span>
          <div class="game-list-stadium">Dragão</div>
          <div class="score">2 - 1</div>
          <div class="away-team">Braga</div>
          <a class="game-link" href="/Match/GetMatchInformation?matchId=1">ver</a>
        </div>
        <div class="game">
          <div class="home-team">Benfica</div>
          <span class="game-schedule">13 Mar</span>
          <div class="game-list-stadium">Luz</div>
          <div class="away-team">Sporting</div>
        </div>
    "#;

    const DETAIL: &str = r#"
        <html><body>
          <div class="game-resume">
            <div class="col-md-1"><img src="/img/logos/fcp.png"></div>
            <div class="col-md-3">FC Porto</div>
            <div class="col-md-4"><strong>2 - 1</strong></div>
            <div class="col-md-3 text-right">SC Braga</div>
            <div class="col-md-1 text-right"><img src="/img/logos/scb.png"></div>
          </div>
          <div class="info-time-place">12 Mar 20:30 | Estádio do Dragão</div>
          <div class="info-goals">
            <div class="col-md-3 text-left">Taremi 12'</div>
          </div>
          <div class="player">
            <span class="player-number">99</span>
            <span class="player-name">Diogo Costa</span>
            <img src="/photos/dc.jpg">
          </div>
          <div class="player">
            <span class="player-number">7</span>
          </div>
          <div class="player">
            <span class="player-name">Pepe</span>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_listing_row_count_matches_home_teams() {
        let rows = extract_listing(LISTING, &schemas().listing);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].home_team, "Porto");
        assert_eq!(rows[0].score.as_deref(), Some("2 - 1"));
        assert_eq!(
            rows[0].link_href.as_deref(),
            Some("/Match/GetMatchInformation?matchId=1")
        );
        assert_eq!(rows[1].away_team, "Sporting");
        assert_eq!(rows[1].score, None);
        assert_eq!(rows[1].link_href, None);
    }

    #[test]
    fn test_listing_without_matches_is_empty() {
        let rows = extract_listing("<html><body>Sem jogos</body></html>", &schemas().listing);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_listing_markup_unwraps_json_string() {
        let wrapped = serde_json::to_string(LISTING).unwrap();
        assert_eq!(listing_markup(&wrapped), LISTING);
        assert_eq!(listing_markup(LISTING), LISTING);
    }

    #[test]
    fn test_detail_extraction() {
        let raw = extract_detail(DETAIL, &schemas().detail, "https://x.pt/m?matchId=1").unwrap();
        assert_eq!(raw.home_name, "FC Porto");
        assert_eq!(raw.away_name, "SC Braga");
        assert_eq!(raw.home_logo_src, "/img/logos/fcp.png");
        assert_eq!(raw.away_logo_src, "/img/logos/scb.png");
        assert_eq!(raw.score, "2 - 1");
        assert_eq!(raw.home_goals, "Taremi 12'");
        assert_eq!(raw.away_goals, "");
    }

    #[test]
    fn test_player_without_name_does_not_abort_siblings() {
        let raw = extract_detail(DETAIL, &schemas().detail, "https://x.pt/m?matchId=1").unwrap();
        let names: Vec<_> = raw.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Diogo Costa", "Pepe"]);
        assert_eq!(raw.players[0].photo_src.as_deref(), Some("/photos/dc.jpg"));
        assert_eq!(raw.players[1].photo_src, None);
    }

    #[test]
    fn test_missing_required_block() {
        let html = DETAIL.replace("info-goals", "info-other");
        let err = extract_detail(&html, &schemas().detail, "https://x.pt/m?matchId=1").unwrap_err();
        match err {
            AppError::MissingField { field, url } => {
                assert!(field.contains(".info-goals"));
                assert_eq!(url, "https://x.pt/m?matchId=1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_logo_src() {
        let html = DETAIL.replace(r#"<img src="/img/logos/scb.png">"#, "<img>");
        let err = extract_detail(&html, &schemas().detail, "u").unwrap_err();
        assert!(matches!(err, AppError::MissingField { .. }));
    }

    #[test]
    fn test_classification_lines() {
        let html = r#"
            <div class="game classification">
              1
              FC Porto
              10
              8
              1
              1
              25
              6
              25
            </div>
        "#;
        let rows = extract_classification(html, &schemas().classification);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 9);
        assert_eq!(rows[0][1], "FC Porto");
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = SelectorsConfig::default();
        config.listing.home_team = "div[".to_string();
        assert!(matches!(
            Schemas::compile(&config),
            Err(AppError::Selector { .. })
        ));
    }
}
