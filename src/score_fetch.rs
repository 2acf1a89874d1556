use std::fmt;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use log::{debug, info};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;

use crate::http_client::http_client;

pub const ESPN_SCOREBOARD_URL: &str = "https://site.api.espn.com/apis/personalized/v2/scoreboard/header?configuration=SITE_DEFAULT&playabilitySource=playbackId&lang=en&region=us&contentorigin=espn&tz=America%2FNew_York&platform=web";

const TEAM_PLACEHOLDER: &str = "TBD";
const DEFAULT_SCORE: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum League {
    Mlb,
    Nba,
    Nfl,
    Nhl,
    Pga,
}

impl League {
    pub fn from_abbreviation(label: &str) -> Option<Self> {
        match label {
            "MLB" => Some(League::Mlb),
            "NBA" => Some(League::Nba),
            "NFL" => Some(League::Nfl),
            "NHL" => Some(League::Nhl),
            "PGA" => Some(League::Pga),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            League::Mlb => "MLB",
            League::Nba => "NBA",
            League::Nfl => "NFL",
            League::Nhl => "NHL",
            League::Pga => "PGA",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Scheduled,
    Live,
    Final,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Scheduled => "Scheduled",
            GameStatus::Live => "Live",
            GameStatus::Final => "Final",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub league: League,
    pub team_a: String,
    pub team_b: String,
    pub score_a: String,
    pub score_b: String,
    pub logo_a: Option<String>,
    pub logo_b: Option<String>,
    pub status: GameStatus,
    pub display_time: String,
    pub is_live: bool,
}

/// Source of the raw scoreboard body. Errors cover transport failures and
/// non-2xx responses alike.
pub trait ScoreFeed: Send + Sync {
    fn fetch_scoreboard(&self) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct EspnFeed {
    url: String,
}

impl EspnFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for EspnFeed {
    fn default() -> Self {
        Self::new(ESPN_SCOREBOARD_URL)
    }
}

impl ScoreFeed for EspnFeed {
    fn fetch_scoreboard(&self) -> Result<String> {
        let client = http_client()?;
        let resp = client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("sports api responded with status {status}"));
        }
        Ok(body)
    }
}

// Containers stay raw so one malformed sport, league or event is skipped on
// its own instead of failing the whole document.
#[derive(Debug, Default, Deserialize)]
struct ScoreboardResponse {
    #[serde(default, deserialize_with = "vec_or_default")]
    sports: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SportEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "vec_or_default")]
    leagues: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct LeagueEntry {
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "vec_or_default")]
    events: Vec<Value>,
}

fn vec_or_default<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let value = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct EventEntry {
    #[serde(default)]
    competitors: Vec<Competitor>,
    #[serde(rename = "fullStatus", default)]
    full_status: Option<FullStatus>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(rename = "shortDisplayName", default)]
    short_display_name: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FullStatus {
    #[serde(rename = "type", default)]
    kind: Option<StatusType>,
}

#[derive(Debug, Deserialize)]
struct StatusType {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "shortDetail", default)]
    short_detail: Option<String>,
}

pub fn parse_scoreboard_json(raw: &str) -> Result<Vec<Game>> {
    parse_scoreboard_json_in(raw, &Local)
}

/// Same as [`parse_scoreboard_json`], formatting scheduled start times in `tz`.
pub fn parse_scoreboard_json_in<Tz>(raw: &str, tz: &Tz) -> Result<Vec<Game>>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: ScoreboardResponse =
        serde_json::from_str(trimmed).context("invalid scoreboard json")?;
    Ok(build_games(data, tz))
}

fn build_games<Tz>(data: ScoreboardResponse, tz: &Tz) -> Vec<Game>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut games = Vec::new();

    for raw_sport in data.sports {
        let sport: SportEntry = match serde_json::from_value(raw_sport) {
            Ok(sport) => sport,
            Err(err) => {
                debug!("skipping malformed sport: {err}");
                continue;
            }
        };
        if sport.leagues.is_empty() {
            continue;
        }
        info!(
            "processing sport: {}",
            sport.name.as_deref().unwrap_or("unnamed")
        );
        for raw_league in sport.leagues {
            let league: LeagueEntry = match serde_json::from_value(raw_league) {
                Ok(league) => league,
                Err(err) => {
                    debug!("skipping malformed league: {err}");
                    continue;
                }
            };
            let label = non_empty(league.short_name.as_deref())
                .or_else(|| non_empty(league.name.as_deref()));
            let Some(league_id) = label.and_then(League::from_abbreviation) else {
                debug!("ignoring unsupported league: {}", label.unwrap_or("?"));
                continue;
            };
            for raw in league.events {
                match parse_event(raw, league_id, tz) {
                    Ok(Some(game)) => games.push(game),
                    Ok(None) => {}
                    Err(err) => debug!("skipping {league_id} event: {err:#}"),
                }
            }
        }
    }

    games
}

fn parse_event<Tz>(raw: Value, league: League, tz: &Tz) -> Result<Option<Game>>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let event: EventEntry = serde_json::from_value(raw).context("malformed event")?;
    let [first, second, ..] = event.competitors.as_slice() else {
        return Ok(None);
    };

    let (status, display_time) = resolve_status(
        event.full_status.as_ref().and_then(|s| s.kind.as_ref()),
        event.date.as_deref(),
        tz,
    );

    Ok(Some(Game {
        league,
        team_a: team_name(first),
        team_b: team_name(second),
        score_a: score_text(first.score.as_ref()),
        score_b: score_text(second.score.as_ref()),
        logo_a: non_empty(first.logo.as_deref()).map(str::to_string),
        logo_b: non_empty(second.logo.as_deref()).map(str::to_string),
        status,
        display_time,
        is_live: status == GameStatus::Live,
    }))
}

fn team_name(team: &Competitor) -> String {
    non_empty(team.abbreviation.as_deref())
        .or_else(|| non_empty(team.short_display_name.as_deref()))
        .or_else(|| non_empty(team.display_name.as_deref()))
        .unwrap_or(TEAM_PLACEHOLDER)
        .to_string()
}

fn score_text(score: Option<&Value>) -> String {
    match score {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => DEFAULT_SCORE.to_string(),
    }
}

fn resolve_status<Tz>(kind: Option<&StatusType>, date: Option<&str>, tz: &Tz) -> (GameStatus, String)
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let name = kind.and_then(|k| k.name.as_deref()).unwrap_or_default();
    match name {
        "STATUS_FINAL" => (GameStatus::Final, String::new()),
        "STATUS_IN_PROGRESS" => {
            let detail = kind
                .and_then(|k| non_empty(k.short_detail.as_deref()))
                .unwrap_or("Live");
            (GameStatus::Live, detail.to_string())
        }
        "STATUS_SCHEDULED" => {
            let time = date
                .and_then(|raw| format_start_time(raw, tz))
                .unwrap_or_default();
            (GameStatus::Scheduled, time)
        }
        _ => (GameStatus::Scheduled, String::new()),
    }
}

/// Formats an upstream start time as `h:mm AM/PM` in `tz`.
pub fn format_start_time<Tz>(raw: &str, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let utc = parse_event_date(raw)?;
    Some(utc.with_timezone(tz).format("%-I:%M %p").to_string())
}

fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    // The scoreboard usually sends minute precision, e.g. 2025-10-18T23:05Z.
    let naive = trimmed.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|dt| dt.and_utc())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
