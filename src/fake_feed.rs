use anyhow::Result;
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Value, json};

use crate::score_fetch::ScoreFeed;

const MLB_TEAMS: &[&str] = &["ATL", "NYY", "LAD", "HOU", "CHC", "BOS", "SEA", "PHI"];
const NBA_TEAMS: &[&str] = &["ATL", "BOS", "LAL", "GSW", "MIA", "DEN", "MIL", "PHX"];
const NFL_TEAMS: &[&str] = &["ATL", "KC", "PHI", "SF", "DAL", "BUF", "DET", "BAL"];
const NHL_TEAMS: &[&str] = &["BOS", "NYR", "TOR", "EDM", "COL", "VGK", "FLA", "DAL"];
const LIVE_CLOCKS: &[&str] = &["Top 5th", "Q3 4:12", "2nd 11:40", "Halftime", "Bot 9th"];

/// Offline scoreboard in the upstream's shape, for demos without network.
/// Includes an unsupported league and a malformed event so the ingestion
/// filters stay exercised.
#[derive(Debug, Default)]
pub struct FakeFeed;

impl FakeFeed {
    pub fn new() -> Self {
        Self
    }
}

impl ScoreFeed for FakeFeed {
    fn fetch_scoreboard(&self) -> Result<String> {
        let mut rng = rand::thread_rng();
        let leagues = vec![
            fake_league(&mut rng, "MLB", MLB_TEAMS, 12),
            fake_league(&mut rng, "NBA", NBA_TEAMS, 140),
            fake_league(&mut rng, "NFL", NFL_TEAMS, 45),
            fake_league(&mut rng, "NHL", NHL_TEAMS, 7),
            json!({
                "shortName": "MLS",
                "name": "Major League Soccer",
                "events": [fake_event(&mut rng, &["ATL", "MIA"], 4)],
            }),
        ];
        let body = json!({
            "sports": [{ "name": "Mixed", "leagues": leagues }],
        });
        Ok(body.to_string())
    }
}

fn fake_league<R: Rng>(rng: &mut R, short_name: &str, teams: &[&str], max_score: u32) -> Value {
    let mut events: Vec<Value> = (0..3).map(|_| fake_event(rng, teams, max_score)).collect();
    events.push(json!({ "competitors": "not-a-list" }));
    json!({ "shortName": short_name, "events": events })
}

fn fake_event<R: Rng>(rng: &mut R, teams: &[&str], max_score: u32) -> Value {
    let picked: Vec<&str> = teams.choose_multiple(rng, 2).copied().collect();
    let with_logos = rng.gen_bool(0.3);
    let competitors: Vec<Value> = picked
        .iter()
        .map(|abbr| {
            let mut team = json!({
                "abbreviation": abbr,
                "score": rng.gen_range(0..=max_score).to_string(),
            });
            if with_logos {
                team["logo"] = json!(format!("https://example.invalid/logos/{abbr}.png"));
            }
            team
        })
        .collect();

    let status = match rng.gen_range(0..3) {
        0 => json!({ "type": { "name": "STATUS_FINAL", "shortDetail": "Final" } }),
        1 => json!({
            "type": {
                "name": "STATUS_IN_PROGRESS",
                "shortDetail": LIVE_CLOCKS.choose(rng).copied().unwrap_or("Live"),
            }
        }),
        _ => json!({ "type": { "name": "STATUS_SCHEDULED" } }),
    };
    let start = Utc::now() + ChronoDuration::minutes(rng.gen_range(30..600));

    json!({
        "competitors": competitors,
        "fullStatus": status,
        "date": start.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}
