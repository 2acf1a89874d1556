use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::rotation::{DEFAULT_DWELL_TICKS, TICK_INTERVAL};
use crate::score_cache::SCORES_TTL;
use crate::score_fetch::ESPN_SCOREBOARD_URL;
use crate::scroll::SCROLL_SPEED_PX_PER_SEC;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const REFRESH_WARMUP: Duration = Duration::from_secs(2);
const DEFAULT_SNAPSHOT_PATH: &str = "demos/snapshot.json";
const DEFAULT_CELL_PX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    Espn,
    Fake,
}

#[derive(Debug, Clone)]
pub struct TickerConfig {
    pub tick_interval: Duration,
    pub dwell_ticks: u32,
    pub scroll_speed: f64,
    pub scores_ttl: Duration,
    pub refresh_interval: Duration,
    pub refresh_warmup: Duration,
    pub scores_url: String,
    pub feed: FeedSource,
    pub snapshot_path: PathBuf,
    pub cell_px: f64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            dwell_ticks: DEFAULT_DWELL_TICKS,
            scroll_speed: SCROLL_SPEED_PX_PER_SEC,
            scores_ttl: SCORES_TTL,
            refresh_interval: REFRESH_INTERVAL,
            refresh_warmup: REFRESH_WARMUP,
            scores_url: ESPN_SCOREBOARD_URL.to_string(),
            feed: FeedSource::Espn,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            cell_px: DEFAULT_CELL_PX,
        }
    }
}

impl TickerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let feed = match env::var("TICKER_FEED")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "fake" => FeedSource::Fake,
            _ => FeedSource::Espn,
        };

        Self {
            tick_interval: Duration::from_millis(
                env_or("TICKER_TICK_MS", TICK_INTERVAL.as_millis() as u64).max(50),
            ),
            dwell_ticks: env_or("TICKER_DWELL_TICKS", defaults.dwell_ticks).max(1),
            scroll_speed: env_or("TICKER_SCROLL_SPEED", defaults.scroll_speed).max(1.0),
            scores_ttl: Duration::from_secs(
                env_or("TICKER_SCORES_TTL_SECS", defaults.scores_ttl.as_secs()).max(10),
            ),
            refresh_interval: Duration::from_secs(
                env_or("TICKER_REFRESH_SECS", defaults.refresh_interval.as_secs()).max(10),
            ),
            refresh_warmup: Duration::from_millis(env_or(
                "TICKER_WARMUP_MS",
                defaults.refresh_warmup.as_millis() as u64,
            )),
            scores_url: env::var("TICKER_SCORES_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.scores_url),
            feed,
            snapshot_path: env::var("TICKER_SNAPSHOT_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            cell_px: env_or("TICKER_CELL_PX", defaults.cell_px).max(1.0),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}
