use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::warn;

use crate::score_fetch::{Game, ScoreFeed, parse_scoreboard_json};

pub const SCORES_TTL: Duration = Duration::from_secs(10 * 60);

/// Last successfully parsed scoreboard. Replaced wholesale, never patched.
#[derive(Debug, Clone)]
pub struct ScoreCache {
    games: Vec<Game>,
    fetched_at: Option<Instant>,
    ttl: Duration,
}

impl ScoreCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            games: Vec::new(),
            fetched_at: None,
            ttl,
        }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.fetched_at.map(|at| now.saturating_duration_since(at))
    }

    /// An empty cache is never fresh, so a zero-game answer is retried.
    pub fn is_fresh(&self, now: Instant) -> bool {
        !self.games.is_empty() && self.age(now).is_some_and(|age| age < self.ttl)
    }

    pub fn replace(&mut self, games: Vec<Game>, fetched_at: Instant) {
        *self = Self {
            games,
            fetched_at: Some(fetched_at),
            ttl: self.ttl,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub issued_at: Instant,
}

#[derive(Debug)]
pub enum FetchPlan {
    Cached(Vec<Game>),
    Request(FetchRequest),
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub games: Vec<Game>,
    pub error: Option<anyhow::Error>,
}

/// Upstream feed plus the TTL cache in front of it. A request that fails at
/// any stage (transport, status, top-level json) falls back to the cache.
pub struct ScorePipeline {
    feed: Arc<dyn ScoreFeed>,
    cache: ScoreCache,
}

impl ScorePipeline {
    pub fn new(feed: Arc<dyn ScoreFeed>, ttl: Duration) -> Self {
        Self {
            feed,
            cache: ScoreCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    pub fn feed(&self) -> Arc<dyn ScoreFeed> {
        Arc::clone(&self.feed)
    }

    pub fn begin_fetch(&self, now: Instant) -> FetchPlan {
        if self.cache.is_fresh(now) {
            FetchPlan::Cached(self.cache.games().to_vec())
        } else {
            FetchPlan::Request(FetchRequest { issued_at: now })
        }
    }

    /// Applies a finished request. Results are applied in arrival order, so
    /// with two requests in flight the one that resolves last owns the cache.
    pub fn complete_fetch(&mut self, request: FetchRequest, body: Result<String>) -> FetchOutcome {
        match body.and_then(|raw| parse_scoreboard_json(&raw)) {
            Ok(games) => {
                self.cache.replace(games.clone(), request.issued_at);
                FetchOutcome { games, error: None }
            }
            Err(err) => {
                warn!("failed to fetch sports data: {err:#}");
                FetchOutcome {
                    games: self.cache.games().to_vec(),
                    error: Some(err),
                }
            }
        }
    }

    /// Blocking fetch: serves the cache while fresh, otherwise issues one
    /// request on the calling thread.
    pub fn fetch_games(&mut self, now: Instant) -> Vec<Game> {
        match self.begin_fetch(now) {
            FetchPlan::Cached(games) => games,
            FetchPlan::Request(request) => {
                let body = self.feed.fetch_scoreboard();
                self.complete_fetch(request, body).games
            }
        }
    }
}

impl std::fmt::Debug for ScorePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorePipeline")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
