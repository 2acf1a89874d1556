use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::Level;

use crate::config::TickerConfig;
use crate::panel::PanelProducer;
use crate::registry::PanelRegistry;
use crate::rotation::{
    DisplayGate, RenderSink, RotationScheduler, RotationState, TickContext, TickOutcome,
};
use crate::score_cache::{FetchPlan, FetchRequest, ScorePipeline};
use crate::score_fetch::{Game, ScoreFeed};
use crate::score_panels::game_producers;
use crate::weather::WeatherSnapshot;

const MAX_LOGS: usize = 200;
const MAX_CATCH_UP_TICKS: usize = 64;

/// Results produced off the ticker's timeline, applied in arrival order.
#[derive(Debug)]
pub enum Delta {
    ScoresFetched {
        request: FetchRequest,
        result: Result<String>,
    },
    SetSnapshot(Option<WeatherSnapshot>),
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerStatus {
    pub rotation: RotationState,
    pub panels: usize,
    pub baseline: usize,
    pub cached_games: usize,
    pub cache_age: Option<Duration>,
    pub fetches_in_flight: usize,
    pub sports_updates: bool,
    pub has_snapshot: bool,
}

/// Owns everything the ticker mutates: rotation state, the panel registry and
/// the score cache. Both timelines (rotation ticks and sports refresh) are
/// driven by `advance` from a caller-supplied clock.
pub struct Ticker {
    scheduler: RotationScheduler,
    pipeline: ScorePipeline,
    snapshot: Option<WeatherSnapshot>,
    tick_interval: Duration,
    refresh_interval: Duration,
    refresh_warmup: Duration,
    next_tick_at: Option<Instant>,
    next_refresh_at: Option<Instant>,
    outbox: Vec<FetchRequest>,
    in_flight: usize,
    pub logs: VecDeque<String>,
}

impl Ticker {
    pub fn new(
        config: &TickerConfig,
        baseline: Vec<PanelProducer>,
        feed: Arc<dyn ScoreFeed>,
    ) -> Result<Self> {
        let registry = PanelRegistry::new(baseline)?;
        let scheduler = RotationScheduler::with_timing(
            registry,
            config.dwell_ticks,
            config.scroll_speed,
            config.tick_interval,
        );
        Ok(Self {
            scheduler,
            pipeline: ScorePipeline::new(feed, config.scores_ttl),
            snapshot: None,
            tick_interval: config.tick_interval,
            refresh_interval: config.refresh_interval,
            refresh_warmup: config.refresh_warmup,
            next_tick_at: None,
            next_refresh_at: None,
            outbox: Vec::new(),
            in_flight: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
        })
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    pub fn pipeline(&self) -> &ScorePipeline {
        &self.pipeline
    }

    pub fn feed(&self) -> Arc<dyn ScoreFeed> {
        self.pipeline.feed()
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn set_snapshot(&mut self, snapshot: Option<WeatherSnapshot>) {
        self.snapshot = snapshot;
    }

    /// Arms the tick clock (once) and draws the current panel.
    pub fn start(
        &mut self,
        now: Instant,
        gate: &dyn DisplayGate,
        sink: &mut dyn RenderSink,
    ) -> TickOutcome {
        if self.next_tick_at.is_none() {
            self.next_tick_at = Some(now + self.tick_interval);
        }
        let mut ctx = TickContext {
            gate,
            snapshot: self.snapshot.as_ref(),
            sink,
        };
        self.scheduler.start(&mut ctx)
    }

    pub fn stop(&mut self, reset: bool) {
        self.scheduler.stop(reset);
    }

    /// Runs one tick immediately, outside the clock.
    pub fn tick(
        &mut self,
        force: bool,
        gate: &dyn DisplayGate,
        sink: &mut dyn RenderSink,
    ) -> TickOutcome {
        let mut ctx = TickContext {
            gate,
            snapshot: self.snapshot.as_ref(),
            sink,
        };
        self.scheduler.tick(force, &mut ctx)
    }

    pub fn add_screen(&mut self, producer: PanelProducer) {
        self.scheduler.add_screen(producer);
    }

    pub fn reset(&mut self) {
        self.scheduler.reset();
    }

    /// Arms the sports refresh timer: first run after the warm-up, then every
    /// refresh interval. Repeated calls keep the existing schedule.
    pub fn start_sports_updates(&mut self, now: Instant) {
        if self.next_refresh_at.is_none() {
            self.next_refresh_at = Some(now + self.refresh_warmup);
        }
    }

    /// One refresh cycle. A fresh cache is applied right away; otherwise a
    /// request is queued for the caller to run (see `take_fetch_requests`).
    pub fn add_sports_to_rotation(&mut self, now: Instant) {
        match self.pipeline.begin_fetch(now) {
            FetchPlan::Cached(games) => self.apply_games(games),
            FetchPlan::Request(request) => {
                self.outbox.push(request);
                self.in_flight += 1;
            }
        }
    }

    /// Blocking fetch through the cache, without touching the rotation.
    pub fn fetch_sports_data(&mut self, now: Instant) -> Vec<Game> {
        self.pipeline.fetch_games(now)
    }

    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn apply_delta(&mut self, delta: Delta) {
        match delta {
            Delta::ScoresFetched { request, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let outcome = self.pipeline.complete_fetch(request, result);
                if let Some(err) = outcome.error {
                    self.push_log(
                        Level::Warn,
                        format!("Sports fetch failed, keeping cached scores: {err}"),
                    );
                }
                self.apply_games(outcome.games);
            }
            Delta::SetSnapshot(snapshot) => self.snapshot = snapshot,
            Delta::Log(msg) => self.push_log(Level::Info, msg),
        }
    }

    /// Fires the refresh timer if due, then every tick whose deadline has passed.
    pub fn advance(
        &mut self,
        now: Instant,
        gate: &dyn DisplayGate,
        sink: &mut dyn RenderSink,
    ) -> Vec<TickOutcome> {
        if let Some(at) = self.next_refresh_at
            && at <= now
        {
            self.add_sports_to_rotation(now);
            let mut next = at + self.refresh_interval;
            while next <= now {
                next += self.refresh_interval;
            }
            self.next_refresh_at = Some(next);
        }

        let mut outcomes = Vec::new();
        while let Some(at) = self.next_tick_at.filter(|at| *at <= now) {
            if outcomes.len() >= MAX_CATCH_UP_TICKS {
                self.next_tick_at = Some(now + self.tick_interval);
                break;
            }
            let mut ctx = TickContext {
                gate,
                snapshot: self.snapshot.as_ref(),
                sink: &mut *sink,
            };
            outcomes.push(self.scheduler.tick(false, &mut ctx));
            self.next_tick_at = Some(at + self.tick_interval);
        }
        outcomes
    }

    pub fn status(&self, now: Instant) -> TickerStatus {
        let cache = self.pipeline.cache();
        TickerStatus {
            rotation: self.scheduler.state(),
            panels: self.scheduler.registry().len(),
            baseline: self.scheduler.registry().baseline_len(),
            cached_games: cache.games().len(),
            cache_age: cache.age(now),
            fetches_in_flight: self.in_flight,
            sports_updates: self.next_refresh_at.is_some(),
            has_snapshot: self.snapshot.is_some(),
        }
    }

    pub fn push_log(&mut self, level: Level, msg: impl Into<String>) {
        let msg = msg.into();
        log::log!(level, "{msg}");
        self.logs.push_back(format!("[{level}] {msg}"));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Swaps every score panel for the given games. Zero games leave the
    /// rotation as it is.
    fn apply_games(&mut self, games: Vec<Game>) {
        if games.is_empty() {
            self.push_log(Level::Info, "No sports data available");
            return;
        }
        self.scheduler.reset();
        for producer in game_producers(&games) {
            self.scheduler.add_screen(producer);
        }
        self.push_log(
            Level::Info,
            format!("Added {} sports screens to rotation", games.len()),
        );
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("scheduler", &self.scheduler)
            .field("pipeline", &self.pipeline)
            .field("next_tick_at", &self.next_tick_at)
            .field("next_refresh_at", &self.next_refresh_at)
            .finish_non_exhaustive()
    }
}
