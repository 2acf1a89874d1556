use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use wx_ticker::config::TickerConfig;
use wx_ticker::panel::{Panel, PanelKind};
use wx_ticker::rotation::{DisplayGate, DisplayStatus, RenderSink, TickOutcome};
use wx_ticker::score_fetch::ScoreFeed;
use wx_ticker::scroll::{Extent, ScrollTiming};
use wx_ticker::state::{Delta, Ticker};
use wx_ticker::weather::{WeatherSnapshot, baseline_producers};

const FIXTURE_GAMES: usize = 5;
const BASELINE: usize = 5;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Hands out queued bodies in order; `None` simulates an upstream failure.
#[derive(Default)]
struct ScriptedFeed {
    calls: AtomicUsize,
    bodies: Mutex<VecDeque<Option<String>>>,
}

impl ScriptedFeed {
    fn with(bodies: Vec<Option<String>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            bodies: Mutex::new(bodies.into()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScoreFeed for ScriptedFeed {
    fn fetch_scoreboard(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.bodies.lock().unwrap().pop_front().flatten();
        next.ok_or_else(|| anyhow!("sports api responded with status 503"))
    }
}

struct OpenGate;

impl DisplayGate for OpenGate {
    fn current_display(&self) -> Option<DisplayStatus> {
        Some(DisplayStatus {
            eligible: true,
            id: "current-weather".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    rendered: Vec<Panel>,
}

impl RenderSink for RecordingSink {
    fn measure(&mut self, _text: &str) -> Option<Extent> {
        Some(Extent {
            content_width: 800.0,
            container_width: 400.0,
        })
    }

    fn render(&mut self, panel: &Panel, _motion: Option<&ScrollTiming>) {
        self.rendered.push(panel.clone());
    }
}

fn snapshot() -> WeatherSnapshot {
    WeatherSnapshot {
        station_name: Some("Atlanta".to_string()),
        temperature: Some(72),
        temperature_unit: "F".to_string(),
        humidity: Some(40),
        dew_point: Some(50),
        wind_direction: "N".to_string(),
        wind_speed: Some(0),
        visibility: Some(10.0),
        visibility_unit: "mi.".to_string(),
        ..Default::default()
    }
}

fn ticker(feed: Arc<ScriptedFeed>, config: &TickerConfig) -> Ticker {
    let mut ticker = Ticker::new(config, baseline_producers(), feed).unwrap();
    ticker.set_snapshot(Some(snapshot()));
    ticker
}

fn empty_board() -> Option<String> {
    Some(r#"{"sports": []}"#.to_string())
}

#[test]
fn cache_serves_within_ttl_and_refetches_after() {
    let body = read_fixture("espn_scoreboard.json");
    let feed = ScriptedFeed::with(vec![Some(body.clone()), Some(body)]);
    let mut t = ticker(feed.clone(), &TickerConfig::default());
    let t0 = Instant::now();

    assert_eq!(t.fetch_sports_data(t0).len(), FIXTURE_GAMES);
    assert_eq!(t.fetch_sports_data(t0 + Duration::from_secs(599)).len(), FIXTURE_GAMES);
    assert_eq!(feed.calls(), 1);

    assert_eq!(t.fetch_sports_data(t0 + Duration::from_secs(600)).len(), FIXTURE_GAMES);
    assert_eq!(feed.calls(), 2);
}

#[test]
fn failure_after_success_keeps_previous_games() {
    let body = read_fixture("espn_scoreboard.json");
    let feed = ScriptedFeed::with(vec![Some(body), None, Some("<html>".to_string())]);
    let mut t = ticker(feed.clone(), &TickerConfig::default());
    let t0 = Instant::now();

    let first = t.fetch_sports_data(t0);
    let later = t0 + Duration::from_secs(3600);
    assert_eq!(t.fetch_sports_data(later), first);
    assert_eq!(t.fetch_sports_data(later), first);
    assert_eq!(feed.calls(), 3);
    assert_eq!(t.pipeline().cache().fetched_at(), Some(t0));
}

#[test]
fn failure_without_cache_is_empty() {
    let feed = ScriptedFeed::with(vec![None]);
    let mut t = ticker(feed, &TickerConfig::default());
    assert!(t.fetch_sports_data(Instant::now()).is_empty());
}

#[test]
fn empty_answer_is_not_cached_as_fresh() {
    let feed = ScriptedFeed::with(vec![empty_board(), empty_board()]);
    let mut t = ticker(feed.clone(), &TickerConfig::default());
    let t0 = Instant::now();
    t.fetch_sports_data(t0);
    t.fetch_sports_data(t0 + Duration::from_secs(1));
    assert_eq!(feed.calls(), 2);
}

#[test]
fn refresh_runs_after_warmup_and_appends_games() {
    let feed = ScriptedFeed::with(vec![Some(read_fixture("espn_scoreboard.json"))]);
    let mut t = ticker(feed.clone(), &TickerConfig::default());
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();
    t.start_sports_updates(t0);

    t.advance(t0 + Duration::from_secs(1), &OpenGate, &mut sink);
    assert!(t.take_fetch_requests().is_empty());

    t.advance(t0 + Duration::from_secs(2), &OpenGate, &mut sink);
    let requests = t.take_fetch_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(t.status(t0).fetches_in_flight, 1);
    assert_eq!(t.scheduler().registry().len(), BASELINE);

    let result = t.feed().fetch_scoreboard();
    t.apply_delta(Delta::ScoresFetched {
        request: requests[0],
        result,
    });
    let status = t.status(t0 + Duration::from_secs(3));
    assert_eq!(status.panels, BASELINE + FIXTURE_GAMES);
    assert_eq!(status.cached_games, FIXTURE_GAMES);
    assert_eq!(status.fetches_in_flight, 0);
    assert_eq!(feed.calls(), 1);
}

#[test]
fn repeated_refreshes_do_not_grow_rotation() {
    let feed = ScriptedFeed::with(vec![Some(read_fixture("espn_scoreboard.json"))]);
    let mut t = ticker(feed.clone(), &TickerConfig::default());
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();
    t.start_sports_updates(t0);

    t.advance(t0 + Duration::from_secs(2), &OpenGate, &mut sink);
    let request = t.take_fetch_requests()[0];
    let result = t.feed().fetch_scoreboard();
    t.apply_delta(Delta::ScoresFetched { request, result });

    // The scheduled refresh lands inside the TTL and is served from cache.
    t.advance(t0 + Duration::from_secs(302), &OpenGate, &mut sink);
    assert!(t.take_fetch_requests().is_empty());
    assert_eq!(t.scheduler().registry().len(), BASELINE + FIXTURE_GAMES);

    t.add_sports_to_rotation(t0 + Duration::from_secs(500));
    assert!(t.take_fetch_requests().is_empty());
    assert_eq!(t.scheduler().registry().len(), BASELINE + FIXTURE_GAMES);
    assert_eq!(feed.calls(), 1);
}

#[test]
fn zero_games_leave_rotation_untouched() {
    let config = TickerConfig {
        scores_ttl: Duration::from_secs(60),
        ..TickerConfig::default()
    };
    let feed = ScriptedFeed::with(vec![
        Some(read_fixture("espn_scoreboard.json")),
        empty_board(),
    ]);
    let mut t = ticker(feed, &config);
    let t0 = Instant::now();

    t.add_sports_to_rotation(t0);
    let request = t.take_fetch_requests()[0];
    let result = t.feed().fetch_scoreboard();
    t.apply_delta(Delta::ScoresFetched { request, result });
    assert_eq!(t.scheduler().registry().len(), BASELINE + FIXTURE_GAMES);

    t.add_sports_to_rotation(t0 + Duration::from_secs(120));
    let request = t.take_fetch_requests()[0];
    let result = t.feed().fetch_scoreboard();
    t.apply_delta(Delta::ScoresFetched { request, result });
    assert_eq!(t.scheduler().registry().len(), BASELINE + FIXTURE_GAMES);
    assert!(t.pipeline().cache().games().is_empty());
}

#[test]
fn overlapping_fetches_last_resolved_wins() {
    let one_game = r#"{"sports":[{"leagues":[{"shortName":"NHL","events":[
        {"fullStatus":{"type":{"name":"STATUS_FINAL"}},
         "competitors":[{"abbreviation":"BOS","score":"3"},{"abbreviation":"NYR","score":"2"}]}
    ]}]}]}"#;
    let feed = ScriptedFeed::with(vec![
        Some(read_fixture("espn_scoreboard.json")),
        Some(one_game.to_string()),
    ]);
    let mut t = ticker(feed, &TickerConfig::default());
    let t0 = Instant::now();

    t.add_sports_to_rotation(t0);
    t.add_sports_to_rotation(t0 + Duration::from_secs(1));
    let requests = t.take_fetch_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(t.status(t0).fetches_in_flight, 2);

    let older = t.feed().fetch_scoreboard();
    let newer = t.feed().fetch_scoreboard();
    // The newer request resolves first; the older one lands last and wins.
    t.apply_delta(Delta::ScoresFetched {
        request: requests[1],
        result: newer,
    });
    t.apply_delta(Delta::ScoresFetched {
        request: requests[0],
        result: older,
    });

    assert_eq!(t.pipeline().cache().games().len(), FIXTURE_GAMES);
    assert_eq!(t.pipeline().cache().fetched_at(), Some(t0));
    assert_eq!(t.scheduler().registry().len(), BASELINE + FIXTURE_GAMES);
}

#[test]
fn clock_drives_rotation_at_default_dwell() {
    let mut t = ticker(ScriptedFeed::with(Vec::new()), &TickerConfig::default());
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();

    assert_eq!(
        t.start(t0, &OpenGate, &mut sink),
        TickOutcome::Rendered {
            index: 0,
            kind: PanelKind::Plain
        }
    );
    assert_eq!(sink.rendered[0], Panel::plain("Conditions at Atlanta"));

    // A second start must not add another clock.
    t.start(t0 + Duration::from_millis(100), &OpenGate, &mut sink);

    let outcomes = t.advance(t0 + Duration::from_secs(4), &OpenGate, &mut sink);
    assert_eq!(outcomes.len(), 8);
    assert_eq!(
        outcomes.last(),
        Some(&TickOutcome::Rendered {
            index: 1,
            kind: PanelKind::Plain
        })
    );
    assert_eq!(sink.rendered.last(), Some(&Panel::plain("Temp: 72°F")));
}

#[test]
fn snapshot_delta_feeds_baseline_panels() {
    let mut t = Ticker::new(
        &TickerConfig::default(),
        baseline_producers(),
        ScriptedFeed::with(Vec::new()),
    )
    .unwrap();
    let mut sink = RecordingSink::default();
    let t0 = Instant::now();

    assert_eq!(
        t.start(t0, &OpenGate, &mut sink),
        TickOutcome::NoData { index: 0 }
    );
    t.apply_delta(Delta::SetSnapshot(Some(snapshot())));
    t.apply_delta(Delta::Log("snapshot loaded".to_string()));
    assert!(t.status(t0).has_snapshot);
    assert_eq!(t.logs.back().map(String::as_str), Some("[INFO] snapshot loaded"));

    let outcome = t.tick(true, &OpenGate, &mut sink);
    assert_eq!(
        outcome,
        TickOutcome::Rendered {
            index: 1,
            kind: PanelKind::Plain
        }
    );
}
