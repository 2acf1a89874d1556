use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::config::{FeedSource, TickerConfig};
use crate::fake_feed::FakeFeed;
use crate::score_cache::FetchRequest;
use crate::score_fetch::{EspnFeed, ScoreFeed};
use crate::state::Delta;
use crate::weather::load_snapshot;

pub fn build_feed(config: &TickerConfig) -> Arc<dyn ScoreFeed> {
    match config.feed {
        FeedSource::Espn => Arc::new(EspnFeed::new(config.scores_url.clone())),
        FeedSource::Fake => Arc::new(FakeFeed::new()),
    }
}

/// Runs one scoreboard request off the ticker's timeline. No cancellation:
/// the result is delivered even if a newer request finished first.
pub fn spawn_fetch(feed: Arc<dyn ScoreFeed>, request: FetchRequest, tx: Sender<Delta>) {
    thread::spawn(move || {
        let result = feed.fetch_scoreboard();
        let _ = tx.send(Delta::ScoresFetched { request, result });
    });
}

/// Re-reads the snapshot file on an interval, stopping once the receiver is gone.
pub fn spawn_snapshot_reload(path: PathBuf, interval: Duration, tx: Sender<Delta>) {
    thread::spawn(move || {
        let mut last_error: Option<String> = None;
        loop {
            let delta = match load_snapshot(&path) {
                Ok(snapshot) => {
                    last_error = None;
                    Delta::SetSnapshot(Some(snapshot))
                }
                Err(err) => {
                    let msg = format!("Snapshot unavailable: {err:#}");
                    if last_error.as_deref() == Some(msg.as_str()) {
                        thread::sleep(interval);
                        continue;
                    }
                    last_error = Some(msg.clone());
                    Delta::Log(msg)
                }
            };
            if tx.send(delta).is_err() {
                return;
            }
            thread::sleep(interval);
        }
    });
}
