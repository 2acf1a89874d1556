use crate::panel::{Panel, PanelProducer, Scoreboard};
use crate::score_fetch::{Game, GameStatus};

pub const LIVE_SCROLL_AFTER: usize = 45;
pub const SCROLL_AFTER: usize = 60;

pub fn status_line(game: &Game) -> String {
    match game.status {
        GameStatus::Final => format!(
            "{}: {} {}, {} {} - Final",
            game.league, game.team_a, game.score_a, game.team_b, game.score_b
        ),
        GameStatus::Live => format!(
            "{}: {} {}, {} {} - {}",
            game.league, game.team_a, game.score_a, game.team_b, game.score_b, game.display_time
        ),
        GameStatus::Scheduled => {
            let mut line = format!("{}: {} vs {}", game.league, game.team_a, game.team_b);
            if !game.display_time.is_empty() {
                line.push_str(" - ");
                line.push_str(&game.display_time);
            }
            line
        }
    }
}

/// Logos win outright; otherwise long lines scroll, with a shorter limit
/// for live games whose clock text keeps growing.
pub fn game_panel(game: &Game) -> Panel {
    let text = status_line(game);

    if game.logo_a.is_some() || game.logo_b.is_some() {
        return Panel::Scoreboard(Scoreboard {
            league: game.league,
            team_a: game.team_a.clone(),
            team_b: game.team_b.clone(),
            score_a: game.score_a.clone(),
            score_b: game.score_b.clone(),
            logo_a: game.logo_a.clone(),
            logo_b: game.logo_b.clone(),
            status: game.status,
            display_time: game.display_time.clone(),
            is_live: game.is_live,
            text,
        });
    }

    let len = text.chars().count();
    if (game.is_live && len > LIVE_SCROLL_AFTER) || len > SCROLL_AFTER {
        Panel::Scroll { text }
    } else {
        Panel::Plain { text }
    }
}

pub fn game_producer(game: Game) -> PanelProducer {
    Box::new(move |_| Some(game_panel(&game)))
}

pub fn game_producers(games: &[Game]) -> Vec<PanelProducer> {
    games.iter().cloned().map(game_producer).collect()
}
