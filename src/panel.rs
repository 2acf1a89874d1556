use crate::score_fetch::{GameStatus, League};
use crate::weather::WeatherSnapshot;

/// Builds the panel for one rotation slot. `None` marks the slot invalid
/// (no usable data yet) and makes the scheduler skip straight to the next one.
pub type PanelProducer = Box<dyn Fn(&WeatherSnapshot) -> Option<Panel>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Plain,
    Scroll,
    Scoreboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Plain { text: String },
    Scroll { text: String },
    Scoreboard(Scoreboard),
}

impl Panel {
    pub fn plain(text: impl Into<String>) -> Self {
        Panel::Plain { text: text.into() }
    }

    pub fn scroll(text: impl Into<String>) -> Self {
        Panel::Scroll { text: text.into() }
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            Panel::Plain { .. } => PanelKind::Plain,
            Panel::Scroll { .. } => PanelKind::Scroll,
            Panel::Scoreboard(_) => PanelKind::Scoreboard,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Panel::Plain { text } | Panel::Scroll { text } => text,
            Panel::Scoreboard(board) => &board.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
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
    /// Plain status line, for sinks that cannot compose segments.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    League(String),
    Logo { url: String, alt: String },
    Team(String),
    Separator(&'static str),
    Status { text: String, live: bool },
}

impl Scoreboard {
    pub fn shows_scores(&self) -> bool {
        matches!(self.status, GameStatus::Final | GameStatus::Live)
    }

    /// Left-to-right pieces of the scoreboard line. Sinks render logos as
    /// images and must drop a logo that fails to load without dropping the rest.
    pub fn segments(&self) -> Vec<Segment> {
        let mut out = Vec::with_capacity(7);
        out.push(Segment::League(format!("{}:", self.league)));

        if let Some(url) = &self.logo_a {
            out.push(Segment::Logo {
                url: url.clone(),
                alt: self.team_a.clone(),
            });
        }
        out.push(Segment::Team(self.team_label(&self.team_a, &self.score_a)));

        let separator = if self.status == GameStatus::Scheduled {
            " vs "
        } else {
            ", "
        };
        out.push(Segment::Separator(separator));

        if let Some(url) = &self.logo_b {
            out.push(Segment::Logo {
                url: url.clone(),
                alt: self.team_b.clone(),
            });
        }
        out.push(Segment::Team(self.team_label(&self.team_b, &self.score_b)));

        let status = if self.status == GameStatus::Final {
            Some(" - Final".to_string())
        } else if !self.display_time.is_empty() {
            Some(format!(" - {}", self.display_time))
        } else {
            None
        };
        if let Some(text) = status {
            out.push(Segment::Status {
                text,
                live: self.is_live,
            });
        }

        out
    }

    fn team_label(&self, team: &str, score: &str) -> String {
        if self.shows_scores() {
            format!("{team} {score}")
        } else {
            team.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(status: GameStatus, logo_a: Option<&str>, logo_b: Option<&str>) -> Scoreboard {
        Scoreboard {
            league: League::Nhl,
            team_a: "BOS".to_string(),
            team_b: "NYR".to_string(),
            score_a: "3".to_string(),
            score_b: "2".to_string(),
            logo_a: logo_a.map(str::to_string),
            logo_b: logo_b.map(str::to_string),
            status,
            display_time: if status == GameStatus::Live {
                "2nd 04:12".to_string()
            } else {
                String::new()
            },
            is_live: status == GameStatus::Live,
            text: String::new(),
        }
    }

    #[test]
    fn scheduled_board_hides_scores_and_uses_vs() {
        let segments = board(GameStatus::Scheduled, Some("a.png"), None).segments();
        assert_eq!(
            segments,
            vec![
                Segment::League("NHL:".to_string()),
                Segment::Logo {
                    url: "a.png".to_string(),
                    alt: "BOS".to_string()
                },
                Segment::Team("BOS".to_string()),
                Segment::Separator(" vs "),
                Segment::Team("NYR".to_string()),
            ]
        );
    }

    #[test]
    fn live_board_marks_status_live() {
        let segments = board(GameStatus::Live, None, Some("b.png")).segments();
        assert_eq!(segments[1], Segment::Team("BOS 3".to_string()));
        assert_eq!(segments[2], Segment::Separator(", "));
        assert_eq!(
            segments.last(),
            Some(&Segment::Status {
                text: " - 2nd 04:12".to_string(),
                live: true
            })
        );
    }

    #[test]
    fn final_board_always_has_status() {
        let segments = board(GameStatus::Final, None, None).segments();
        assert_eq!(
            segments.last(),
            Some(&Segment::Status {
                text: " - Final".to_string(),
                live: false
            })
        );
    }
}
