use std::fs::File;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::Level;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use wx_ticker::config::TickerConfig;
use wx_ticker::feed::{build_feed, spawn_fetch, spawn_snapshot_reload};
use wx_ticker::panel::{Panel, Segment};
use wx_ticker::rotation::{DisplayGate, DisplayStatus, PROGRESS_DISPLAY_ID, RenderSink};
use wx_ticker::scroll::{Extent, ScrollTiming};
use wx_ticker::state::{Delta, Ticker, TickerStatus};
use wx_ticker::weather::baseline_producers;

const SNAPSHOT_RELOAD: Duration = Duration::from_secs(60);
const POLL_RATE: Duration = Duration::from_millis(50);

/// Stands in for the surrounding display: keys flip eligibility.
struct KeyGate {
    status: Option<DisplayStatus>,
}

impl KeyGate {
    fn set(&mut self, eligible: bool, id: &str) {
        self.status = Some(DisplayStatus {
            eligible,
            id: id.to_string(),
        });
    }
}

impl DisplayGate for KeyGate {
    fn current_display(&self) -> Option<DisplayStatus> {
        self.status.clone()
    }
}

struct Shown {
    panel: Panel,
    motion: Option<ScrollTiming>,
    shown_at: Instant,
}

/// One-line ticker surface. Widths are reported in pixels using a fixed cell
/// width so scroll timing matches a pixel display.
struct TerminalSink {
    cell_px: f64,
    width_cells: u16,
    current: Option<Shown>,
}

impl RenderSink for TerminalSink {
    fn measure(&mut self, text: &str) -> Option<Extent> {
        if self.width_cells == 0 {
            return None;
        }
        Some(Extent {
            content_width: text.chars().count() as f64 * self.cell_px,
            container_width: f64::from(self.width_cells) * self.cell_px,
        })
    }

    fn render(&mut self, panel: &Panel, motion: Option<&ScrollTiming>) {
        self.current = Some(Shown {
            panel: panel.clone(),
            motion: motion.copied(),
            shown_at: Instant::now(),
        });
    }
}

struct App {
    ticker: Ticker,
    gate: KeyGate,
    sink: TerminalSink,
    should_quit: bool,
    tx: mpsc::Sender<Delta>,
}

impl App {
    fn on_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('p') => {
                self.gate.set(false, PROGRESS_DISPLAY_ID);
                self.ticker.push_log(Level::Info, "Display paused");
            }
            KeyCode::Char('h') => {
                self.gate.set(false, "hidden");
                self.ticker.push_log(Level::Info, "Display hidden");
            }
            KeyCode::Char('s') => {
                self.gate.set(true, "current-weather");
                self.ticker.start(now, &self.gate, &mut self.sink);
            }
            KeyCode::Char('n') => {
                self.ticker.tick(true, &self.gate, &mut self.sink);
            }
            KeyCode::Char('r') => {
                self.ticker.push_log(Level::Info, "Sports refresh requested");
                self.ticker.add_sports_to_rotation(now);
            }
            _ => {}
        }
    }

    fn dispatch_fetches(&mut self) {
        for request in self.ticker.take_fetch_requests() {
            spawn_fetch(self.ticker.feed(), request, self.tx.clone());
        }
    }
}

fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().filter_or("TICKER_LOG", "info"));
    match std::env::var("TICKER_LOG_FILE").ok().map(File::create) {
        Some(Ok(file)) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // stderr would draw over the terminal UI
        _ => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let config = TickerConfig::from_env();
    let feed = build_feed(&config);
    let mut ticker = Ticker::new(&config, baseline_producers(), feed)?;

    let (tx, rx) = mpsc::channel();
    spawn_snapshot_reload(config.snapshot_path.clone(), SNAPSHOT_RELOAD, tx.clone());

    let now = Instant::now();
    ticker.start_sports_updates(now);

    let mut gate = KeyGate { status: None };
    gate.set(true, "current-weather");
    let mut app = App {
        ticker,
        gate,
        sink: TerminalSink {
            cell_px: config.cell_px,
            width_cells: 0,
            current: None,
        },
        should_quit: false,
        tx,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    app.sink.width_cells = terminal.size()?.width;
    app.ticker.start(Instant::now(), &app.gate, &mut app.sink);

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.ticker.apply_delta(delta);
        }

        app.sink.width_cells = terminal.size()?.width;
        let now = Instant::now();
        app.ticker.advance(now, &app.gate, &mut app.sink);
        app.dispatch_fetches();

        terminal.draw(|f| ui(f, app, now))?;

        if event::poll(POLL_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                    app.dispatch_fetches();
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.ticker.status(now)))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_ticker(frame, chunks[1], app.sink.current.as_ref(), app.sink.cell_px);

    let visible = chunks[2].height as usize;
    let skip = app.ticker.logs.len().saturating_sub(visible);
    let logs: Vec<Line> = app
        .ticker
        .logs
        .iter()
        .skip(skip)
        .map(|line| Line::from(line.as_str()))
        .collect();
    frame.render_widget(
        Paragraph::new(logs).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );

    let footer = Paragraph::new("s Start | p Pause | h Hide | n Next | r Refresh sports | q Quit")
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);
}

fn header_text(status: &TickerStatus) -> String {
    let state = if status.rotation.running {
        "RUNNING"
    } else {
        "STOPPED"
    };
    let cache_age = status
        .cache_age
        .map(|age| format!("{}s", age.as_secs()))
        .unwrap_or_else(|| "-".to_string());
    let line1 = format!(
        "WX TICKER | {state} | panel {}/{} (baseline {})",
        status.rotation.current_index + 1,
        status.panels,
        status.baseline
    );
    let line2 = format!(
        "dwell {}/{} | games {} (age {cache_age}, in flight {}) | snapshot {}",
        status.rotation.elapsed_ticks,
        status.rotation.dwell_ticks,
        status.cached_games,
        status.fetches_in_flight,
        if status.has_snapshot { "ok" } else { "waiting" }
    );
    format!("{line1}\n{line2}")
}

fn render_ticker(frame: &mut Frame, area: Rect, shown: Option<&Shown>, cell_px: f64) {
    let block = Block::default().borders(Borders::ALL);
    let Some(shown) = shown else {
        frame.render_widget(block, area);
        return;
    };

    let (line, offset_cells) = match &shown.panel {
        Panel::Plain { text } => (Line::from(text.as_str()), 0),
        Panel::Scroll { text } => {
            let offset_px = shown
                .motion
                .map(|motion| motion.offset_at(shown.shown_at.elapsed()))
                .unwrap_or_default();
            let cells = (-offset_px / cell_px).round().max(0.0) as u16;
            (Line::from(text.as_str()), cells)
        }
        Panel::Scoreboard(board) => (scoreboard_line(&board.segments()), 0),
    };

    frame.render_widget(
        Paragraph::new(line).block(block).scroll((0, offset_cells)),
        area,
    );
}

fn scoreboard_line(segments: &[Segment]) -> Line<'static> {
    let spans: Vec<Span<'static>> = segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::League(text) => Some(Span::styled(
                format!("{text} "),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            // No image support in a terminal; treated like a failed load.
            Segment::Logo { .. } => None,
            Segment::Team(text) => Some(Span::raw(text.clone())),
            Segment::Separator(sep) => Some(Span::raw(*sep)),
            Segment::Status { text, live } => {
                let style = if *live {
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD | Modifier::ITALIC)
                } else {
                    Style::default().add_modifier(Modifier::ITALIC)
                };
                Some(Span::styled(text.clone(), style))
            }
        })
        .collect();
    Line::from(spans)
}
