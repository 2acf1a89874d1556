use std::time::Duration;

use log::debug;

use crate::panel::{Panel, PanelKind, PanelProducer};
use crate::registry::PanelRegistry;
use crate::scroll::{Extent, SCROLL_SPEED_PX_PER_SEC, ScrollTiming, scroll_timing};
use crate::weather::WeatherSnapshot;

pub const TICK_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_DWELL_TICKS: u32 = 8;
/// Display id that, when it blocks the ticker, also rewinds it to the first panel.
pub const PROGRESS_DISPLAY_ID: &str = "progress";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayStatus {
    pub eligible: bool,
    pub id: String,
}

/// Reports whether the surrounding display currently allows the ticker to draw.
pub trait DisplayGate {
    fn current_display(&self) -> Option<DisplayStatus>;
}

pub trait RenderSink {
    /// `None` when there is no surface to measure against; the panel is then skipped.
    fn measure(&mut self, text: &str) -> Option<Extent>;
    fn render(&mut self, panel: &Panel, motion: Option<&ScrollTiming>);
}

pub struct TickContext<'a> {
    pub gate: &'a dyn DisplayGate,
    pub snapshot: Option<&'a WeatherSnapshot>,
    pub sink: &'a mut dyn RenderSink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationState {
    pub current_index: usize,
    pub elapsed_ticks: u32,
    pub dwell_ticks: u32,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Suspended,
    Waiting,
    Stopped { reset: bool },
    NoData { index: usize },
    NoSurface { index: usize },
    Rendered { index: usize, kind: PanelKind },
    /// Every producer came back invalid within one tick.
    Exhausted,
}

#[derive(Debug)]
pub struct RotationScheduler {
    state: RotationState,
    registry: PanelRegistry,
    default_dwell: u32,
    scroll_speed: f64,
    tick_interval: Duration,
}

impl RotationScheduler {
    pub fn new(registry: PanelRegistry) -> Self {
        Self::with_timing(
            registry,
            DEFAULT_DWELL_TICKS,
            SCROLL_SPEED_PX_PER_SEC,
            TICK_INTERVAL,
        )
    }

    pub fn with_timing(
        registry: PanelRegistry,
        default_dwell: u32,
        scroll_speed: f64,
        tick_interval: Duration,
    ) -> Self {
        let default_dwell = default_dwell.max(1);
        Self {
            state: RotationState {
                current_index: 0,
                elapsed_ticks: 0,
                dwell_ticks: default_dwell,
                running: false,
            },
            registry,
            default_dwell,
            scroll_speed,
            tick_interval,
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Resumes rotation and redraws the current slot. Calling it while
    /// already running only redraws.
    pub fn start(&mut self, ctx: &mut TickContext<'_>) -> TickOutcome {
        self.state.running = true;
        self.show_current(ctx, 0)
    }

    pub fn stop(&mut self, reset: bool) {
        self.state.running = false;
        if reset {
            self.state.current_index = 0;
        }
    }

    pub fn add_screen(&mut self, producer: PanelProducer) {
        self.registry.add_screen(producer);
    }

    pub fn reset(&mut self) {
        self.registry.reset();
        // Park on the last slot so the next advance wraps to the first.
        if self.state.current_index >= self.registry.len() {
            self.state.current_index = self.registry.len() - 1;
        }
    }

    pub fn tick(&mut self, force: bool, ctx: &mut TickContext<'_>) -> TickOutcome {
        if !self.state.running {
            return TickOutcome::Suspended;
        }
        if !force {
            self.state.elapsed_ticks += 1;
            if self.state.elapsed_ticks < self.state.dwell_ticks {
                return TickOutcome::Waiting;
            }
        }
        self.advance(ctx, 0)
    }

    fn advance(&mut self, ctx: &mut TickContext<'_>, skipped: usize) -> TickOutcome {
        self.state.elapsed_ticks = 0;
        self.state.dwell_ticks = self.default_dwell;

        match ctx.gate.current_display() {
            Some(display) if display.eligible => {}
            display => {
                let reset = display.is_some_and(|d| d.id == PROGRESS_DISPLAY_ID);
                self.stop(reset);
                return TickOutcome::Stopped { reset };
            }
        }

        self.state.current_index = (self.state.current_index + 1) % self.registry.len();
        self.show_current(ctx, skipped)
    }

    fn show_current(&mut self, ctx: &mut TickContext<'_>, skipped: usize) -> TickOutcome {
        let index = self.state.current_index;
        // The index has already moved; a missing snapshot just loses this slot.
        let Some(snapshot) = ctx.snapshot else {
            return TickOutcome::NoData { index };
        };

        let Some(panel) = self.registry.produce(index, snapshot) else {
            if skipped + 1 >= self.registry.len() {
                debug!("no valid panel in rotation of {}", self.registry.len());
                return TickOutcome::Exhausted;
            }
            debug!("panel {index} invalid, skipping");
            return self.advance(ctx, skipped + 1);
        };

        if self.dispatch(&panel, ctx) {
            TickOutcome::Rendered {
                index,
                kind: panel.kind(),
            }
        } else {
            TickOutcome::NoSurface { index }
        }
    }

    fn dispatch(&mut self, panel: &Panel, ctx: &mut TickContext<'_>) -> bool {
        let Panel::Scroll { text } = panel else {
            ctx.sink.render(panel, None);
            return true;
        };
        let Some(extent) = ctx.sink.measure(text) else {
            return false;
        };
        let timing = scroll_timing(extent, self.scroll_speed, self.tick_interval);
        self.state.dwell_ticks = timing.dwell_ticks.max(1);
        ctx.sink.render(panel, Some(&timing));
        true
    }
}
