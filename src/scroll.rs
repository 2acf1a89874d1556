use std::time::Duration;

pub const SCROLL_SPEED_PX_PER_SEC: f64 = 75.0;
/// One tick of pause before motion and the rest after, so the tail stays readable.
pub const MIN_DWELL_TICKS: u32 = 4;
pub const SCROLL_START_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub content_width: f64,
    pub container_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTiming {
    pub distance: f64,
    pub duration_secs: f64,
    pub dwell_ticks: u32,
    pub start_offset: f64,
    pub end_offset: f64,
    pub start_delay: Duration,
}

pub fn scroll_timing(extent: Extent, speed: f64, tick: Duration) -> ScrollTiming {
    let speed = if speed > 0.0 {
        speed
    } else {
        SCROLL_SPEED_PX_PER_SEC
    };
    let tick_secs = tick.as_secs_f64();

    let distance = (extent.content_width - extent.container_width).max(0.0);
    let duration_secs = distance / speed;
    let motion_ticks = if tick_secs > 0.0 {
        (duration_secs / tick_secs).ceil()
    } else {
        0.0
    };
    let dwell_ticks = (motion_ticks + f64::from(MIN_DWELL_TICKS)).round() as u32;

    ScrollTiming {
        distance,
        duration_secs,
        dwell_ticks,
        start_offset: 0.0,
        end_offset: -distance,
        start_delay: SCROLL_START_DELAY,
    }
}

impl ScrollTiming {
    /// Horizontal offset of the content `elapsed` after it was first shown.
    pub fn offset_at(&self, elapsed: Duration) -> f64 {
        let Some(moving) = elapsed.checked_sub(self.start_delay) else {
            return self.start_offset;
        };
        if self.duration_secs <= 0.0 {
            return self.end_offset;
        }
        let progress = (moving.as_secs_f64() / self.duration_secs).min(1.0);
        self.start_offset + (self.end_offset - self.start_offset) * progress
    }
}
