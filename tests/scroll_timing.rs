use std::time::Duration;

use wx_ticker::scroll::{Extent, MIN_DWELL_TICKS, scroll_timing};

const HALF_SECOND: Duration = Duration::from_millis(500);

#[test]
fn overflowing_content_gets_motion_plus_pause() {
    let timing = scroll_timing(
        Extent {
            content_width: 500.0,
            container_width: 200.0,
        },
        75.0,
        HALF_SECOND,
    );
    assert_eq!(timing.distance, 300.0);
    assert_eq!(timing.duration_secs, 4.0);
    assert_eq!(timing.dwell_ticks, 12);
    assert_eq!(timing.start_offset, 0.0);
    assert_eq!(timing.end_offset, -300.0);
}

#[test]
fn content_that_fits_still_gets_minimum_dwell() {
    for content in [0.0, 120.0, 200.0] {
        let timing = scroll_timing(
            Extent {
                content_width: content,
                container_width: 200.0,
            },
            75.0,
            HALF_SECOND,
        );
        assert_eq!(timing.distance, 0.0);
        assert_eq!(timing.duration_secs, 0.0);
        assert_eq!(timing.dwell_ticks, MIN_DWELL_TICKS);
    }
}

#[test]
fn calls_are_independent() {
    let wide = Extent {
        content_width: 1500.0,
        container_width: 300.0,
    };
    let first = scroll_timing(wide, 75.0, HALF_SECOND);
    scroll_timing(
        Extent {
            content_width: 10.0,
            container_width: 300.0,
        },
        75.0,
        HALF_SECOND,
    );
    assert_eq!(scroll_timing(wide, 75.0, HALF_SECOND), first);
    assert_eq!(first.dwell_ticks, 36);
}
