//! Loop pacing helpers.

use std::time::{Duration, Instant};

/// Scoped request for elevated OS timer resolution.
///
/// On Windows the default timer granularity is too coarse for a
/// millisecond-scale loop period, so the multimedia timer is raised to 1 ms
/// for the guard's lifetime. Elsewhere the sleep granularity is already
/// sufficient and the guard does nothing.
pub(crate) struct TimerResolution {
    _priv: (),
}

#[cfg(windows)]
#[link(name = "winmm")]
extern "system" {
    fn timeBeginPeriod(period: u32) -> u32;
    fn timeEndPeriod(period: u32) -> u32;
}

impl TimerResolution {
    pub(crate) fn acquire() -> TimerResolution {
        #[cfg(windows)]
        unsafe {
            timeBeginPeriod(1);
        }
        TimerResolution { _priv: () }
    }
}

impl Drop for TimerResolution {
    fn drop(&mut self) {
        #[cfg(windows)]
        unsafe {
            timeEndPeriod(1);
        }
    }
}

/// Sleep out the rest of a cycle: `max(1 us, period - elapsed)`.
///
/// Only the current cycle's overrun is compensated; there is no drift
/// correction across cycles.
pub(crate) fn sleep_remainder(start: Instant, period: Duration) {
    let remaining = period
        .saturating_sub(start.elapsed())
        .max(Duration::from_micros(1));
    std::thread::sleep(remaining);
}
