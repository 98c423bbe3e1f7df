//! Frame pacing: the source of draw callbacks.
//!
//! Draw cadence follows the pacer, never the output frame rate.

use std::time::{Duration, Instant};

/// Host frame-pacing facility.
///
/// Timestamps are monotonic offsets from an arbitrary pacer-local origin.
pub trait FramePacer: Send {
    /// Current timestamp.
    fn now(&mut self) -> Duration;
    /// Block until the next frame boundary and return its timestamp.
    fn next_frame(&mut self) -> Duration;
}

/// Wall-clock pacer that sleeps until the next display refresh boundary.
#[derive(Debug)]
pub struct DisplayPacer {
    origin: Instant,
    interval: Duration,
}

impl DisplayPacer {
    /// Pacer ticking at `refresh_hz` (clamped to at least 1 Hz).
    pub fn new(refresh_hz: f64) -> Self {
        let hz = if refresh_hz.is_finite() && refresh_hz >= 1.0 {
            refresh_hz
        } else {
            1.0
        };
        Self {
            origin: Instant::now(),
            interval: Duration::from_secs_f64(1.0 / hz),
        }
    }

    /// Refresh interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for DisplayPacer {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl FramePacer for DisplayPacer {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }

    fn next_frame(&mut self) -> Duration {
        let now = self.origin.elapsed();
        let interval = self.interval.as_nanos().max(1);
        let next_tick = now.as_nanos() / interval + 1;
        let target = Duration::from_nanos(u64::try_from(next_tick * interval).unwrap_or(u64::MAX));
        if let Some(wait) = target.checked_sub(now) {
            std::thread::sleep(wait);
        }
        self.origin.elapsed().max(target)
    }
}

/// Virtual clock advancing by a fixed step per frame, without sleeping.
///
/// The first `next_frame` returns the current time, then the clock advances.
#[derive(Clone, Debug)]
pub struct SteppedPacer {
    t: Duration,
    step: Duration,
}

impl SteppedPacer {
    /// Pacer starting at zero that advances by `step` per frame.
    pub fn new(step: Duration) -> Self {
        Self {
            t: Duration::ZERO,
            step,
        }
    }

    /// Pacer advancing by `1 / hz` seconds per frame.
    pub fn from_hz(hz: f64) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 60.0 };
        Self::new(Duration::from_secs_f64(1.0 / hz))
    }
}

impl FramePacer for SteppedPacer {
    fn now(&mut self) -> Duration {
        self.t
    }

    fn next_frame(&mut self) -> Duration {
        let t = self.t;
        self.t += self.step;
        t
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/pacer.rs"]
mod tests;
