use std::ops::Range;

use crate::foundation::core::Fps;
use crate::render::surface::{FrameRGBA, Surface};

/// One surface snapshot covering one or more consecutive capture ticks.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    /// Capture tick indices this snapshot stands for.
    pub ticks: Range<u64>,
    /// Snapshot of the surface.
    pub frame: FrameRGBA,
}

impl CapturedFrame {
    /// Number of output frames this snapshot produces.
    pub fn repeat(&self) -> u64 {
        self.ticks.end - self.ticks.start
    }
}

/// Live view of the drawing surface sampled at a fixed rate.
///
/// Tick `k` is due once the draw clock reaches `k / fps`. A draw at elapsed `e` yields every
/// not-yet-yielded tick with `k / fps <= min(e, total)` and `k < ceil(total * fps)`, so the number
/// of captured frames depends only on the total duration and the rate.
#[derive(Debug)]
pub struct SurfaceStream {
    fps: Fps,
    total: f64,
    total_ticks: u64,
    next_tick: u64,
    live: bool,
    releases: u32,
}

impl SurfaceStream {
    /// Stream sampling at `fps` over a timeline of `total` seconds.
    pub fn new(fps: Fps, total: f64) -> Self {
        Self {
            fps,
            total,
            total_ticks: fps.secs_to_frames_ceil(total),
            next_tick: 0,
            live: true,
            releases: 0,
        }
    }

    /// Number of ticks the whole timeline produces.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Ticks yielded so far.
    pub fn captured_ticks(&self) -> u64 {
        self.next_tick
    }

    /// Whether the tracks are still live.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// How many times [`SurfaceStream::release`] actually stopped the tracks (0 or 1).
    pub fn releases(&self) -> u32 {
        self.releases
    }

    /// Ticks due at draw time `elapsed`, advancing the stream. Empty once released.
    pub fn due_ticks(&mut self, elapsed: f64) -> Range<u64> {
        if !self.live {
            return self.next_tick..self.next_tick;
        }
        let clock = if elapsed.is_finite() {
            elapsed.clamp(0.0, self.total)
        } else if elapsed > 0.0 {
            self.total
        } else {
            0.0
        };
        // k / fps <= clock  <=>  k <= clock * num / den
        let last = (clock * f64::from(self.fps.num) / f64::from(self.fps.den) + 1e-9).floor();
        let upto = ((last as u64).saturating_add(1)).min(self.total_ticks);
        let start = self.next_tick;
        self.next_tick = upto.max(start);
        start..self.next_tick
    }

    /// Sample `surface` after a draw at `elapsed`, if any tick became due.
    pub fn capture(&mut self, surface: &Surface, elapsed: f64) -> Option<CapturedFrame> {
        let ticks = self.due_ticks(elapsed);
        if ticks.is_empty() {
            return None;
        }
        Some(CapturedFrame {
            ticks,
            frame: surface.snapshot(),
        })
    }

    /// Stop the tracks. Returns `true` only for the call that stopped them.
    pub fn release(&mut self) -> bool {
        if !self.live {
            return false;
        }
        self.live = false;
        self.releases += 1;
        tracing::debug!(captured = self.next_tick, "capture stream released");
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/stream.rs"]
mod tests;
