use crate::scene::model::{SceneDescriptor, Storyboard};

/// Playback position resolved to one scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedFrame<'a> {
    /// Index of the active scene.
    pub scene_index: usize,
    /// The active scene.
    pub scene: &'a SceneDescriptor,
    /// Seconds since the scene's own start.
    pub scene_elapsed: f64,
    /// `scene_elapsed / duration`, in `[0, 1]`.
    pub scene_progress: f64,
    /// Fraction of the whole timeline elapsed, in `[0, 1]`.
    pub overall_progress: f64,
}

/// Result of resolving an elapsed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution<'a> {
    /// `elapsed` falls inside a scene window.
    Scene(ResolvedFrame<'a>),
    /// `elapsed` reached or passed the total duration.
    Finished,
}

/// Maps elapsed playback time to `(scene, intra-scene progress)`.
///
/// Cumulative offsets are recomputed from `duration` alone; the advisory `start` field of each
/// scene is never consulted. Windows are half-open `[start, start + duration)`.
#[derive(Clone, Debug)]
pub struct Timeline {
    storyboard: Storyboard,
    starts: Vec<f64>,
    total: f64,
}

impl Timeline {
    /// Build the cumulative window table for `storyboard`.
    pub fn new(storyboard: Storyboard) -> Self {
        let mut starts = Vec::with_capacity(storyboard.len());
        let mut acc = 0.0f64;
        for scene in storyboard.scenes() {
            starts.push(acc);
            acc += scene.duration;
        }
        Self {
            storyboard,
            starts,
            total: acc,
        }
    }

    /// Underlying storyboard.
    pub fn storyboard(&self) -> &Storyboard {
        &self.storyboard
    }

    /// Sum of all scene durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.total
    }

    /// `[start, end)` window of scene `index` in seconds.
    pub fn window(&self, index: usize) -> Option<(f64, f64)> {
        let start = *self.starts.get(index)?;
        let scene = &self.storyboard.scenes()[index];
        Some((start, start + scene.duration))
    }

    /// Return `true` once `elapsed` reaches the end of the timeline.
    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.total
    }

    /// Fraction of the timeline elapsed, clamped to `[0, 1]`.
    pub fn overall_progress(&self, elapsed: f64) -> f64 {
        if !elapsed.is_finite() {
            return if elapsed > 0.0 { 1.0 } else { 0.0 };
        }
        (elapsed / self.total).clamp(0.0, 1.0)
    }

    /// Resolve `elapsed` seconds since playback start.
    ///
    /// Completion is checked before scene lookup, so `elapsed == total` is `Finished` rather than
    /// the tail of the last scene. Negative or NaN input resolves as `0`.
    pub fn resolve(&self, elapsed: f64) -> Resolution<'_> {
        if self.is_finished(elapsed) {
            return Resolution::Finished;
        }
        let elapsed = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };

        let index = self
            .starts
            .partition_point(|&start| start <= elapsed)
            .saturating_sub(1);
        let scene = &self.storyboard.scenes()[index];
        let scene_elapsed = elapsed - self.starts[index];

        Resolution::Scene(ResolvedFrame {
            scene_index: index,
            scene,
            scene_elapsed,
            scene_progress: (scene_elapsed / scene.duration).clamp(0.0, 1.0),
            overall_progress: self.overall_progress(elapsed),
        })
    }

    /// Frame drawn on the completion tick: last scene fully played, overall progress `1.0`.
    pub fn terminal_frame(&self) -> ResolvedFrame<'_> {
        let index = self.starts.len() - 1;
        let scene = &self.storyboard.scenes()[index];
        ResolvedFrame {
            scene_index: index,
            scene,
            scene_elapsed: scene.duration,
            scene_progress: 1.0,
            overall_progress: 1.0,
        }
    }

    /// Like [`Timeline::resolve`], but maps completion to [`Timeline::terminal_frame`].
    pub fn resolve_or_terminal(&self, elapsed: f64) -> ResolvedFrame<'_> {
        match self.resolve(elapsed) {
            Resolution::Scene(frame) => frame,
            Resolution::Finished => self.terminal_frame(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/timeline.rs"]
mod tests;
