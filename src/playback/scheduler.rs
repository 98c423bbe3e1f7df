use std::time::Duration;

use crate::foundation::error::ReelResult;
use crate::playback::cancel::CancelToken;
use crate::playback::pacer::FramePacer;

/// What the frame callback wants the scheduler to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Request another frame.
    Continue,
    /// Stop requesting frames; the run completed.
    Done,
}

/// How a scheduler run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The callback returned [`Flow::Done`].
    Completed {
        /// Number of callbacks invoked, including the final one.
        frames: u64,
    },
    /// The cancel token was set; no callback ran after it was observed.
    Cancelled {
        /// Number of callbacks invoked before cancellation.
        frames: u64,
    },
}

/// Cooperative frame loop driven by a [`FramePacer`].
///
/// Each callback receives the elapsed seconds since the run started. The cancel token is checked
/// after every wait and before every callback, so a cancelled run never fires a stale callback.
pub struct Scheduler {
    pacer: Box<dyn FramePacer>,
    cancel: CancelToken,
}

impl Scheduler {
    /// Scheduler over `pacer` with a fresh cancel token.
    pub fn new(pacer: Box<dyn FramePacer>) -> Self {
        Self::with_token(pacer, CancelToken::new())
    }

    /// Scheduler over `pacer` observing an existing `cancel` token.
    pub fn with_token(pacer: Box<dyn FramePacer>, cancel: CancelToken) -> Self {
        Self { pacer, cancel }
    }

    /// Token that stops this scheduler when cancelled.
    pub fn token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Cancel any pending frame request. Idempotent; returns `true` on the first effective call.
    pub fn stop(&self) -> bool {
        self.cancel.cancel()
    }

    /// Whether [`Scheduler::stop`] has been called (directly or through a token clone).
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run frames until the callback returns [`Flow::Done`], the callback errors, or the token is
    /// cancelled.
    pub fn run<F>(&mut self, mut on_frame: F) -> ReelResult<RunOutcome>
    where
        F: FnMut(f64) -> ReelResult<Flow>,
    {
        let start = self.pacer.now();
        let mut frames = 0u64;
        loop {
            if self.cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled { frames });
            }
            let t = self.pacer.next_frame();
            if self.cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled { frames });
            }
            let elapsed = t.checked_sub(start).unwrap_or(Duration::ZERO).as_secs_f64();
            frames += 1;
            if on_frame(elapsed)? == Flow::Done {
                return Ok(RunOutcome::Completed { frames });
            }
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scheduler.rs"]
mod tests;
