use std::sync::Mutex;

use crate::foundation::error::{ReelError, ReelResult};

/// Engine status reported to observers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderStatus {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Scene images are being fetched and decoded.
    LoadingAssets,
    /// Frames are being drawn and recorded.
    Rendering,
    /// The last render produced an artifact.
    Complete,
    /// The last render failed.
    Error,
}

impl RenderStatus {
    /// Stable lowercase name (`idle`, `loading-assets`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingAssets => "loading-assets",
            Self::Rendering => "rendering",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Transition table.
    ///
    /// Any state may reset to `Idle` (a new render begins) or fail to `Error`. Otherwise a render
    /// moves `Idle -> LoadingAssets -> Rendering -> Complete`, skipping `LoadingAssets` when the
    /// asset cache is warm.
    pub fn can_transition_to(self, next: Self) -> bool {
        use RenderStatus::*;
        matches!(
            (self, next),
            (_, Idle)
                | (_, Error)
                | (Idle, LoadingAssets)
                | (Idle, Rendering)
                | (LoadingAssets, Rendering)
                | (Rendering, Complete)
        )
    }
}

impl std::fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current status guarded by the transition table.
#[derive(Debug, Default)]
pub(crate) struct StatusCell {
    current: Mutex<RenderStatus>,
}

impl StatusCell {
    pub(crate) fn get(&self) -> RenderStatus {
        match self.current.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Move to `next`. Returns `Ok(true)` if the status changed, `Ok(false)` for a self-loop.
    pub(crate) fn transition(&self, next: RenderStatus) -> ReelResult<bool> {
        let mut g = self
            .current
            .lock()
            .map_err(|_| ReelError::state("status lock poisoned"))?;
        if *g == next {
            return Ok(false);
        }
        if !g.can_transition_to(next) {
            return Err(ReelError::state(format!(
                "illegal status transition {} -> {}",
                *g, next
            )));
        }
        tracing::debug!(from = %*g, to = %next, "status");
        *g = next;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/status.rs"]
mod tests;
