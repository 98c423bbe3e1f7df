use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

const TOTAL_TOLERANCE_SECS: f64 = 1e-6;

/// Caller-supplied render configuration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Capture sampling rate.
    pub fps: Fps,
    /// Expected total duration in seconds. Derived from the scene list when `None`.
    pub total_duration: Option<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let canvas = Canvas::default();
        Self {
            width: canvas.width,
            height: canvas.height,
            fps: Fps::default(),
            total_duration: None,
        }
    }
}

impl RenderConfig {
    /// Canvas of this configuration.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Check dimensions and rate, and that any explicit total matches `scene_total`.
    pub fn validate(&self, scene_total: f64) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::configuration("width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::configuration(
                "width/height must be even (required for yuv420p output)",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(ReelError::configuration(format!(
                "width/height must be <= {}",
                u16::MAX
            )));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if let Some(total) = self.total_duration
            && (!total.is_finite() || (total - scene_total).abs() > TOTAL_TOLERANCE_SECS)
        {
            return Err(ReelError::configuration(format!(
                "total duration {total}s does not match the scene durations ({scene_total}s)"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
