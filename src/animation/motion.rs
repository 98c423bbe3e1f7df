//! Per-scene motion envelopes: slow zoom, cover-fit placement and text fades.

use crate::animation::ease::Ease;
use crate::foundation::core::{Affine, Vec2};
use crate::foundation::math::lerp;

/// Upper bound of a text fade ramp in seconds.
pub const MAX_FADE_SECS: f64 = 0.75;

/// Slow zoom-in applied over each scene.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ZoomMotion {
    /// Zoom factor reached at scene progress 1.
    pub max_zoom: f64,
    /// Easing applied to scene progress before interpolating.
    pub ease: Ease,
}

impl Default for ZoomMotion {
    fn default() -> Self {
        Self {
            max_zoom: 1.06,
            ease: Ease::InOutCubic,
        }
    }
}

impl ZoomMotion {
    /// Zoom factor at `scene_progress`: `1.0` at 0, `max_zoom` at 1.
    pub fn zoom_at(self, scene_progress: f64) -> f64 {
        lerp(1.0, self.max_zoom, self.ease.apply(scene_progress))
    }
}

/// Scale that makes an `image` fully cover `frame`, cropping the excess.
pub fn cover_scale(image_w: f64, image_h: f64, frame_w: f64, frame_h: f64) -> f64 {
    if image_w <= 0.0 || image_h <= 0.0 {
        return 1.0;
    }
    (frame_w / image_w).max(frame_h / image_h)
}

/// Image-space to frame-space transform: cover-fit scaled by `zoom`, centered.
pub fn cover_transform(image_w: f64, image_h: f64, frame_w: f64, frame_h: f64, zoom: f64) -> Affine {
    let scale = cover_scale(image_w, image_h, frame_w, frame_h) * zoom;
    Affine::translate(Vec2::new(frame_w * 0.5, frame_h * 0.5))
        * Affine::scale(scale)
        * Affine::translate(Vec2::new(-image_w * 0.5, -image_h * 0.5))
}

/// Length of the fade-in and fade-out ramps for a scene of `duration` seconds.
pub fn fade_window(duration: f64) -> f64 {
    MAX_FADE_SECS.min(duration / 3.0)
}

/// Text opacity at `scene_elapsed` seconds into a scene lasting `duration` seconds.
///
/// Minimum of a linear fade-in from the scene start and a linear fade-out into the scene end,
/// so it is `0` at both boundaries.
pub fn text_opacity(scene_elapsed: f64, duration: f64) -> f64 {
    let window = fade_window(duration);
    if window <= 0.0 {
        return 0.0;
    }
    let fade_in = Ease::Linear.apply(scene_elapsed / window);
    let fade_out = Ease::Linear.apply((duration - scene_elapsed) / window);
    fade_in.min(fade_out)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/motion.rs"]
mod tests;
