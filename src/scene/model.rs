use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Tolerance used when comparing advisory `start` offsets with cumulative durations.
const START_TOLERANCE_SECS: f64 = 1e-3;

/// One timed segment of the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDescriptor {
    /// Large heading.
    pub title: String,
    /// Secondary line, word-wrapped.
    #[serde(default)]
    pub subtitle: String,
    /// Body text, word-wrapped at a smaller size.
    #[serde(default)]
    pub description: String,
    /// Image reference (path or `file://` URI).
    pub image: String,
    /// Advisory start offset in seconds; display metadata only.
    #[serde(default)]
    pub start: f64,
    /// Scene length in seconds, must be > 0.
    pub duration: f64,
}

impl SceneDescriptor {
    /// Convenience constructor with empty subtitle/description and `start = 0`.
    pub fn new(title: impl Into<String>, image: impl Into<String>, duration: f64) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            description: String::new(),
            image: image.into(),
            start: 0.0,
            duration,
        }
    }

    /// Set the subtitle.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the advisory start offset.
    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum StoryboardDoc {
    Bare(Vec<SceneDescriptor>),
    Wrapped { scenes: Vec<SceneDescriptor> },
}

/// Validated, immutable, ordered scene list.
///
/// Cheap to clone; scenes are shared.
#[derive(Clone, Debug)]
pub struct Storyboard {
    scenes: Arc<[SceneDescriptor]>,
    total: f64,
}

impl Storyboard {
    /// Validate `scenes` and build a storyboard.
    pub fn new(scenes: Vec<SceneDescriptor>) -> ReelResult<Self> {
        if scenes.is_empty() {
            return Err(ReelError::configuration("scene list is empty"));
        }

        let mut cumulative = 0.0f64;
        for (i, scene) in scenes.iter().enumerate() {
            if !scene.duration.is_finite() || scene.duration <= 0.0 {
                return Err(ReelError::configuration(format!(
                    "scene {i} ('{}') duration must be finite and > 0, got {}",
                    scene.title, scene.duration
                )));
            }
            if scene.image.trim().is_empty() {
                return Err(ReelError::configuration(format!(
                    "scene {i} ('{}') has an empty image reference",
                    scene.title
                )));
            }
            if (scene.start - cumulative).abs() > START_TOLERANCE_SECS {
                tracing::warn!(
                    scene = i,
                    start = scene.start,
                    expected = cumulative,
                    "advisory scene start disagrees with cumulative durations; ignoring it"
                );
            }
            cumulative += scene.duration;
        }

        Ok(Self {
            scenes: scenes.into(),
            total: cumulative,
        })
    }

    /// Parse a storyboard from JSON: either a bare array of scenes or `{ "scenes": [...] }`.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let doc: StoryboardDoc = serde_json::from_str(s)
            .map_err(|e| ReelError::configuration(format!("storyboard json: {e}")))?;
        let scenes = match doc {
            StoryboardDoc::Bare(s) => s,
            StoryboardDoc::Wrapped { scenes } => scenes,
        };
        Self::new(scenes)
    }

    /// Read and parse a storyboard JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read storyboard '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Scenes in timeline order.
    pub fn scenes(&self) -> &[SceneDescriptor] {
        &self.scenes
    }

    /// Number of scenes (always >= 1).
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Always `false`; storyboards are validated non-empty.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Sum of scene durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.total
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
