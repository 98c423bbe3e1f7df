//! slidereel renders a timed sequence of image scenes into a cinematic slideshow video.
//!
//! Each scene contributes an image, a title, an optional subtitle and description, and a
//! duration. Frames are composed on a CPU rasterizer (slow zoom, color boost, scrim, fading text,
//! progress bar) on the cadence of a frame pacer, while a capture stream samples the surface at
//! the configured frame rate into an encoder. The public API is session-oriented:
//!
//! - Load and validate a [`Storyboard`]
//! - Create a [`SlideshowEngine`] with a [`RenderConfig`] and [`HostServices`]
//! - Mount a [`Surface`], then [`SlideshowEngine::render`] to get a [`CaptureArtifact`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod encode;
mod eval;
mod foundation;
mod playback;
mod render;
mod scene;
mod session;

pub use crate::foundation::core::{Affine, Canvas, Fps, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{ErrorKind, ReelError, ReelResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::motion::{
    MAX_FADE_SECS, ZoomMotion, cover_scale, cover_transform, fade_window, text_opacity,
};
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::resolver::{AssetResolver, FsResolver, MemoryResolver};
pub use crate::encode::artifact::CaptureArtifact;
pub use crate::encode::capability::{CaptureCapabilities, FfmpegCapabilities, StaticCapabilities};
pub use crate::encode::encoder::{
    EncoderConfig, EncoderEvent, MemoryEncoder, RecorderState, VideoEncoder,
};
pub use crate::encode::ffmpeg::{FfmpegEncoder, is_ffmpeg_on_path};
pub use crate::encode::format::{OutputFormat, select_format};
pub use crate::encode::stream::{CapturedFrame, SurfaceStream};
pub use crate::eval::timeline::{Resolution, ResolvedFrame, Timeline};
pub use crate::playback::cancel::CancelToken;
pub use crate::playback::pacer::{DisplayPacer, FramePacer, SteppedPacer};
pub use crate::playback::scheduler::{Flow, RunOutcome, Scheduler};
pub use crate::render::color::{ColorAdjust, Scrim};
pub use crate::render::compositor::{CompositorStyle, FrameCompositor};
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::render::text::wrap_words;
pub use crate::scene::model::{SceneDescriptor, Storyboard};
pub use crate::session::config::RenderConfig;
pub use crate::session::engine::{
    EncoderFactory, HostServices, PacerFactory, RenderStats, SlideshowEngine,
};
pub use crate::session::observer::{
    ChannelObserver, NoopObserver, RenderEvent, RenderObserver, TracingObserver,
};
pub use crate::session::status::RenderStatus;
