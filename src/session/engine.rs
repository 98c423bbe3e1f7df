//! Session engine: one storyboard, one drawing surface, any number of sequential renders.
//!
//! A render resolves assets, draws frames on the pacer's cadence, samples the surface into the
//! encoder at the configured rate, and resolves to a [`CaptureArtifact`]. Only one render may be
//! in flight; [`SlideshowEngine::stop`] cancels it from any thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::assets::cache::AssetCache;
use crate::assets::resolver::{AssetResolver, FsResolver};
use crate::encode::artifact::CaptureArtifact;
use crate::encode::capability::{CaptureCapabilities, FfmpegCapabilities};
use crate::encode::encoder::{EncoderConfig, VideoEncoder};
use crate::encode::ffmpeg::FfmpegEncoder;
use crate::encode::format::select_format;
use crate::encode::recorder::Recorder;
use crate::encode::stream::SurfaceStream;
use crate::eval::timeline::{Resolution, Timeline};
use crate::foundation::error::{ReelError, ReelResult};
use crate::playback::cancel::CancelToken;
use crate::playback::pacer::{DisplayPacer, FramePacer, SteppedPacer};
use crate::playback::scheduler::{Flow, RunOutcome, Scheduler};
use crate::render::compositor::{CompositorStyle, FrameCompositor};
use crate::render::surface::{FrameRGBA, Surface};
use crate::scene::model::Storyboard;
use crate::session::config::RenderConfig;
use crate::session::observer::{RenderObserver, TracingObserver};
use crate::session::status::{RenderStatus, StatusCell};

/// Creates a fresh encoder for each render.
pub type EncoderFactory = Arc<dyn Fn() -> Box<dyn VideoEncoder> + Send + Sync>;

/// Creates a fresh frame pacer for each render.
pub type PacerFactory = Arc<dyn Fn() -> Box<dyn FramePacer> + Send + Sync>;

/// Host facilities injected into the engine.
#[derive(Clone)]
pub struct HostServices {
    /// Capture/encoding capability provider.
    pub capabilities: Arc<dyn CaptureCapabilities>,
    /// Encoder constructor.
    pub encoder: EncoderFactory,
    /// Frame pacer constructor.
    pub pacer: PacerFactory,
    /// Scene image resolver.
    pub resolver: Arc<dyn AssetResolver>,
}

impl HostServices {
    /// System `ffmpeg`, a 60 Hz display pacer, and files under `assets_root`.
    ///
    /// Probes ffmpeg once, here.
    pub fn system(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            capabilities: Arc::new(FfmpegCapabilities::probe()),
            encoder: Arc::new(|| Box::new(FfmpegEncoder::new()) as Box<dyn VideoEncoder>),
            pacer: Arc::new(|| Box::new(DisplayPacer::default()) as Box<dyn FramePacer>),
            resolver: Arc::new(FsResolver::new(assets_root)),
        }
    }

    /// Replace the capability provider.
    pub fn with_capabilities(mut self, capabilities: Arc<dyn CaptureCapabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Replace the encoder factory.
    pub fn with_encoder<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn VideoEncoder> + Send + Sync + 'static,
    {
        self.encoder = Arc::new(factory);
        self
    }

    /// Replace the pacer factory.
    pub fn with_pacer<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn FramePacer> + Send + Sync + 'static,
    {
        self.pacer = Arc::new(factory);
        self
    }

    /// Draw as fast as possible on a virtual clock stepping at `hz`.
    pub fn with_stepped_pacer(self, hz: f64) -> Self {
        self.with_pacer(move || Box::new(SteppedPacer::from_hz(hz)) as Box<dyn FramePacer>)
    }

    /// Replace the asset resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}

/// Counters of the most recent render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Compositor draws, including the terminal frame.
    pub frames_drawn: u64,
    /// Frames handed to the encoder.
    pub frames_captured: u64,
    /// Non-empty encoder segments received.
    pub segments: u64,
    /// Effective capture stream releases (1 once a recording started, 0 otherwise).
    pub stream_releases: u32,
}

struct EngineState {
    surface: Option<Surface>,
    cache: AssetCache,
    compositor: FrameCompositor,
}

/// Clears the in-flight flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Renders a storyboard to video through injected host services.
pub struct SlideshowEngine {
    timeline: Timeline,
    config: RenderConfig,
    host: HostServices,
    observer: Arc<dyn RenderObserver>,
    status: StatusCell,
    in_flight: AtomicBool,
    active: Mutex<Option<CancelToken>>,
    last_stats: Mutex<Option<RenderStats>>,
    state: Mutex<EngineState>,
}

impl SlideshowEngine {
    /// Validate `config` against `storyboard` and prepare the compositor.
    pub fn new(
        storyboard: Storyboard,
        config: RenderConfig,
        style: CompositorStyle,
        host: HostServices,
    ) -> ReelResult<Self> {
        config.validate(storyboard.total_duration())?;
        let compositor = FrameCompositor::new(config.canvas(), style, storyboard.total_duration())?;
        Ok(Self::from_parts(storyboard, config, compositor, host))
    }

    /// Like [`SlideshowEngine::new`] with font bytes supplied directly.
    pub fn with_font_bytes(
        storyboard: Storyboard,
        config: RenderConfig,
        style: CompositorStyle,
        font: Option<Vec<u8>>,
        host: HostServices,
    ) -> ReelResult<Self> {
        config.validate(storyboard.total_duration())?;
        let compositor = FrameCompositor::with_font_bytes(
            config.canvas(),
            style,
            storyboard.total_duration(),
            font,
        )?;
        Ok(Self::from_parts(storyboard, config, compositor, host))
    }

    fn from_parts(
        storyboard: Storyboard,
        config: RenderConfig,
        compositor: FrameCompositor,
        host: HostServices,
    ) -> Self {
        Self {
            timeline: Timeline::new(storyboard),
            config,
            host,
            observer: Arc::new(TracingObserver::default()),
            status: StatusCell::default(),
            in_flight: AtomicBool::new(false),
            active: Mutex::new(None),
            last_stats: Mutex::new(None),
            state: Mutex::new(EngineState {
                surface: None,
                cache: AssetCache::new(),
                compositor,
            }),
        }
    }

    /// Replace the observer (default: [`TracingObserver`]).
    pub fn with_observer(mut self, observer: Arc<dyn RenderObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Resolved timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Render configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Current status.
    pub fn status(&self) -> RenderStatus {
        self.status.get()
    }

    /// Whether the host can capture at all. Callers should disable rendering when `false`.
    pub fn capture_supported(&self) -> bool {
        self.host.capabilities.capture_supported()
    }

    /// Counters of the most recent render, if any ran.
    pub fn last_stats(&self) -> Option<RenderStats> {
        match self.last_stats.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Attach the drawing surface. Its size must match the configuration.
    pub fn mount_surface(&self, surface: Surface) -> ReelResult<()> {
        if surface.canvas() != self.config.canvas() {
            return Err(ReelError::configuration(format!(
                "surface is {}x{}, engine renders {}x{}",
                surface.canvas().width,
                surface.canvas().height,
                self.config.width,
                self.config.height
            )));
        }
        let _flight = self.claim("cannot mount a surface")?;
        self.lock_state()?.surface = Some(surface);
        Ok(())
    }

    /// Teardown: cancel any in-flight render and detach the surface.
    pub fn unmount_surface(&self) -> Option<Surface> {
        self.stop();
        // Waits for a cancelled render to unwind.
        self.lock_state().ok()?.surface.take()
    }

    /// Cancel the in-flight render, if any. Safe to call repeatedly and from any thread.
    ///
    /// Returns `true` only for the call that actually cancelled something.
    pub fn stop(&self) -> bool {
        let guard = match self.active.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let cancelled = guard.as_ref().is_some_and(CancelToken::cancel);
        if cancelled {
            tracing::info!("render stop requested");
        }
        cancelled
    }

    /// Render the whole storyboard and return the encoded artifact.
    ///
    /// Blocks until the encoder has finalized. Failures set status `error`, notify the observer
    /// and are returned; a concurrent call fails with [`ReelError::State`] and leaves the
    /// in-flight render untouched.
    #[tracing::instrument(level = "info", skip(self), fields(scenes = self.timeline.storyboard().len(), total = self.timeline.total_duration()))]
    pub fn render(&self) -> ReelResult<CaptureArtifact> {
        let (_flight, token) = match self.begin_render() {
            Ok(claimed) => claimed,
            Err(e) => {
                self.observer.on_error(&e.to_string());
                return Err(e);
            }
        };

        let mut stats = RenderStats::default();
        let result = self.render_claimed(token, &mut stats);
        self.set_last_stats(stats);
        self.clear_active();

        match result {
            Ok(artifact) => {
                tracing::info!(
                    bytes = artifact.len(),
                    mime = artifact.mime_type(),
                    frames = stats.frames_captured,
                    "render complete"
                );
                Ok(artifact)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Compose a single frame at `at_seconds` into the mounted surface and return a snapshot.
    ///
    /// Positions at or past the total duration yield the terminal frame. Status is not changed.
    pub fn render_still(&self, at_seconds: f64) -> ReelResult<FrameRGBA> {
        let result = (|| -> ReelResult<FrameRGBA> {
            let _flight = self.claim("render in progress")?;
            let mut state = self.lock_state()?;
            let EngineState {
                surface,
                cache,
                compositor,
            } = &mut *state;
            let surface = surface
                .as_mut()
                .ok_or_else(|| ReelError::surface_unavailable("no surface mounted"))?;
            let images = cache.ensure_loaded(self.timeline.storyboard(), &*self.host.resolver)?;
            let frame = self.timeline.resolve_or_terminal(at_seconds);
            compositor.draw(surface, &frame, &images[frame.scene_index])?;
            Ok(surface.snapshot())
        })();
        if let Err(e) = &result {
            self.observer.on_error(&e.to_string());
        }
        result
    }

    fn render_claimed(
        &self,
        token: CancelToken,
        stats: &mut RenderStats,
    ) -> ReelResult<CaptureArtifact> {
        let caps = &*self.host.capabilities;
        if !caps.capture_supported() {
            return Err(ReelError::unsupported(
                "surface capture is not available on this host",
            ));
        }

        let mut state = self.lock_state()?;
        let EngineState {
            surface,
            cache,
            compositor,
        } = &mut *state;
        let surface = surface.as_mut().ok_or_else(|| {
            ReelError::surface_unavailable("no surface mounted; mount one before rendering")
        })?;

        self.set_status(RenderStatus::Idle)?;
        if !cache.is_warm() {
            self.set_status(RenderStatus::LoadingAssets)?;
        }
        let images = cache.ensure_loaded(self.timeline.storyboard(), &*self.host.resolver)?;
        if token.is_cancelled() {
            return Err(ReelError::Cancelled);
        }

        let format = select_format(caps);
        let enc_cfg = EncoderConfig {
            width: self.config.width,
            height: self.config.height,
            fps: self.config.fps,
            format,
            background: compositor.background(),
        };
        let mut recorder = Recorder::start((self.host.encoder)(), &enc_cfg)?;
        let total = self.timeline.total_duration();
        let mut stream = SurfaceStream::new(self.config.fps, total);

        let cancel = token.clone();
        let mut scheduler = Scheduler::with_token((self.host.pacer)(), token);

        if let Err(e) = self.set_status(RenderStatus::Rendering) {
            recorder.abort();
            stream.release();
            return Err(e);
        }
        tracing::info!(%format, ticks = stream.total_ticks(), "recording");

        let mut last_progress = 0.0f64;
        let outcome = scheduler.run(|elapsed| {
            recorder.pump()?;
            match self.timeline.resolve(elapsed) {
                Resolution::Scene(frame) => {
                    if cancel.is_cancelled() {
                        return Err(ReelError::Cancelled);
                    }
                    compositor.draw(surface, &frame, &images[frame.scene_index])?;
                    stats.frames_drawn += 1;
                    last_progress = last_progress.max(frame.overall_progress.clamp(0.0, 1.0));
                    self.observer.on_progress(last_progress);
                    // stop() may land while drawing; nothing is captured after it returns
                    if cancel.is_cancelled() {
                        return Err(ReelError::Cancelled);
                    }
                    if let Some(captured) = stream.capture(surface, elapsed) {
                        recorder.push(&captured)?;
                    }
                    recorder.pump()?;
                    Ok(Flow::Continue)
                }
                Resolution::Finished => {
                    let frame = self.timeline.terminal_frame();
                    compositor.draw(surface, &frame, &images[frame.scene_index])?;
                    stats.frames_drawn += 1;
                    if cancel.is_cancelled() {
                        return Err(ReelError::Cancelled);
                    }
                    if let Some(captured) = stream.capture(surface, elapsed) {
                        recorder.push(&captured)?;
                    }
                    self.observer.on_progress(1.0);
                    Ok(Flow::Done)
                }
            }
        });
        scheduler.stop();
        stats.frames_captured = recorder.frames_pushed();
        stats.segments = recorder.segment_count() as u64;

        match outcome {
            Ok(RunOutcome::Completed { frames }) => {
                tracing::debug!(frames, "scheduler completed");
            }
            Ok(RunOutcome::Cancelled { frames }) => {
                tracing::info!(frames, "render cancelled");
                stream.release();
                stats.stream_releases = stream.releases();
                recorder.abort();
                return Err(ReelError::Cancelled);
            }
            Err(e) => {
                stream.release();
                stats.stream_releases = stream.releases();
                recorder.abort();
                return Err(e);
            }
        }

        self.set_status(RenderStatus::Complete)?;
        let finalized = recorder.finalize();
        stream.release();
        stats.stream_releases = stream.releases();
        let finalized = finalized?;
        stats.segments = finalized.segments.len() as u64;
        Ok(CaptureArtifact::from_segments(
            finalized.segments,
            finalized.mime_type,
        ))
    }

    fn claim(&self, what: &str) -> ReelResult<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ReelError::state(format!("{what}: engine is not ready")))?;
        Ok(InFlight(&self.in_flight))
    }

    fn lock_state(&self) -> ReelResult<MutexGuard<'_, EngineState>> {
        self.state
            .lock()
            .map_err(|_| ReelError::state("engine state poisoned by an earlier panic"))
    }

    fn set_status(&self, next: RenderStatus) -> ReelResult<()> {
        if self.status.transition(next)? {
            self.observer.on_status(next);
        }
        Ok(())
    }

    fn fail(&self, e: &ReelError) {
        tracing::warn!(error = %e, kind = ?e.kind(), "render failed");
        if let Ok(true) = self.status.transition(RenderStatus::Error) {
            self.observer.on_status(RenderStatus::Error);
        }
        self.observer.on_error(&e.to_string());
    }

    /// Claim the engine and publish a fresh stop token under the same lock `stop()` takes.
    fn begin_render(&self) -> ReelResult<(InFlight<'_>, CancelToken)> {
        let mut active = match self.active.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let flight = self.claim("render already in progress")?;
        let token = CancelToken::new();
        *active = Some(token.clone());
        Ok((flight, token))
    }

    fn clear_active(&self) {
        match self.active.lock() {
            Ok(mut g) => *g = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    fn set_last_stats(&self, stats: RenderStats) {
        match self.last_stats.lock() {
            Ok(mut g) => *g = Some(stats),
            Err(poisoned) => *poisoned.into_inner() = Some(stats),
        }
    }
}

impl std::fmt::Debug for SlideshowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideshowEngine")
            .field("config", &self.config)
            .field("status", &self.status.get())
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;
