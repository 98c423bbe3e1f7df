use super::*;
use crate::assets::resolver::MemoryResolver;
use crate::encode::capability::StaticCapabilities;
use crate::encode::encoder::MemoryEncoder;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::ErrorKind;
use crate::scene::model::SceneDescriptor;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([90, 120, 200, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn host(caps: StaticCapabilities) -> HostServices {
    HostServices {
        capabilities: Arc::new(caps),
        encoder: Arc::new(|| Box::new(MemoryEncoder::new(4)) as Box<dyn VideoEncoder>),
        pacer: Arc::new(|| Box::new(SteppedPacer::from_hz(20.0)) as Box<dyn FramePacer>),
        resolver: Arc::new(MemoryResolver::new().with("a.png", png(4, 4))),
    }
}

fn engine(caps: StaticCapabilities) -> SlideshowEngine {
    let storyboard = Storyboard::new(vec![SceneDescriptor::new("A", "a.png", 0.5)]).unwrap();
    let config = RenderConfig {
        width: 32,
        height: 18,
        fps: Fps::new(10, 1).unwrap(),
        total_duration: None,
    };
    SlideshowEngine::with_font_bytes(storyboard, config, CompositorStyle::default(), None, host(caps))
        .unwrap()
}

fn surface() -> Surface {
    Surface::new(Canvas {
        width: 32,
        height: 18,
    })
    .unwrap()
}

#[test]
fn claim_is_exclusive_and_released_on_drop() {
    let e = engine(StaticCapabilities::all());
    let first = e.claim("test").unwrap();
    let err = e.claim("test").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::State);
    assert!(err.to_string().contains("not ready"));
    drop(first);
    assert!(e.claim("test").is_ok());
}

#[test]
fn mount_rejects_mismatched_surfaces() {
    let e = engine(StaticCapabilities::all());
    let wrong = Surface::new(Canvas {
        width: 16,
        height: 18,
    })
    .unwrap();
    assert_eq!(
        e.mount_surface(wrong).unwrap_err().kind(),
        ErrorKind::Configuration
    );
    e.mount_surface(surface()).unwrap();
    assert!(e.unmount_surface().is_some());
    assert!(e.unmount_surface().is_none());
}

#[test]
fn stop_without_active_render_is_a_noop() {
    let e = engine(StaticCapabilities::all());
    assert!(!e.stop());
    assert!(!e.stop());
    assert_eq!(e.status(), RenderStatus::Idle);
}

#[test]
fn render_records_stats_for_the_last_run() {
    let e = engine(StaticCapabilities::all());
    e.mount_surface(surface()).unwrap();
    assert_eq!(e.last_stats(), None);
    let artifact = e.render().unwrap();
    let stats = e.last_stats().unwrap();
    // 0.5s @ 10 fps
    assert_eq!(stats.frames_captured, 5);
    assert_eq!(stats.stream_releases, 1);
    // 0.5s at a 20 Hz virtual clock: draws at 0.0..=0.45 plus the terminal frame
    assert_eq!(stats.frames_drawn, 11);
    assert_eq!(artifact.len(), 5 * 32 * 18 * 4);
    assert_eq!(e.status(), RenderStatus::Complete);
}

#[test]
fn capture_support_comes_from_the_host() {
    assert!(engine(StaticCapabilities::all()).capture_supported());
    assert!(!engine(StaticCapabilities::unsupported()).capture_supported());
}

#[test]
fn config_total_mismatch_fails_construction() {
    let storyboard = Storyboard::new(vec![SceneDescriptor::new("A", "a.png", 1.0)]).unwrap();
    let config = RenderConfig {
        total_duration: Some(2.0),
        ..RenderConfig::default()
    };
    let err = SlideshowEngine::with_font_bytes(
        storyboard,
        config,
        CompositorStyle::default(),
        None,
        host(StaticCapabilities::all()),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn begin_render_publishes_the_stop_token_with_the_claim() {
    let e = engine(StaticCapabilities::all());
    let (flight, token) = e.begin_render().unwrap();
    assert!(e.stop());
    assert!(token.is_cancelled());
    assert!(!e.stop());
    assert_eq!(
        e.begin_render().err().unwrap().kind(),
        ErrorKind::State
    );
    drop(flight);
}

struct StopOnFirstProgress(std::sync::OnceLock<std::sync::Weak<SlideshowEngine>>);

impl RenderObserver for StopOnFirstProgress {
    fn on_status(&self, _status: RenderStatus) {}

    fn on_progress(&self, _progress: f64) {
        if let Some(engine) = self.0.get().and_then(std::sync::Weak::upgrade) {
            engine.stop();
        }
    }

    fn on_error(&self, _message: &str) {}
}

#[test]
fn stop_during_a_draw_captures_nothing_more() {
    let observer = Arc::new(StopOnFirstProgress(std::sync::OnceLock::new()));
    let e = Arc::new(engine(StaticCapabilities::all()).with_observer(observer.clone()));
    observer.0.set(Arc::downgrade(&e)).unwrap();
    e.mount_surface(surface()).unwrap();

    let err = e.render().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    let stats = e.last_stats().unwrap();
    assert_eq!(stats.frames_drawn, 1);
    assert_eq!(stats.frames_captured, 0);
    assert_eq!(stats.stream_releases, 1);
    assert_eq!(e.status(), RenderStatus::Error);
}
