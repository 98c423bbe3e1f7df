use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn default_is_720p30() {
    let c = RenderConfig::default();
    assert_eq!((c.width, c.height), (1280, 720));
    assert_eq!(c.fps, Fps { num: 30, den: 1 });
    assert_eq!(c.total_duration, None);
    c.validate(30.0).unwrap();
}

#[test]
fn bad_dimensions_are_configuration_errors() {
    for (w, h) in [(0, 720), (1281, 720), (70_000, 720)] {
        let c = RenderConfig {
            width: w,
            height: h,
            ..RenderConfig::default()
        };
        assert_eq!(c.validate(1.0).unwrap_err().kind(), ErrorKind::Configuration, "{w}x{h}");
    }
}

#[test]
fn zero_fps_is_rejected() {
    let c = RenderConfig {
        fps: Fps { num: 0, den: 1 },
        ..RenderConfig::default()
    };
    assert!(c.validate(1.0).is_err());
}

#[test]
fn explicit_total_must_match_scene_sum() {
    let c = RenderConfig {
        total_duration: Some(30.0),
        ..RenderConfig::default()
    };
    c.validate(30.0).unwrap();
    assert!(c.validate(29.0).is_err());
    let nan = RenderConfig {
        total_duration: Some(f64::NAN),
        ..RenderConfig::default()
    };
    assert!(nan.validate(30.0).is_err());
}

#[test]
fn partial_json_fills_defaults() {
    let c: RenderConfig = serde_json::from_str(r#"{ "width": 640, "height": 360 }"#).unwrap();
    assert_eq!(c.canvas(), Canvas { width: 640, height: 360 });
    assert_eq!(c.fps, Fps::default());
}
