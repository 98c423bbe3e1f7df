use super::*;
use crate::foundation::core::Point;

#[test]
fn zoom_spans_one_to_max() {
    let z = ZoomMotion::default();
    assert_eq!(z.zoom_at(0.0), 1.0);
    assert!((z.zoom_at(1.0) - 1.06).abs() < 1e-12);

    let mut last = z.zoom_at(0.0);
    for i in 1..=200 {
        let v = z.zoom_at(f64::from(i) / 200.0);
        assert!(v > last, "zoom must be strictly increasing");
        last = v;
    }
}

#[test]
fn cover_scale_fills_both_axes() {
    // Wide image into a 16:9 frame is limited by height.
    let s = cover_scale(4000.0, 1000.0, 1280.0, 720.0);
    assert!((s - 0.72).abs() < 1e-12);
    assert!(4000.0 * s >= 1280.0);
    assert!(1000.0 * s >= 720.0);

    // Tall image is limited by width.
    let s = cover_scale(500.0, 2000.0, 1280.0, 720.0);
    assert!((s - 2.56).abs() < 1e-12);
}

#[test]
fn cover_transform_centers_the_image() {
    let a = cover_transform(200.0, 100.0, 64.0, 36.0, 1.0);
    let center = a * Point::new(100.0, 50.0);
    assert!((center.x - 32.0).abs() < 1e-9);
    assert!((center.y - 18.0).abs() < 1e-9);

    // Top-left corner lands at or beyond the frame origin.
    let tl = a * Point::new(0.0, 0.0);
    assert!(tl.x <= 1e-9 && tl.y <= 1e-9);
}

#[test]
fn fade_window_is_capped() {
    assert_eq!(fade_window(6.0), 0.75);
    assert!((fade_window(1.5) - 0.5).abs() < 1e-12);
}

#[test]
fn text_opacity_is_zero_at_boundaries_and_one_inside() {
    for duration in [0.3, 1.5, 6.0] {
        assert_eq!(text_opacity(0.0, duration), 0.0);
        assert_eq!(text_opacity(duration, duration), 0.0);
    }
    // duration > 2 * window => full opacity is reached.
    assert_eq!(text_opacity(3.0, 6.0), 1.0);
    assert!((text_opacity(0.375, 6.0) - 0.5).abs() < 1e-12);
    assert!((text_opacity(6.0 - 0.375, 6.0) - 0.5).abs() < 1e-12);
}

#[test]
fn consecutive_scenes_never_overlap_at_full_opacity() {
    // At a boundary the outgoing scene is at 0 and the incoming scene starts at 0.
    let out = text_opacity(6.0 - 1e-6, 6.0);
    let incoming = text_opacity(0.0, 6.0);
    assert!(out < 0.01);
    assert_eq!(incoming, 0.0);
}
