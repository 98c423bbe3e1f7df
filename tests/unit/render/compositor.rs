use super::*;
use crate::foundation::error::ErrorKind;
use crate::scene::model::SceneDescriptor;

fn solid_image(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
    let bytes = px.iter().copied().cycle().take((w * h * 4) as usize).collect();
    PreparedImage::from_premul_rgba8(w, h, bytes).unwrap()
}

fn frame(scene: &SceneDescriptor, elapsed: f64, overall: f64) -> ResolvedFrame<'_> {
    ResolvedFrame {
        scene_index: 0,
        scene,
        scene_elapsed: elapsed,
        scene_progress: elapsed / scene.duration,
        overall_progress: overall,
    }
}

fn flat_style() -> CompositorStyle {
    CompositorStyle {
        adjust: ColorAdjust::IDENTITY,
        zoom: ZoomMotion {
            max_zoom: 1.0,
            ..ZoomMotion::default()
        },
        ..CompositorStyle::default()
    }
}

#[test]
fn draw_fully_overwrites_with_opaque_pixels() {
    let canvas = Canvas {
        width: 64,
        height: 36,
    };
    let mut surface = Surface::new(canvas).unwrap();
    let mut comp = FrameCompositor::with_font_bytes(canvas, CompositorStyle::default(), 6.0, None).unwrap();
    assert!(!comp.has_font());

    let scene = SceneDescriptor::new("A", "a.png", 6.0);
    let image = solid_image(4, 3, [200, 40, 40, 255]);
    comp.draw(&mut surface, &frame(&scene, 1.0, 1.0 / 6.0), &image)
        .unwrap();

    assert!(surface.data().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn scrim_darkens_the_lower_part_of_the_frame() {
    let canvas = Canvas {
        width: 64,
        height: 36,
    };
    let mut surface = Surface::new(canvas).unwrap();
    let mut comp = FrameCompositor::with_font_bytes(canvas, flat_style(), 6.0, None).unwrap();
    let scene = SceneDescriptor::new("A", "a.png", 6.0);
    let image = solid_image(8, 8, [128, 128, 128, 255]);
    comp.draw(&mut surface, &frame(&scene, 2.0, 0.3), &image)
        .unwrap();

    let f = surface.snapshot();
    let top = f.pixel(32, 8);
    let bottom = f.pixel(32, 30);
    assert!(top[0].abs_diff(128) <= 2, "top={top:?}");
    assert!(bottom[0] < top[0], "top={top:?} bottom={bottom:?}");
}

#[test]
fn progress_fill_tracks_overall_progress() {
    let canvas = Canvas {
        width: 320,
        height: 180,
    };
    let mut surface = Surface::new(canvas).unwrap();
    let mut comp = FrameCompositor::with_font_bytes(canvas, flat_style(), 10.0, None).unwrap();
    let scene = SceneDescriptor::new("A", "a.png", 10.0);
    let image = solid_image(8, 8, [128, 128, 128, 255]);

    comp.draw(&mut surface, &frame(&scene, 5.0, 0.5), &image)
        .unwrap();
    let f = surface.snapshot();
    // bar spans x in [18, 302] at y = 169 for this canvas
    let filled = f.pixel(100, 169);
    let unfilled = f.pixel(250, 169);
    assert!(filled[0] > 200, "filled={filled:?}");
    assert!(unfilled[0] < 150, "unfilled={unfilled:?}");

    comp.draw(&mut surface, &frame(&scene, 10.0, 1.0), &image)
        .unwrap();
    let f = surface.snapshot();
    assert!(f.pixel(250, 169)[0] > 200);
}

#[test]
fn surface_size_mismatch_is_surface_unavailable() {
    let comp_canvas = Canvas {
        width: 64,
        height: 36,
    };
    let mut comp = FrameCompositor::with_font_bytes(comp_canvas, flat_style(), 6.0, None).unwrap();
    let mut surface = Surface::new(Canvas {
        width: 32,
        height: 18,
    })
    .unwrap();
    let scene = SceneDescriptor::new("A", "a.png", 6.0);
    let err = comp
        .draw(&mut surface, &frame(&scene, 0.0, 0.0), &solid_image(2, 2, [0, 0, 0, 255]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SurfaceUnavailable);
}

#[test]
fn oversized_canvas_is_rejected() {
    let r = FrameCompositor::with_font_bytes(
        Canvas {
            width: 70_000,
            height: 10,
        },
        CompositorStyle::default(),
        1.0,
        None,
    );
    assert!(r.is_err());
}

#[test]
fn border_strips_sit_inside_the_inset() {
    let rects = border_rects(100.0, 50.0, 10.0, 2.0);
    assert_eq!(rects[0], Rect::new(10.0, 10.0, 90.0, 12.0));
    assert_eq!(rects[1], Rect::new(10.0, 38.0, 90.0, 40.0));
    assert_eq!(rects[2], Rect::new(10.0, 12.0, 12.0, 38.0));
    assert_eq!(rects[3], Rect::new(88.0, 12.0, 90.0, 38.0));
}

#[test]
fn progress_rects_clamp_and_scale() {
    let (track, half) = progress_rects(1280.0, 1.0, 0.5);
    assert_eq!(track.x0, 72.0);
    assert_eq!(track.x1, 1208.0);
    assert!((half.x1 - 640.0).abs() < 1e-9);

    let (_, over) = progress_rects(1280.0, 1.0, 3.0);
    assert_eq!(over.x1, track.x1);
    let (_, under) = progress_rects(1280.0, 1.0, -1.0);
    assert_eq!(under.width(), 0.0);
}

#[test]
fn readout_formats_elapsed_over_total() {
    assert_eq!(readout_label(0.0, 30.0), "0.0s / 30.0s");
    assert_eq!(readout_label(0.41, 30.0), "12.3s / 30.0s");
    assert_eq!(readout_label(1.0, 30.0), "30.0s / 30.0s");
}
