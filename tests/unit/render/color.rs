use super::*;

#[test]
fn identity_adjust_is_a_copy() {
    let src = vec![10u8, 20, 30, 255, 5, 5, 5, 128];
    assert_eq!(ColorAdjust::IDENTITY.apply_premul(&src), src);
}

#[test]
fn grey_stays_grey_and_gets_brighter() {
    let src = vec![100u8, 100, 100, 255];
    let out = ColorAdjust::default().apply_premul(&src);
    assert_eq!(out[0], out[1]);
    assert_eq!(out[1], out[2]);
    assert!(out[0] > 100);
    assert_eq!(out[3], 255);
}

#[test]
fn saturation_pushes_channels_apart() {
    let src = vec![180u8, 120, 100, 255];
    let adjust = ColorAdjust {
        brightness: 1.0,
        saturation: 1.5,
    };
    let out = adjust.apply_premul(&src);
    assert!(out[0] > 180);
    assert!(out[2] < 100);
}

#[test]
fn alpha_is_preserved_through_the_matrix() {
    let src = vec![64u8, 32, 16, 128];
    let out = ColorAdjust::default().apply_premul(&src);
    assert_eq!(out[3], 128);
    assert!(out[0] <= 128 && out[1] <= 128 && out[2] <= 128);
}

#[test]
fn scrim_is_nearly_clear_at_top_and_dense_at_bottom() {
    let scrim = Scrim::default();
    assert!(scrim.alpha_at(0.0) < 0.05);
    assert!(scrim.alpha_at(1.0) > 0.8);
    let mut last = scrim.alpha_at(0.0);
    for i in 1..=100 {
        let a = scrim.alpha_at(i as f32 / 100.0);
        assert!(a >= last);
        last = a;
    }
}

#[test]
fn scrim_bytes_are_premultiplied_black() {
    let bytes = Scrim::default().premul_bytes(3, 5);
    assert_eq!(bytes.len(), 3 * 5 * 4);
    for px in bytes.chunks_exact(4) {
        assert_eq!(&px[..3], &[0, 0, 0]);
    }
    assert!(bytes[(4 * 3) * 4 + 3] > bytes[3]);
}

#[test]
fn pixmap_rejects_wrong_length() {
    assert!(pixmap_from_premul_bytes(&[0; 16], 2, 2).is_ok());
    assert!(pixmap_from_premul_bytes(&[0; 12], 2, 2).is_err());
}

#[test]
fn flatten_fills_partial_coverage_from_background() {
    let mut data = vec![
        226, 50, 50, 253, // near-opaque edge pixel
        0, 0, 0, 0, // uncovered
        10, 20, 30, 255,
    ];
    flatten_over_in_place(&mut data, crate::foundation::core::Rgba8::new(100, 200, 50, 255));
    assert!(data.chunks_exact(4).all(|px| px[3] == 255));
    assert_eq!(&data[4..8], &[100, 200, 50, 255]);
    assert_eq!(&data[8..12], &[10, 20, 30, 255]);
    assert_eq!(data[0], 226 + 1);
}

#[test]
fn premul_over_opaque_saturates_channels() {
    assert_eq!(premul_over_opaque([255, 0, 0, 128], [255, 255, 255]), [255, 127, 127, 255]);
}
