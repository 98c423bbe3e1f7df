use super::*;

#[test]
fn endpoints_are_exact() {
    for ease in [Ease::Linear, Ease::OutCubic, Ease::InOutCubic] {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
    }
}

#[test]
fn in_out_cubic_matches_piecewise_formula() {
    assert!((Ease::InOutCubic.apply(0.25) - 4.0 * 0.25f64.powi(3)).abs() < 1e-12);
    assert!((Ease::InOutCubic.apply(0.5) - 0.5).abs() < 1e-12);
    assert!((Ease::InOutCubic.apply(0.75) - (1.0 - 0.5f64.powi(3) / 2.0)).abs() < 1e-12);
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::InOutCubic.apply(-3.0), 0.0);
    assert_eq!(Ease::OutCubic.apply(7.0), 1.0);
}

#[test]
fn in_out_cubic_is_strictly_increasing() {
    let mut last = Ease::InOutCubic.apply(0.0);
    for i in 1..=1000 {
        let v = Ease::InOutCubic.apply(f64::from(i) / 1000.0);
        assert!(v > last);
        last = v;
    }
}
