use super::*;

#[test]
fn stepped_pacer_starts_at_now_and_advances_by_step() {
    let mut p = SteppedPacer::new(Duration::from_millis(100));
    assert_eq!(p.now(), Duration::ZERO);
    assert_eq!(p.next_frame(), Duration::ZERO);
    assert_eq!(p.next_frame(), Duration::from_millis(100));
    assert_eq!(p.now(), Duration::from_millis(200));
}

#[test]
fn stepped_pacer_from_hz_falls_back_on_bad_rates() {
    let mut p = SteppedPacer::from_hz(0.0);
    p.next_frame();
    let step = p.now();
    assert!((step.as_secs_f64() - 1.0 / 60.0).abs() < 1e-6);
}

#[test]
fn display_pacer_is_monotonic_and_waits() {
    let mut p = DisplayPacer::new(200.0);
    let a = p.next_frame();
    let b = p.next_frame();
    assert!(b > a);
    assert!(p.now() >= b);
}

#[test]
fn display_pacer_clamps_refresh_rate() {
    assert_eq!(DisplayPacer::new(f64::NAN).interval(), Duration::from_secs(1));
    assert_eq!(
        DisplayPacer::default().interval(),
        Duration::from_secs_f64(1.0 / 60.0)
    );
}
