use super::*;

#[test]
fn new_surface_is_transparent_and_sized() {
    let s = Surface::new(Canvas {
        width: 8,
        height: 4,
    })
    .unwrap();
    assert_eq!(s.canvas(), Canvas { width: 8, height: 4 });
    assert_eq!(s.data().len(), 8 * 4 * 4);
    assert!(s.data().iter().all(|&b| b == 0));

    let f = s.snapshot();
    assert!(f.premultiplied);
    assert_eq!(f.pixel(7, 3), [0, 0, 0, 0]);
}

#[test]
fn oversized_or_empty_surfaces_are_rejected() {
    assert!(
        Surface::new(Canvas {
            width: 70_000,
            height: 2
        })
        .is_err()
    );
    assert!(
        Surface::new(Canvas {
            width: 0,
            height: 2
        })
        .is_err()
    );
}
