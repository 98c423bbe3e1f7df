use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        ReelError::unsupported("x")
            .to_string()
            .contains("unsupported capability:")
    );
    assert!(
        ReelError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(ReelError::state("x").to_string().contains("state error:"));
    assert!(
        ReelError::surface_unavailable("x")
            .to_string()
            .contains("surface unavailable:")
    );
}

#[test]
fn asset_load_names_the_reference() {
    let err = ReelError::asset_load("img/a.png", "bad magic");
    assert_eq!(err.kind(), ErrorKind::AssetLoad);
    let msg = err.to_string();
    assert!(msg.contains("img/a.png"));
    assert!(msg.contains("bad magic"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
