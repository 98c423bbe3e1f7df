use super::*;

#[test]
fn fs_resolver_joins_relative_and_strips_file_scheme() {
    let r = FsResolver::new("/data/show");
    assert_eq!(
        r.path_for("img/a.png").unwrap(),
        PathBuf::from("/data/show/img/a.png")
    );
    assert_eq!(
        r.path_for("file:///abs/b.jpg").unwrap(),
        PathBuf::from("/abs/b.jpg")
    );
    assert_eq!(r.path_for("/abs/c.png").unwrap(), PathBuf::from("/abs/c.png"));
}

#[test]
fn fs_resolver_rejects_foreign_schemes_and_empty() {
    let r = FsResolver::new(".");
    assert!(r.path_for("https://example.com/a.png").is_err());
    assert!(r.path_for("file://").is_err());
}

#[test]
fn fs_resolver_reads_files() {
    let dir = std::env::temp_dir().join(format!("slidereel-resolver-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("x.bin"), b"abc").unwrap();

    let r = FsResolver::new(&dir);
    assert_eq!(r.fetch("x.bin").unwrap(), b"abc");
    let err = r.fetch("missing.bin").unwrap_err();
    assert!(format!("{err:#}").contains("missing.bin"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn memory_resolver_lookup() {
    let r = MemoryResolver::new().with("a", vec![1, 2, 3]);
    assert_eq!(r.fetch("a").unwrap(), vec![1, 2, 3]);
    assert!(r.fetch("b").is_err());
}
