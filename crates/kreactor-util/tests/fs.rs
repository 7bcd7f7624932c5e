use kreactor_util::fs::{expand_tilde, find_ancestor_with, home_dir, read_to_string};

#[test]
fn test_find_ancestor_with_in_parent() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
    let nested = dir.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();

    let found = find_ancestor_with(&nested, "pom.xml").unwrap();
    assert_eq!(found, dir.path());
}

#[test]
fn test_find_ancestor_with_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(find_ancestor_with(dir.path(), "definitely-not-here.marker").is_none());
}

#[test]
fn test_expand_tilde() {
    assert_eq!(expand_tilde("~/.m2/repository"), home_dir().join(".m2/repository"));
    assert_eq!(expand_tilde("/opt/repo").to_str(), Some("/opt/repo"));
    assert_eq!(expand_tilde("~"), home_dir());
}

#[test]
fn test_read_to_string_error_mentions_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.xml");
    let err = read_to_string(&missing).unwrap_err();
    assert!(err.to_string().contains("missing.xml"), "got: {err}");
}
