use super::*;

use std::{
    fs::{File, write},
    time::{Duration, UNIX_EPOCH},
};

fn subject(dir: &Path, name: &str, secs: u64) -> PathBuf {
    let path = dir.join(name);
    write(&path, b"image bytes").expect("write subject");
    set_mtime(&path, secs);
    path
}

fn set_mtime(path: &Path, secs: u64) {
    File::options()
        .write(true)
        .open(path)
        .expect("open subject")
        .set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .expect("set mtime");
}

#[test]
fn unmarked_file_is_not_marked() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), "a.jpg", 1_000);
    let store = SidecarMarkStore::default();

    assert!(store.can_mark(&path));
    assert!(!store.is_marked(&path));
    assert_eq!(store.recorded(&path), None);
}

#[test]
fn mark_writes_sidecar_with_fingerprint() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), "a.jpg", 1_000);
    let store = SidecarMarkStore::default();

    store.mark(&path).expect("mark");

    let sidecar = tmp.path().join("a.jpg.processed");
    assert_eq!(store.mark_path(&path), sidecar);
    assert_eq!(
        std::fs::read_to_string(&sidecar).expect("read sidecar"),
        "1000000000000\n"
    );
    assert!(store.is_marked(&path));
}

#[test]
fn modification_invalidates_mark_even_when_reverted() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), "a.jpg", 1_000);
    let store = SidecarMarkStore::default();
    store.mark(&path).expect("mark");

    set_mtime(&path, 2_000);
    assert!(!store.is_marked(&path), "newer content must not be trusted");

    write(&path, b"image bytes").expect("rewrite same bytes");
    set_mtime(&path, 3_000);
    assert!(!store.is_marked(&path), "reverted content is still a change");

    store.mark(&path).expect("re-mark");
    assert!(store.is_marked(&path));
}

#[test]
fn malformed_sidecar_is_not_a_mark() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), "a.jpg", 1_000);
    write(tmp.path().join("a.jpg.processed"), b"yesterday").expect("write junk");

    assert!(!SidecarMarkStore::default().is_marked(&path));
}

#[test]
fn mark_of_missing_subject_fails() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let store = SidecarMarkStore::default();

    let err = store
        .mark(&tmp.path().join("gone.jpg"))
        .expect_err("no subject");
    assert!(matches!(err, MarkError::Io { operation: "fingerprint", .. }), "{err:?}");
    assert!(!tmp.path().join("gone.jpg.processed").exists());
}

#[test]
fn unmark_removes_sidecar_and_reports_missing() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), "a.jpg", 1_000);
    let store = SidecarMarkStore::new(".done").expect("valid suffix");

    store.mark(&path).expect("mark");
    assert!(tmp.path().join("a.jpg.done").exists());

    store.unmark(&path).expect("unmark");
    assert!(!store.is_marked(&path));
    assert!(!tmp.path().join("a.jpg.done").exists());

    let err = store.unmark(&path).expect_err("second unmark");
    assert!(matches!(err, MarkError::Missing { .. }), "{err:?}");
}

#[test]
fn owns_only_its_sidecars() {
    let store = SidecarMarkStore::default();

    assert!(store.owns_path(Path::new("/p/a.jpg.processed")));
    assert!(!store.owns_path(Path::new("/p/a.jpg")));
    assert!(!store.owns_path(Path::new("/p/a.jpg.batchbackup")));
}

#[test]
fn invalid_suffix_is_rejected() {
    assert!(SidecarMarkStore::new("").is_err());
    assert!(SidecarMarkStore::new("/marks").is_err());
}

#[cfg(unix)]
#[test]
fn read_only_directory_cannot_be_marked() {
    use std::os::unix::fs::PermissionsExt;

    if nix::unistd::geteuid().is_root() {
        return;
    }

    let tmp = tempfile::tempdir().expect("create temp dir");
    let dir = tmp.path().join("ro");
    std::fs::create_dir(&dir).expect("create dir");
    let path = subject(&dir, "a.jpg", 1_000);
    std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o555)).expect("chmod");

    let store = SidecarMarkStore::default();
    let can = store.can_mark(&path);
    let result = store.mark(&path);

    std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).expect("restore");

    assert!(!can);
    assert!(matches!(result, Err(MarkError::Io { operation: "write", .. })));
}

#[test]
fn stale_mark_is_still_a_recorded_mark() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), "a.jpg", 1_000);
    let store = SidecarMarkStore::default();
    assert!(!store.has_mark(&path));

    store.mark(&path).expect("mark");
    set_mtime(&path, 2_000);

    assert!(!store.is_marked(&path));
    assert!(store.has_mark(&path));

    store.unmark(&path).expect("unmark");
    assert!(!store.has_mark(&path));
}
