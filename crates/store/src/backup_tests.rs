use super::*;

use std::fs::{read, write};

fn subject(dir: &Path, bytes: &[u8]) -> PathBuf {
    let path = dir.join("a.jpg");
    write(&path, bytes).expect("write subject");
    path
}

#[test]
fn backup_then_restore_recovers_exact_bytes() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), b"original \x00\xff bytes");
    let store = SidecarBackupStore::default();

    assert!(store.can_backup(&path));
    store.backup(&path).expect("backup");
    assert_eq!(
        read(tmp.path().join("a.jpg.batchbackup")).expect("read backup"),
        b"original \x00\xff bytes"
    );

    write(&path, b"transformed").expect("overwrite subject");
    store.restore_last_backup(&path).expect("restore");

    assert_eq!(read(&path).expect("read subject"), b"original \x00\xff bytes");
}

#[test]
fn restore_consumes_the_sidecar() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), b"original");
    let store = SidecarBackupStore::default();

    store.backup(&path).expect("backup");
    store.restore_last_backup(&path).expect("restore");

    assert!(!store.backup_path(&path).exists());
    let err = store.delete_last_backup(&path).expect_err("already consumed");
    assert!(err.is_missing(), "{err:?}");
}

#[test]
fn new_backup_replaces_stale_one() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), b"v1");
    let store = SidecarBackupStore::default();

    store.backup(&path).expect("first backup");
    write(&path, b"v2").expect("update subject");
    store.backup(&path).expect("second backup");

    write(&path, b"v3").expect("transform");
    store.restore_last_backup(&path).expect("restore");
    assert_eq!(read(&path).expect("read"), b"v2");
}

#[test]
fn restore_without_backup_is_missing_and_keeps_subject() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), b"current");
    let store = SidecarBackupStore::default();

    let err = store.restore_last_backup(&path).expect_err("no backup");
    assert!(err.is_missing(), "{err:?}");
    assert_eq!(read(&path).expect("read"), b"current");
}

#[test]
fn backup_of_missing_subject_fails_without_sidecar() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let store = SidecarBackupStore::default();
    let path = tmp.path().join("gone.jpg");

    let err = store.backup(&path).expect_err("no subject");
    assert!(matches!(err, BackupError::Io { operation: "create", .. }), "{err:?}");
    assert!(!store.backup_path(&path).exists());
}

#[test]
fn delete_removes_backup() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), b"bytes");
    let store = SidecarBackupStore::new(".bak").expect("valid suffix");

    store.backup(&path).expect("backup");
    assert!(tmp.path().join("a.jpg.bak").exists());

    store.delete_last_backup(&path).expect("delete");
    assert!(!tmp.path().join("a.jpg.bak").exists());
    assert!(store.delete_last_backup(&path).expect_err("gone").is_missing());
}

#[test]
fn owns_only_its_sidecars() {
    let store = SidecarBackupStore::default();

    assert!(store.owns_path(Path::new("a.jpg.batchbackup")));
    assert!(!store.owns_path(Path::new("a.jpg")));
}

#[test]
fn has_backup_follows_the_sidecar() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = subject(tmp.path(), b"original");
    let store = SidecarBackupStore::default();
    assert!(!store.has_backup(&path));

    store.backup(&path).expect("backup");
    assert!(store.has_backup(&path));

    store.restore_last_backup(&path).expect("restore");
    assert!(!store.has_backup(&path), "restore consumed it");
}
