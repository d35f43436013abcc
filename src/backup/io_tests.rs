//! Tests for backup file framing.

use std::io::Write;

use serde_json::json;
use tempfile::tempdir;

use super::*;
use crate::crypto::{AuthenticatedCipher, MIN_KEY_ITERATIONS};

use super::super::manager::BackupManager;

fn stored_backup(manager: &BackupManager) -> EncryptedBackup {
    manager
        .create_backup("user-1", &json!({"mood": "calm"}), "pass", 30)
        .unwrap()
}

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user.mvbkp");
    let manager = BackupManager::new(AuthenticatedCipher::new(MIN_KEY_ITERATIONS).unwrap());
    let backup = stored_backup(&manager);

    write_backup_file(&path, &backup).unwrap();
    let loaded = read_backup_file(&path).unwrap();
    assert_eq!(loaded.id, backup.id);
    assert_eq!(loaded.integrity_hash, backup.integrity_hash);
    assert_eq!(loaded.payload, backup.payload);
}

#[test]
fn test_file_starts_with_magic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user.mvbkp");
    let manager = BackupManager::new(AuthenticatedCipher::new(MIN_KEY_ITERATIONS).unwrap());
    write_backup_file(&path, &stored_backup(&manager)).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..5], BACKUP_MAGIC);
    assert_eq!(bytes[5], 1);
    assert_eq!(bytes[6], 0);
}

#[test]
fn test_bad_magic_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.mvbkp");
    std::fs::write(&path, b"NOTBK\x01\x00").unwrap();
    assert!(matches!(
        read_backup_file(&path),
        Err(BackupError::Malformed("bad magic"))
    ));
}

#[test]
fn test_unsupported_version_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("future.mvbkp");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(BACKUP_MAGIC).unwrap();
    file.write_all(&[99, 0]).unwrap();
    file.write_all(&0u64.to_le_bytes()).unwrap();
    drop(file);
    assert!(matches!(
        read_backup_file(&path),
        Err(BackupError::Malformed("unsupported format version"))
    ));
}

#[test]
fn test_truncated_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.mvbkp");
    std::fs::write(&path, b"MVBKP\x01\x00\xff\xff").unwrap();
    assert!(matches!(read_backup_file(&path), Err(BackupError::Io(_))));
}

#[test]
fn test_oversized_length_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("huge.mvbkp");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(BACKUP_MAGIC).unwrap();
    file.write_all(&BACKUP_FORMAT_VERSION).unwrap();
    file.write_all(&u64::MAX.to_le_bytes()).unwrap();
    drop(file);
    assert!(matches!(
        read_backup_file(&path),
        Err(BackupError::Malformed("body length out of range"))
    ));
}

#[test]
fn test_garbage_body_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.mvbkp");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(BACKUP_MAGIC).unwrap();
    file.write_all(&BACKUP_FORMAT_VERSION).unwrap();
    file.write_all(&4u64.to_le_bytes()).unwrap();
    file.write_all(b"{{{{").unwrap();
    drop(file);
    assert!(matches!(
        read_backup_file(&path),
        Err(BackupError::Serialization(_))
    ));
}

#[test]
fn test_export_import_through_manager() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.mvbkp");
    let manager = BackupManager::new(AuthenticatedCipher::new(MIN_KEY_ITERATIONS).unwrap());
    let backup = stored_backup(&manager);

    manager.export_to_file(backup.id, &path).unwrap();

    let other = BackupManager::new(AuthenticatedCipher::new(MIN_KEY_ITERATIONS).unwrap());
    let imported = other.import_from_file(&path).unwrap();
    assert_eq!(imported.id, backup.id);
    assert_eq!(
        other.restore_by_id(backup.id, "pass").unwrap(),
        json!({"mood": "calm"})
    );
}
