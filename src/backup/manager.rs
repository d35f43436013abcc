//! Backup creation, restoration, rotation, and cleanup.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::audit::{AuditOperation, ComplianceAuditor, PrivacyTechnique};
use crate::crypto::{AuthenticatedCipher, CryptoError};

use super::envelope::{integrity_hash, EncryptedBackup};
use super::io;

/// Upper bound on retention, ten years.
pub const MAX_RETENTION_DAYS: i64 = 3_650;

#[derive(Debug, Error)]
pub enum BackupError {
    /// Normal lifecycle outcome, not a security event.
    #[error("backup expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    /// Tamper signal: the stored ciphertext no longer matches its hash.
    #[error("backup integrity check failed")]
    IntegrityViolation,
    #[error("backup not found: {0}")]
    NotFound(Uuid),
    #[error("invalid retention period: {0} days")]
    InvalidRetention(i64),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("backup payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("backup file I/O failed: {0}")]
    Io(String),
    #[error("malformed backup file: {0}")]
    Malformed(&'static str),
}

/// Packages structured user data into encrypted backup envelopes and
/// restores them.
///
/// The store is written once per envelope at creation and read at
/// restore/cleanup; all crypto happens per call with fresh randomness, so
/// no synchronization beyond the map itself is needed.
pub struct BackupManager {
    cipher: AuthenticatedCipher,
    store: DashMap<Uuid, EncryptedBackup>,
    auditor: Option<Arc<ComplianceAuditor>>,
}

impl BackupManager {
    pub fn new(cipher: AuthenticatedCipher) -> Self {
        Self { cipher, store: DashMap::new(), auditor: None }
    }

    /// Attach a compliance auditor. Observing only; never blocks.
    pub fn with_auditor(mut self, auditor: Arc<ComplianceAuditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    pub fn backup_count(&self) -> usize {
        self.store.len()
    }

    pub fn get(&self, id: Uuid) -> Option<EncryptedBackup> {
        self.store.get(&id).map(|entry| entry.clone())
    }

    /// Serialize `data` canonically, encrypt it, and wrap it in an
    /// envelope expiring `retention_days` from now.
    pub fn create_backup(
        &self,
        owner_id: &str,
        data: &serde_json::Value,
        passphrase: &str,
        retention_days: i64,
    ) -> Result<EncryptedBackup, BackupError> {
        if !(1..=MAX_RETENTION_DAYS).contains(&retention_days) {
            return Err(BackupError::InvalidRetention(retention_days));
        }

        // serde_json maps are key-sorted, so this byte form is canonical
        let plaintext = serde_json::to_vec(data)?;
        let record = self.cipher.encrypt(&plaintext, passphrase)?;

        let now = Utc::now();
        let backup = EncryptedBackup {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            created_at: now,
            expires_at: now + Duration::days(retention_days),
            integrity_hash: integrity_hash(&record.ciphertext),
            contained_fields: contained_fields(data),
            payload: record,
        };
        self.store.insert(backup.id, backup.clone());

        metrics::counter!("mindvault_backups_created_total").increment(1);
        tracing::info!(backup_id = %backup.id, retention_days, "created backup");
        self.audit(owner_id, AuditOperation::Backup, PrivacyTechnique::Aes256Gcm, &[
            ("backup_id", backup.id.to_string()),
            ("outcome", "success".to_string()),
        ]);

        Ok(backup)
    }

    /// Restore a backup, checking expiry, then integrity, then
    /// authentication - in that order, so corruption stays operationally
    /// distinguishable while decryption failures remain opaque.
    pub fn restore_backup(
        &self,
        backup: &EncryptedBackup,
        passphrase: &str,
    ) -> Result<serde_json::Value, BackupError> {
        let now = Utc::now();

        if backup.is_expired_at(now) {
            tracing::info!(backup_id = %backup.id, "restore refused, backup expired");
            self.audit(&backup.owner_id, AuditOperation::Restore, PrivacyTechnique::None, &[
                ("backup_id", backup.id.to_string()),
                ("outcome", "expired".to_string()),
            ]);
            return Err(BackupError::Expired { expired_at: backup.expires_at });
        }

        if !backup.verify_integrity() {
            // terminal state: discard the stored copy
            self.store.remove(&backup.id);
            metrics::counter!("mindvault_integrity_violations_total").increment(1);
            tracing::warn!(backup_id = %backup.id, "backup failed integrity check, discarded");
            self.audit(&backup.owner_id, AuditOperation::Restore, PrivacyTechnique::None, &[
                ("backup_id", backup.id.to_string()),
                ("outcome", "integrity_violation".to_string()),
            ]);
            return Err(BackupError::IntegrityViolation);
        }

        // authentication failures propagate as-is, opaque to the caller
        let plaintext = self.cipher.decrypt(&backup.payload, passphrase)?;
        let data = serde_json::from_slice(&plaintext)?;

        metrics::counter!("mindvault_backups_restored_total").increment(1);
        self.audit(&backup.owner_id, AuditOperation::Restore, PrivacyTechnique::Aes256Gcm, &[
            ("backup_id", backup.id.to_string()),
            ("outcome", "success".to_string()),
        ]);
        Ok(data)
    }

    pub fn restore_by_id(
        &self,
        id: Uuid,
        passphrase: &str,
    ) -> Result<serde_json::Value, BackupError> {
        let backup = self.get(id).ok_or(BackupError::NotFound(id))?;
        self.restore_backup(&backup, passphrase)
    }

    /// Re-encrypt a stored backup under a new passphrase with fresh salt
    /// and nonce, preserving id, owner, and expiry.
    pub fn rotate_passphrase(
        &self,
        id: Uuid,
        old_passphrase: &str,
        new_passphrase: &str,
    ) -> Result<EncryptedBackup, BackupError> {
        let backup = self.get(id).ok_or(BackupError::NotFound(id))?;

        // the full restore path runs first, so an expired or corrupted
        // backup can never be rotated back to life
        let data = self.restore_backup(&backup, old_passphrase)?;
        let plaintext = serde_json::to_vec(&data)?;
        let record = self.cipher.encrypt(&plaintext, new_passphrase)?;

        let rotated = EncryptedBackup {
            integrity_hash: integrity_hash(&record.ciphertext),
            payload: record,
            ..backup
        };
        self.store.insert(id, rotated.clone());

        tracing::info!(backup_id = %id, "rotated backup passphrase");
        self.audit(&rotated.owner_id, AuditOperation::Rotate, PrivacyTechnique::Aes256Gcm, &[
            ("backup_id", id.to_string()),
            ("outcome", "success".to_string()),
        ]);
        Ok(rotated)
    }

    /// Purge envelopes past expiry. Idempotent and safe to run
    /// concurrently with creation and restore: expiry is compared against
    /// a single `now` snapshot taken at pass start, so a backup created
    /// after the pass begins is never deleted by it.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.store.len();
        self.store.retain(|_, backup| !backup.is_expired_at(now));
        let purged = before.saturating_sub(self.store.len());

        if purged > 0 {
            metrics::counter!("mindvault_backups_purged_total").increment(purged as u64);
            tracing::info!(purged, "purged expired backups");
            self.audit(
                crate::audit::SYSTEM_PRINCIPAL,
                AuditOperation::Cleanup,
                PrivacyTechnique::None,
                &[("purged", purged.to_string())],
            );
        }
        purged
    }

    /// Export a stored envelope to a backup file.
    pub fn export_to_file(&self, id: Uuid, path: &Path) -> Result<(), BackupError> {
        let backup = self.get(id).ok_or(BackupError::NotFound(id))?;
        io::write_backup_file(path, &backup)
    }

    /// Import an envelope from a backup file into the store.
    pub fn import_from_file(&self, path: &Path) -> Result<EncryptedBackup, BackupError> {
        let backup = io::read_backup_file(path)?;
        self.store.insert(backup.id, backup.clone());
        Ok(backup)
    }

    fn audit(
        &self,
        owner_id: &str,
        operation: AuditOperation,
        technique: PrivacyTechnique,
        details: &[(&str, String)],
    ) {
        if let Some(auditor) = &self.auditor {
            let details: BTreeMap<String, String> = details
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect();
            auditor.log(owner_id, operation, "user_backup", technique, details);
        }
    }
}

fn contained_fields(data: &serde_json::Value) -> Vec<String> {
    match data {
        serde_json::Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
