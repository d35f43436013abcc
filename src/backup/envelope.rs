//! Backup envelope format and lifecycle.
//!
//! An envelope wraps an [`EncryptedRecord`] with ownership, expiry, and a
//! SHA-256 hash of the ciphertext. Lifecycle:
//! `Created -> Valid -> {Expired | Corrupted}`; the terminal states are
//! never recoverable - an expired or corrupted backup can only be
//! discarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::crypto::EncryptedRecord;

/// Hex-encoded SHA-256 of a ciphertext.
pub fn integrity_hash(ciphertext: &[u8]) -> String {
    hex::encode(Sha256::digest(ciphertext))
}

/// Lifecycle state of a backup at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupState {
    Valid,
    Expired,
    Corrupted,
}

/// Encrypted, integrity-checked, time-bounded backup of structured user
/// data. Owned by the caller's storage layer; the engine keeps no
/// plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedBackup {
    pub id: Uuid,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub payload: EncryptedRecord,
    /// Top-level field names of the backed-up object; lets operators see
    /// what a backup covers without decrypting it.
    pub contained_fields: Vec<String>,
    /// Hex SHA-256 of `payload.ciphertext`, checked before decryption.
    pub integrity_hash: String,
}

impl EncryptedBackup {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn verify_integrity(&self) -> bool {
        integrity_hash(&self.payload.ciphertext) == self.integrity_hash
    }

    /// Expiry wins over corruption: a backup past its expiry is Expired
    /// even if the ciphertext was also tampered with.
    pub fn state_at(&self, now: DateTime<Utc>) -> BackupState {
        if self.is_expired_at(now) {
            BackupState::Expired
        } else if !self.verify_integrity() {
            BackupState::Corrupted
        } else {
            BackupState::Valid
        }
    }
}
