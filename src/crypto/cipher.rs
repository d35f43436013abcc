//! Authenticated encryption of user data with AES-256-GCM.
//!
//! Every encryption draws a fresh salt and nonce from the CSPRNG, derives
//! its key on demand, and zeroizes the key when the call returns. There is
//! no key cache, so concurrent calls share nothing.
//!
//! # Failure opacity
//! Decryption reports every tag mismatch - wrong passphrase, corrupted
//! ciphertext, corrupted nonce or tag - as the same generic
//! [`CryptoError::AuthenticationFailed`]. Distinguishing the cause would
//! hand an oracle to an attacker. No partial plaintext is ever returned.

use std::sync::Arc;

use aes::Aes256;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{AesGcm, Key, Nonce};
use thiserror::Error;

use crate::audit::{AuditOperation, ComplianceAuditor, PrivacyTechnique, SYSTEM_PRINCIPAL};

use super::kdf::{self, MIN_KEY_ITERATIONS, TAG_SIZE};
use super::record::{AlgorithmId, EncryptedRecord};

/// AES-256-GCM parameterized for the record format's 16-byte nonce.
type RecordCipher = AesGcm<Aes256, U16>;

/// Encryption and decryption error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Generic, non-distinguishing decryption failure.
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("invalid key iteration count: {0}")]
    InvalidIterations(u32),
}

/// Passphrase-based AEAD cipher producing [`EncryptedRecord`]s.
#[derive(Debug, Clone)]
pub struct AuthenticatedCipher {
    iterations: u32,
    auditor: Option<Arc<ComplianceAuditor>>,
}

impl AuthenticatedCipher {
    /// Create a cipher that derives keys with `iterations` PBKDF2 rounds.
    ///
    /// Counts below [`MIN_KEY_ITERATIONS`] are rejected for new
    /// ciphertexts; decryption always honors the count stored on the
    /// record.
    pub fn new(iterations: u32) -> Result<Self, CryptoError> {
        if iterations < MIN_KEY_ITERATIONS {
            return Err(CryptoError::InvalidIterations(iterations));
        }
        Ok(Self { iterations, auditor: None })
    }

    /// Attach a compliance auditor. The auditor observes; it never blocks
    /// or fails an operation.
    pub fn with_auditor(mut self, auditor: Arc<ComplianceAuditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Encrypt `plaintext` under `passphrase` with a fresh salt and nonce.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        passphrase: &str,
    ) -> Result<EncryptedRecord, CryptoError> {
        let salt = kdf::generate_salt();
        let nonce = kdf::generate_nonce();
        let key = kdf::derive_key(passphrase, &salt, self.iterations)?;

        let cipher = RecordCipher::new(Key::<RecordCipher>::from_slice(&key[..]));
        let mut sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        // the AEAD appends the tag; the record format stores it separately
        let tag_offset = sealed.len() - TAG_SIZE;
        let tag = sealed.split_off(tag_offset);
        let mut auth_tag = [0u8; TAG_SIZE];
        auth_tag.copy_from_slice(&tag);

        metrics::counter!("mindvault_records_encrypted_total").increment(1);
        tracing::debug!(bytes = plaintext.len(), "encrypted record");
        self.audit(AuditOperation::Encrypt, "success");

        Ok(EncryptedRecord {
            ciphertext: sealed,
            salt,
            nonce,
            auth_tag,
            algorithm: AlgorithmId::Aes256GcmPbkdf2Sha256,
            key_iterations: self.iterations,
        })
    }

    /// Decrypt a record, re-deriving its key from the stored salt and
    /// iteration count.
    pub fn decrypt(
        &self,
        record: &EncryptedRecord,
        passphrase: &str,
    ) -> Result<Vec<u8>, CryptoError> {
        let AlgorithmId::Aes256GcmPbkdf2Sha256 = record.algorithm;

        let key = kdf::derive_key(passphrase, &record.salt, record.key_iterations)?;
        let cipher = RecordCipher::new(Key::<RecordCipher>::from_slice(&key[..]));

        let mut sealed = Vec::with_capacity(record.ciphertext.len() + TAG_SIZE);
        sealed.extend_from_slice(&record.ciphertext);
        sealed.extend_from_slice(&record.auth_tag);

        match cipher.decrypt(Nonce::from_slice(&record.nonce), sealed.as_slice()) {
            Ok(plaintext) => {
                metrics::counter!("mindvault_records_decrypted_total").increment(1);
                self.audit(AuditOperation::Decrypt, "success");
                Ok(plaintext)
            }
            Err(_) => {
                metrics::counter!("mindvault_auth_failures_total").increment(1);
                self.audit(AuditOperation::Decrypt, "authentication_failed");
                Err(CryptoError::AuthenticationFailed)
            }
        }
    }

    fn audit(&self, operation: AuditOperation, outcome: &str) {
        if let Some(auditor) = &self.auditor {
            let mut details = std::collections::BTreeMap::new();
            details.insert("outcome".to_string(), outcome.to_string());
            auditor.log(
                SYSTEM_PRINCIPAL,
                operation,
                "user_data",
                PrivacyTechnique::Aes256Gcm,
                details,
            );
        }
    }
}

impl Default for AuthenticatedCipher {
    fn default() -> Self {
        Self { iterations: kdf::DEFAULT_KEY_ITERATIONS, auditor: None }
    }
}

#[cfg(test)]
#[path = "cipher_tests.rs"]
mod tests;
