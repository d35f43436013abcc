//! Persisted format for encrypted user data.
//!
//! Field names and byte lengths are a compatibility contract: old records
//! must stay decryptable, so the 32-byte salt, 16-byte nonce, 16-byte tag,
//! algorithm id, and iteration count are all stored with the ciphertext.

use serde::{Deserialize, Serialize};

use super::kdf::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// Cipher/KDF combination a record was produced with.
///
/// Unknown ids fail at deserialization, before any key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmId {
    #[serde(rename = "aes-256-gcm.pbkdf2-sha256")]
    Aes256GcmPbkdf2Sha256,
}

impl std::fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlgorithmId::Aes256GcmPbkdf2Sha256 => write!(f, "aes-256-gcm.pbkdf2-sha256"),
        }
    }
}

/// An authenticated ciphertext together with everything needed to
/// re-derive its key from the original passphrase.
///
/// Tampering with any field makes decryption fail; it never silently
/// corrupts the plaintext. The fixed-size fields make malformed lengths
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    pub ciphertext: Vec<u8>,
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub auth_tag: [u8; TAG_SIZE],
    pub algorithm: AlgorithmId,
    pub key_iterations: u32,
}
