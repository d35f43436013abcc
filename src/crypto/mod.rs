//! Passphrase-based authenticated encryption.
//!
//! Split into sub-modules:
//! - `kdf`: PBKDF2 key stretching and CSPRNG salt/nonce generation
//! - `record`: the persisted `EncryptedRecord` format
//! - `cipher`: AES-256-GCM encrypt/decrypt over records

pub mod cipher;
pub mod kdf;
pub mod record;

pub use cipher::{AuthenticatedCipher, CryptoError};
pub use kdf::{
    derive_key, generate_nonce, generate_salt, DEFAULT_KEY_ITERATIONS, KEY_SIZE,
    MIN_KEY_ITERATIONS, NONCE_SIZE, SALT_SIZE, TAG_SIZE,
};
pub use record::{AlgorithmId, EncryptedRecord};
