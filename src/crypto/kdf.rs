//! Key derivation and randomness generation.
//!
//! Keys are stretched from user passphrases with PBKDF2-HMAC-SHA256 and
//! exist only inside `Zeroizing` buffers scoped to a single call. Salts
//! and nonces come from the OS CSPRNG; nothing here is counter-based, so
//! concurrent callers can never collide on a (key, nonce) pair.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::cipher::CryptoError;

/// Derived key size (256 bits).
pub const KEY_SIZE: usize = 32;
/// Salt size stored with every record (256 bits).
pub const SALT_SIZE: usize = 32;
/// Nonce size stored with every record (128 bits).
pub const NONCE_SIZE: usize = 16;
/// GCM authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// Default PBKDF2 iteration count (OWASP recommendation for HMAC-SHA256).
pub const DEFAULT_KEY_ITERATIONS: u32 = 600_000;
/// Lowest iteration count accepted when encrypting new data. Stored
/// records carry their own count and are always decryptable.
pub const MIN_KEY_ITERATIONS: u32 = 100_000;

/// Stretch `passphrase` into a 256-bit key with PBKDF2-HMAC-SHA256.
///
/// The iteration count used must be persisted alongside the ciphertext so
/// the derivation stays reproducible if the default ever changes.
pub fn derive_key(
    passphrase: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_SIZE]>, CryptoError> {
    if iterations == 0 {
        return Err(CryptoError::InvalidIterations(iterations));
    }
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key[..]);
    Ok(key)
}

/// Generate a fresh 32-byte salt from the OS CSPRNG.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    random_bytes()
}

/// Generate a fresh 16-byte nonce from the OS CSPRNG.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    random_bytes()
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
#[path = "kdf_tests.rs"]
mod tests;
