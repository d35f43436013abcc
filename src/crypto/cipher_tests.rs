//! Tests for the authenticated cipher.

use super::super::kdf::{MIN_KEY_ITERATIONS, NONCE_SIZE, SALT_SIZE, TAG_SIZE};
use super::*;

fn test_cipher() -> AuthenticatedCipher {
    AuthenticatedCipher::new(MIN_KEY_ITERATIONS).unwrap()
}

#[test]
fn test_encrypt_decrypt_round_trip() {
    let cipher = test_cipher();
    let plaintext = b"therapy journal entry: feeling better today";
    let record = cipher.encrypt(plaintext, "correct-horse").unwrap();
    let decrypted = cipher.decrypt(&record, "correct-horse").unwrap();
    assert_eq!(plaintext.as_slice(), decrypted.as_slice());
}

#[test]
fn test_empty_plaintext_round_trip() {
    let cipher = test_cipher();
    let record = cipher.encrypt(b"", "pass").unwrap();
    assert!(record.ciphertext.is_empty());
    let decrypted = cipher.decrypt(&record, "pass").unwrap();
    assert!(decrypted.is_empty());
}

#[test]
fn test_wrong_passphrase_fails_generically() {
    let cipher = test_cipher();
    let record = cipher.encrypt(b"secret", "correct-horse").unwrap();
    let result = cipher.decrypt(&record, "wrong-password");
    assert_eq!(result, Err(CryptoError::AuthenticationFailed));
}

#[test]
fn test_ciphertext_bit_flip_detected() {
    let cipher = test_cipher();
    let mut record = cipher.encrypt(b"sensitive payload", "pass").unwrap();
    record.ciphertext[0] ^= 0x01;
    assert_eq!(cipher.decrypt(&record, "pass"), Err(CryptoError::AuthenticationFailed));
}

#[test]
fn test_tag_bit_flip_detected() {
    let cipher = test_cipher();
    let mut record = cipher.encrypt(b"sensitive payload", "pass").unwrap();
    record.auth_tag[TAG_SIZE - 1] ^= 0x80;
    assert_eq!(cipher.decrypt(&record, "pass"), Err(CryptoError::AuthenticationFailed));
}

#[test]
fn test_nonce_bit_flip_detected() {
    let cipher = test_cipher();
    let mut record = cipher.encrypt(b"sensitive payload", "pass").unwrap();
    record.nonce[NONCE_SIZE / 2] ^= 0x01;
    assert_eq!(cipher.decrypt(&record, "pass"), Err(CryptoError::AuthenticationFailed));
}

#[test]
fn test_salt_bit_flip_detected() {
    let cipher = test_cipher();
    let mut record = cipher.encrypt(b"sensitive payload", "pass").unwrap();
    record.salt[SALT_SIZE - 1] ^= 0x01;
    assert_eq!(cipher.decrypt(&record, "pass"), Err(CryptoError::AuthenticationFailed));
}

#[test]
fn test_every_ciphertext_bit_position_detected() {
    let cipher = test_cipher();
    let record = cipher.encrypt(b"ab", "pass").unwrap();
    for byte in 0..record.ciphertext.len() {
        for bit in 0..8 {
            let mut tampered = record.clone();
            tampered.ciphertext[byte] ^= 1 << bit;
            assert_eq!(
                cipher.decrypt(&tampered, "pass"),
                Err(CryptoError::AuthenticationFailed),
                "flip at byte {byte} bit {bit} was not detected"
            );
        }
    }
}

#[test]
fn test_fresh_salt_and_nonce_per_call() {
    let cipher = test_cipher();
    let r1 = cipher.encrypt(b"same message", "same pass").unwrap();
    let r2 = cipher.encrypt(b"same message", "same pass").unwrap();
    assert_ne!(r1.salt, r2.salt);
    assert_ne!(r1.nonce, r2.nonce);
    assert_ne!(r1.ciphertext, r2.ciphertext);
}

#[test]
fn test_record_carries_iteration_count() {
    let cipher = AuthenticatedCipher::new(150_000).unwrap();
    let record = cipher.encrypt(b"data", "pass").unwrap();
    assert_eq!(record.key_iterations, 150_000);

    // a cipher configured differently still honors the stored count
    let other = AuthenticatedCipher::new(200_000).unwrap();
    assert_eq!(other.decrypt(&record, "pass").unwrap(), b"data");
}

#[test]
fn test_rejects_low_iteration_config() {
    assert!(matches!(
        AuthenticatedCipher::new(MIN_KEY_ITERATIONS - 1),
        Err(CryptoError::InvalidIterations(_))
    ));
}

#[test]
fn test_tag_is_split_from_ciphertext() {
    let cipher = test_cipher();
    let plaintext = b"exactly this";
    let record = cipher.encrypt(plaintext, "pass").unwrap();
    assert_eq!(record.ciphertext.len(), plaintext.len());
    assert_eq!(record.auth_tag.len(), TAG_SIZE);
}

#[test]
fn test_record_serde_round_trip() {
    let cipher = test_cipher();
    let record = cipher.encrypt(b"persist me", "pass").unwrap();
    let json = serde_json::to_string(&record).unwrap();
    let back: EncryptedRecord = serde_json::from_str(&json).unwrap();
    let decrypted = cipher.decrypt(&back, "pass").unwrap();
    assert_eq!(decrypted, b"persist me");
}

#[test]
fn test_unknown_algorithm_rejected_at_deserialization() {
    let cipher = test_cipher();
    let record = cipher.encrypt(b"data", "pass").unwrap();
    let json = serde_json::to_string(&record)
        .unwrap()
        .replace("aes-256-gcm.pbkdf2-sha256", "rot13");
    assert!(serde_json::from_str::<EncryptedRecord>(&json).is_err());
}

#[test]
fn test_error_display_is_opaque() {
    let msg = CryptoError::AuthenticationFailed.to_string();
    assert_eq!(msg, "authentication failed");
}
