//! AES-256-GCM encryption for session and configuration secrets.
//!
//! Keys and IVs travel as standard base64. An IV must never be reused with
//! the same key for a different plaintext.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;

use super::random::random_bytes;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;
/// IV (nonce) length in bytes.
pub const IV_LEN: usize = 12;

/// Fresh random key, base64 encoded.
pub fn generate_key() -> String {
    BASE64.encode(random_bytes(KEY_LEN))
}

/// Fresh random IV, base64 encoded.
pub fn generate_iv() -> String {
    BASE64.encode(random_bytes(IV_LEN))
}

/// Encrypts UTF-8 text; returns base64 ciphertext including the auth tag.
pub fn encrypt(plaintext: &str, key: &str, iv: &str) -> AppResult<String> {
    let (cipher, nonce) = cipher_and_nonce(key, iv)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| AppError::crypto("Encryption failed"))?;
    Ok(BASE64.encode(ciphertext))
}

/// Decrypts base64 ciphertext produced by [`encrypt`].
pub fn decrypt(ciphertext: &str, key: &str, iv: &str) -> AppResult<String> {
    let (cipher, nonce) = cipher_and_nonce(key, iv)?;
    let raw = BASE64
        .decode(ciphertext.as_bytes())
        .map_err(|e| AppError::crypto(format!("Ciphertext is not valid base64: {e}")))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), raw.as_ref())
        .map_err(|_| AppError::crypto("Decryption failed"))?;
    String::from_utf8(plaintext).map_err(|_| AppError::crypto("Plaintext is not UTF-8"))
}

fn cipher_and_nonce(key: &str, iv: &str) -> AppResult<(Aes256Gcm, Vec<u8>)> {
    let key = BASE64
        .decode(key.as_bytes())
        .map_err(|e| AppError::crypto(format!("Key is not valid base64: {e}")))?;
    let nonce = BASE64
        .decode(iv.as_bytes())
        .map_err(|e| AppError::crypto(format!("IV is not valid base64: {e}")))?;
    if nonce.len() != IV_LEN {
        return Err(AppError::crypto(format!("IV must be {IV_LEN} bytes")));
    }
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| AppError::crypto(format!("Key must be {KEY_LEN} bytes")))?;
    Ok((cipher, nonce))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_inverts_encrypt() {
        let samples = ["", "hello", "ünïcødé ✓ 東京", &"x".repeat(4096)];
        for plaintext in samples {
            let key = generate_key();
            let iv = generate_iv();
            let ciphertext = encrypt(plaintext, &key, &iv).unwrap();
            assert_eq!(decrypt(&ciphertext, &key, &iv).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let iv = generate_iv();
        let ciphertext = encrypt("secret", &generate_key(), &iv).unwrap();
        assert!(decrypt(&ciphertext, &generate_key(), &iv).is_err());
    }

    #[test]
    fn test_bad_iv_length_rejected() {
        let key = generate_key();
        let short_iv = BASE64.encode([0u8; 4]);
        assert!(encrypt("x", &key, &short_iv).is_err());
    }
}
