//! RSA-OAEP encryption for configuration secrets exchanged with other
//! services. Enabled by the `asymmetric` feature.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use openssl::rsa::{Padding, Rsa};

use tenantgate_core::error::AppError;
use tenantgate_core::result::AppResult;

/// Bytes of OAEP (SHA-1) padding overhead per block.
const OAEP_OVERHEAD: usize = 42;

/// PEM encoded RSA key pair.
#[derive(Clone)]
pub struct RsaKeyPair {
    /// SubjectPublicKeyInfo PEM.
    pub public_pem: String,
    /// PKCS#1 private key PEM.
    pub private_pem: String,
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("public_pem", &self.public_pem)
            .finish_non_exhaustive()
    }
}

/// Generates a new key pair of `bits` modulus size.
pub fn generate_key_pair(bits: u32) -> AppResult<RsaKeyPair> {
    let rsa = Rsa::generate(bits).map_err(openssl_error("Key generation failed"))?;
    let private_pem = rsa
        .private_key_to_pem()
        .map_err(openssl_error("Private key export failed"))?;
    let public_pem = rsa
        .public_key_to_pem()
        .map_err(openssl_error("Public key export failed"))?;

    Ok(RsaKeyPair {
        public_pem: pem_string(public_pem)?,
        private_pem: pem_string(private_pem)?,
    })
}

/// Encrypts UTF-8 text with a public key; returns base64 ciphertext.
pub fn encrypt(plaintext: &str, public_pem: &str) -> AppResult<String> {
    let rsa = Rsa::public_key_from_pem(public_pem.as_bytes())
        .map_err(openssl_error("Invalid public key"))?;
    let size = rsa.size() as usize;
    if plaintext.len() > size.saturating_sub(OAEP_OVERHEAD) {
        return Err(AppError::crypto("Plaintext too long for key size"));
    }

    let mut buf = vec![0u8; size];
    let len = rsa
        .public_encrypt(plaintext.as_bytes(), &mut buf, Padding::PKCS1_OAEP)
        .map_err(openssl_error("Encryption failed"))?;
    buf.truncate(len);
    Ok(BASE64.encode(buf))
}

/// Decrypts base64 ciphertext with a private key.
pub fn decrypt(ciphertext: &str, private_pem: &str) -> AppResult<String> {
    let rsa = Rsa::private_key_from_pem(private_pem.as_bytes())
        .map_err(openssl_error("Invalid private key"))?;
    let raw = BASE64
        .decode(ciphertext.as_bytes())
        .map_err(|e| AppError::crypto(format!("Ciphertext is not valid base64: {e}")))?;

    let mut buf = vec![0u8; rsa.size() as usize];
    let len = rsa
        .private_decrypt(&raw, &mut buf, Padding::PKCS1_OAEP)
        .map_err(openssl_error("Decryption failed"))?;
    buf.truncate(len);
    String::from_utf8(buf).map_err(|_| AppError::crypto("Plaintext is not UTF-8"))
}

fn pem_string(pem: Vec<u8>) -> AppResult<String> {
    String::from_utf8(pem).map_err(|_| AppError::crypto("PEM is not UTF-8"))
}

fn openssl_error(context: &'static str) -> impl Fn(openssl::error::ErrorStack) -> AppError {
    move |e| AppError::crypto(format!("{context}: {e}"))
}
