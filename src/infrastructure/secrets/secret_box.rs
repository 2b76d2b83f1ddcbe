use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Symmetric envelope for stored vendor API keys: AES-256-GCM with a random
/// per-secret nonce, everything base64 on the wire and in the database.
pub struct SecretBox {
    cipher: Aes256Gcm,
}

impl SecretBox {
    /// `key_b64` must decode to exactly 32 bytes.
    pub fn from_base64_key(key_b64: &str) -> Result<Self, SecretBoxError> {
        let key_bytes = BASE64
            .decode(key_b64)
            .map_err(|e| SecretBoxError::InvalidKey(e.to_string()))?;
        if key_bytes.len() != 32 {
            return Err(SecretBoxError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                key_bytes.len()
            )));
        }
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Returns `(ciphertext_b64, nonce_b64)`.
    pub fn encrypt(&self, plaintext: &str) -> Result<(String, String), SecretBoxError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| SecretBoxError::EncryptionFailed(e.to_string()))?;
        Ok((BASE64.encode(ciphertext), BASE64.encode(nonce)))
    }

    pub fn decrypt(&self, ciphertext_b64: &str, nonce_b64: &str) -> Result<String, SecretBoxError> {
        let ciphertext = BASE64
            .decode(ciphertext_b64)
            .map_err(|e| SecretBoxError::InvalidCiphertext(e.to_string()))?;
        let nonce_bytes = BASE64
            .decode(nonce_b64)
            .map_err(|e| SecretBoxError::InvalidCiphertext(e.to_string()))?;
        if nonce_bytes.len() != 12 {
            return Err(SecretBoxError::InvalidCiphertext(format!(
                "expected 12-byte nonce, got {}",
                nonce_bytes.len()
            )));
        }
        let nonce = Nonce::from_slice(&nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| SecretBoxError::DecryptionFailed)?;
        String::from_utf8(plaintext)
            .map_err(|e| SecretBoxError::InvalidCiphertext(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SecretBoxError {
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("decryption failed: wrong key or corrupted secret")]
    DecryptionFailed,
}
