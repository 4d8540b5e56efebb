use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

const NONCE_LEN: usize = 12;

/// Symmetric string cipher used for sensitive order columns.
pub trait FieldCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> AppResult<String>;
    fn decrypt(&self, ciphertext: &str) -> AppResult<String>;
}

/// AES-256-GCM with a key derived from the configured secret.
///
/// Output is `base64(nonce || ciphertext)`; every call draws a fresh nonce, so
/// encrypting the same value twice gives different strings.
#[derive(Clone)]
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    pub fn new(secret: &str) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::ConfigError(
                "Encryption secret must not be empty".to_string(),
            ));
        }
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(digest.as_slice());
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }
}

impl FieldCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| AppError::EncryptionError("Failed to encrypt field".to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&sealed);
        Ok(STANDARD.encode(out))
    }

    fn decrypt(&self, ciphertext: &str) -> AppResult<String> {
        let raw = STANDARD
            .decode(ciphertext)
            .map_err(|e| AppError::EncryptionError(format!("Malformed ciphertext: {e}")))?;
        if raw.len() <= NONCE_LEN {
            return Err(AppError::EncryptionError(
                "Ciphertext is too short".to_string(),
            ));
        }

        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| AppError::EncryptionError("Failed to decrypt field".to_string()))?;
        String::from_utf8(plain)
            .map_err(|e| AppError::EncryptionError(format!("Decrypted field is not UTF-8: {e}")))
    }
}
