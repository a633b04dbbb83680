//! Access token encryption at rest
//!
//! Tokens are sealed with ChaCha20-Poly1305 under a key derived from the
//! configured secret and stored as `v1:<nonce>:<ciphertext>`, both parts
//! URL-safe base64 without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, KeyInit, Nonce};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::errors::ServiceError;

const ENVELOPE_VERSION: &str = "v1";
const NONCE_LEN: usize = 12;

/// Symmetric cipher for stored access tokens
pub struct TokenCipher {
    aead: ChaCha20Poly1305,
}

impl TokenCipher {
    /// Create a cipher keyed by SHA-256 of the given secret
    pub fn new(secret: &SecretString) -> Result<Self, ServiceError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(ServiceError::ConfigError(
                "Encryption key must not be empty".to_string(),
            ));
        }

        let key = Sha256::digest(secret.as_bytes());
        let aead = ChaCha20Poly1305::new_from_slice(&key)
            .map_err(|e| ServiceError::CryptoError(format!("Failed to initialize cipher: {e}")))?;

        Ok(Self { aead })
    }

    /// Encrypt a token into a storable envelope
    pub fn encrypt(&self, plaintext: &str) -> Result<String, ServiceError> {
        let nonce_source = uuid::Uuid::new_v4();
        let nonce_bytes = &nonce_source.as_bytes()[..NONCE_LEN];
        let ciphertext = self
            .aead
            .encrypt(Nonce::from_slice(nonce_bytes), plaintext.as_bytes())
            .map_err(|e| ServiceError::CryptoError(format!("Failed to encrypt token: {e}")))?;

        Ok(format!(
            "{ENVELOPE_VERSION}:{}:{}",
            URL_SAFE_NO_PAD.encode(nonce_bytes),
            URL_SAFE_NO_PAD.encode(ciphertext)
        ))
    }

    /// Decrypt an envelope produced by [`TokenCipher::encrypt`]
    pub fn decrypt(&self, envelope: &str) -> Result<String, ServiceError> {
        let mut parts = envelope.split(':');
        let version = parts.next().unwrap_or_default();
        let nonce_b64 = parts.next().unwrap_or_default();
        let ciphertext_b64 = parts.next().unwrap_or_default();

        if version != ENVELOPE_VERSION || parts.next().is_some() {
            return Err(ServiceError::CryptoError(
                "Token envelope is invalid".to_string(),
            ));
        }

        let nonce = URL_SAFE_NO_PAD
            .decode(nonce_b64)
            .map_err(|e| ServiceError::CryptoError(format!("Failed to decode nonce: {e}")))?;
        if nonce.len() != NONCE_LEN {
            return Err(ServiceError::CryptoError(
                "Token nonce length is invalid".to_string(),
            ));
        }
        let ciphertext = URL_SAFE_NO_PAD
            .decode(ciphertext_b64)
            .map_err(|e| ServiceError::CryptoError(format!("Failed to decode token: {e}")))?;

        let plaintext = self
            .aead
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|e| ServiceError::CryptoError(format!("Failed to decrypt token: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| ServiceError::CryptoError(format!("Token is not valid UTF-8: {e}")))
    }
}
