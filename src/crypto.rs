//! Session-scoped message encryption.
//!
//! DESIGN
//! ======
//! Every chat widget mount owns one AES-256-GCM key that lives only in
//! process memory. Messages are sealed with a fresh 96-bit nonce per call and
//! stored as `base64(nonce || ciphertext || tag)` so the blob fits a text
//! column. The key never leaves this module except as an opaque handle.
//!
//! TRADE-OFFS
//! ==========
//! Random nonces are safe here because a key seals at most a few hundred
//! messages before the widget unmounts. There is no key exchange and no
//! forward secrecy beyond the lifetime of the mount.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::{Rng, TryRngCore};

/// Key length in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag length appended by AES-GCM.
pub const TAG_SIZE: usize = 16;

/// Text shown in place of a message whose blob fails to decrypt.
pub const DECRYPT_PLACEHOLDER: &str = "Error: Could not decrypt message.";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The OS entropy source could not produce key material.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    #[error("encryption failed")]
    Encryption,
    /// Malformed blob or authentication failure. Deliberately carries no
    /// detail about which check failed.
    #[error("decryption failed")]
    Decryption,
}

impl crate::error::ErrorCode for CryptoError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::KeyGeneration(_) => "E_KEY_INIT",
            Self::Encryption => "E_ENCRYPT",
            Self::Decryption => "E_DECRYPT",
        }
    }
}

// =============================================================================
// SESSION KEY
// =============================================================================

/// In-memory symmetric key for one chat session.
///
/// Deliberately not `Serialize` and not `Debug`-printable: there is no path
/// that sends key bytes over the wire.
pub struct SessionKey {
    cipher: Aes256Gcm,
}

impl SessionKey {
    /// Generate a fresh 256-bit key from the OS entropy source.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyGeneration`] if the entropy source fails.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::generate_with(|buf| {
            rand::rngs::OsRng
                .try_fill_bytes(buf)
                .map_err(|e| e.to_string())
        })
    }

    /// Generate a key from a caller-supplied entropy source.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyGeneration`] if `fill` fails.
    pub fn generate_with<F>(fill: F) -> Result<Self, CryptoError>
    where
        F: FnOnce(&mut [u8]) -> Result<(), String>,
    {
        let mut bytes = [0u8; KEY_SIZE];
        fill(&mut bytes).map_err(CryptoError::KeyGeneration)?;
        let key = Key::<Aes256Gcm>::from_slice(&bytes);
        let cipher = Aes256Gcm::new(key);
        bytes.fill(0);
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` under this key. See [`encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Encryption`] if the cipher rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        encrypt(plaintext, self)
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

// =============================================================================
// ENCRYPT / DECRYPT
// =============================================================================

/// Encrypt `plaintext` with a fresh random nonce.
///
/// Output format: `base64(nonce (12 bytes) || ciphertext || tag (16 bytes))`.
///
/// # Errors
///
/// Returns [`CryptoError::Encryption`] if the cipher rejects the input.
pub fn encrypt(plaintext: &str, key: &SessionKey) -> Result<String, CryptoError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let sealed = key
        .cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::Encryption)?;

    let mut combined = Vec::with_capacity(NONCE_SIZE + sealed.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&sealed);
    Ok(BASE64.encode(&combined))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// # Errors
///
/// Returns [`CryptoError::Decryption`] if the blob is not base64, is shorter
/// than nonce + tag, fails authentication, or is not UTF-8.
pub fn decrypt(blob: &str, key: &SessionKey) -> Result<String, CryptoError> {
    let combined = BASE64
        .decode(blob.trim())
        .map_err(|_| CryptoError::Decryption)?;
    if combined.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decryption);
    }

    let (nonce_bytes, sealed) = combined.split_at(NONCE_SIZE);
    let plaintext = key
        .cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| CryptoError::Decryption)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::Decryption)
}

/// Decrypt for display: failures become [`DECRYPT_PLACEHOLDER`] instead of
/// an error, so a bad row never breaks a transcript.
#[must_use]
pub fn decrypt_or_placeholder(blob: &str, key: &SessionKey) -> (String, bool) {
    match decrypt(blob, key) {
        Ok(text) => (text, true),
        Err(e) => {
            tracing::warn!(error = %e, "chat: stored message could not be decrypted");
            (DECRYPT_PLACEHOLDER.to_string(), false)
        }
    }
}

#[cfg(test)]
#[path = "crypto_test.rs"]
mod tests;
