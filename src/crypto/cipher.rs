//! AES-256-GCM transport cipher

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::EncryptionKey;
use crate::error::{Result, SealError};
use crate::protocol::{ENVELOPE_SIZE, FRAME_SIZE, NONCE_SIZE};

/// Seals frames into envelopes and opens them again
///
/// Every call to [`Cipher::encrypt`] draws a fresh nonce from the OS RNG;
/// a nonce must never repeat under the same key.
#[derive(Clone)]
pub struct Cipher {
    aead: Aes256Gcm,
}

impl Cipher {
    /// Create a cipher from raw key bytes (must be exactly 32)
    pub fn new(key: &[u8]) -> Result<Self> {
        let key = EncryptionKey::from_bytes(key)?;
        Ok(Self::from_key(&key))
    }

    /// Create a cipher from an already validated key
    pub fn from_key(key: &EncryptionKey) -> Self {
        let aead = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self { aead }
    }

    /// Encrypt with a random nonce
    ///
    /// Returns: nonce (12 bytes) || ciphertext || tag (16 bytes)
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .aead
            .encrypt(nonce, plaintext)
            .map_err(|_| SealError::EncryptionFailed)?;

        let mut envelope = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);

        Ok(envelope)
    }

    /// Decrypt an envelope (expects nonce || ciphertext || tag)
    ///
    /// Any tampering or a wrong key yields `AuthenticationFailed`; no
    /// plaintext is ever returned for a packet that fails the tag check.
    pub fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>> {
        if envelope.len() < NONCE_SIZE {
            return Err(SealError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = envelope.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.aead
            .decrypt(nonce, ciphertext)
            .map_err(|_| SealError::AuthenticationFailed)
    }

    /// Encrypt a frame, enforcing the 1024-byte envelope size
    pub fn seal_frame(&self, frame: &[u8]) -> Result<Vec<u8>> {
        if frame.len() != FRAME_SIZE {
            return Err(SealError::InvalidFrameSize {
                expected: FRAME_SIZE,
                actual: frame.len(),
            });
        }

        let envelope = self.encrypt(frame)?;
        if envelope.len() != ENVELOPE_SIZE {
            return Err(SealError::InvalidEnvelopeSize {
                expected: ENVELOPE_SIZE,
                actual: envelope.len(),
            });
        }

        Ok(envelope)
    }

    /// Decrypt an envelope received off the wire
    ///
    /// Anything other than exactly 1024 bytes is malformed and is rejected
    /// before the AEAD runs.
    pub fn open_frame(&self, envelope: &[u8]) -> Result<Vec<u8>> {
        if envelope.len() != ENVELOPE_SIZE {
            return Err(SealError::InvalidEnvelopeSize {
                expected: ENVELOPE_SIZE,
                actual: envelope.len(),
            });
        }

        self.decrypt(envelope)
    }
}
