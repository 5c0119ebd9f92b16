//! AES-256-GCM sealing with the tag split from the ciphertext.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::CryptoError;

/// Required AES-256 key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// GCM nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Base64-encoded output of [`encrypt`], one field per storage column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedParts {
    /// Ciphertext without the trailing tag.
    pub ciphertext: String,
    /// Random 12-byte nonce.
    pub iv: String,
    /// 16-byte authentication tag.
    pub tag: String,
}

/// Decoded sealed parts as persisted by stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSealedParts {
    /// Ciphertext without the trailing tag.
    pub ciphertext: Vec<u8>,
    /// Random 12-byte nonce.
    pub iv: Vec<u8>,
    /// 16-byte authentication tag.
    pub tag: Vec<u8>,
}

impl SealedParts {
    /// Encodes raw column bytes back into their base64 form.
    #[must_use]
    pub fn from_raw(ciphertext: &[u8], iv: &[u8], tag: &[u8]) -> Self {
        Self {
            ciphertext: STANDARD.encode(ciphertext),
            iv: STANDARD.encode(iv),
            tag: STANDARD.encode(tag),
        }
    }

    /// Decodes the base64 fields into bytes for persistence.
    pub fn decode(&self) -> Result<RawSealedParts, CryptoError> {
        let ciphertext = STANDARD
            .decode(self.ciphertext.as_bytes())
            .map_err(|_| CryptoError::InvalidCiphertext)?;
        let iv = STANDARD
            .decode(self.iv.as_bytes())
            .map_err(|_| CryptoError::InvalidIv)?;
        let tag = STANDARD
            .decode(self.tag.as_bytes())
            .map_err(|_| CryptoError::InvalidTag)?;

        Ok(RawSealedParts {
            ciphertext,
            iv,
            tag,
        })
    }
}

/// Seals `plaintext` under a 32-byte key with a fresh random nonce.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<SealedParts, CryptoError> {
    let cipher = cipher_for(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|error| CryptoError::Encryption(error.to_string()))?;

    // aes-gcm appends the tag; the columns keep it separate.
    let tag = sealed.split_off(sealed.len().saturating_sub(TAG_LENGTH));

    Ok(SealedParts {
        ciphertext: STANDARD.encode(&sealed),
        iv: STANDARD.encode(nonce.as_slice()),
        tag: STANDARD.encode(&tag),
    })
}

/// Opens base64-encoded sealed parts.
pub fn decrypt(parts: &SealedParts, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let raw = parts.decode()?;
    decrypt_raw(&raw.ciphertext, &raw.iv, &raw.tag, key)
}

/// Opens sealed parts already decoded to bytes.
pub fn decrypt_raw(
    ciphertext: &[u8],
    iv: &[u8],
    tag: &[u8],
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(key)?;

    let nonce_array: [u8; NONCE_LENGTH] = iv.try_into().map_err(|_| CryptoError::InvalidIv)?;
    if tag.len() != TAG_LENGTH {
        return Err(CryptoError::InvalidTag);
    }

    let nonce = Nonce::from(nonce_array);
    let mut payload = Vec::with_capacity(ciphertext.len() + tag.len());
    payload.extend_from_slice(ciphertext);
    payload.extend_from_slice(tag);

    cipher
        .decrypt(&nonce, payload.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed)
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    if key.len() != KEY_LENGTH {
        return Err(CryptoError::InvalidKey {
            expected: KEY_LENGTH,
            actual: key.len(),
        });
    }

    Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey {
        expected: KEY_LENGTH,
        actual: key.len(),
    })
}
