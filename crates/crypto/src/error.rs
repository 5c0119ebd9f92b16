use thiserror::Error;

/// Failures raised by the cryptographic primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key material has the wrong length.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKey {
        /// Required key length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Key bytes have the right length but are not a valid key.
    #[error("invalid key material")]
    InvalidKeyMaterial,

    /// Salt has the wrong length.
    #[error("invalid salt length: expected {expected} bytes, got {actual}")]
    InvalidSalt {
        /// Required salt length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// The AEAD primitive refused to seal the plaintext.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Tag mismatch or corrupted sealed parts.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Ciphertext is not valid base64.
    #[error("invalid ciphertext encoding")]
    InvalidCiphertext,

    /// Nonce is not valid base64 or has the wrong length.
    #[error("invalid iv")]
    InvalidIv,

    /// Tag is not valid base64 or has the wrong length.
    #[error("invalid tag")]
    InvalidTag,

    /// Argon2 rejected its parameters or input.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// The operating system random source failed.
    #[error("random source failed: {0}")]
    Random(String),

    /// Token claims could not be encoded.
    #[error("token encoding failed: {0}")]
    TokenEncoding(String),

    /// Token is well formed and authentic but past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token is malformed or its signature does not verify.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// No key was supplied.
    #[error("missing key")]
    MissingKey,
}
