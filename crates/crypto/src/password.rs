//! Argon2id password derivation.
//!
//! Stores a raw 32-byte derived key next to a 32-byte salt instead of a PHC
//! string, so the cost parameters live in configuration.

use argon2::{Algorithm, Argon2, Params, Version};
use subtle::ConstantTimeEq;

use crate::CryptoError;

/// Required salt length in bytes.
pub const SALT_LENGTH: usize = 32;

/// Derived key length in bytes.
pub const HASH_LENGTH: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl KdfParams {
    /// Creates explicit parameters.
    #[must_use]
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }
}

impl Default for KdfParams {
    /// time=1, memory=64 MiB, parallelism=4.
    fn default() -> Self {
        Self::new(64 * 1024, 1, 4)
    }
}

/// Derives a 32-byte key with the default parameters.
///
/// Returns `None` when the salt is not exactly 32 bytes.
#[must_use]
pub fn hash_password(password: &str, salt: &[u8]) -> Option<[u8; HASH_LENGTH]> {
    hash_password_with(password, salt, KdfParams::default()).ok()
}

/// Derives a 32-byte key with explicit parameters.
pub fn hash_password_with(
    password: &str,
    salt: &[u8],
    params: KdfParams,
) -> Result<[u8; HASH_LENGTH], CryptoError> {
    if salt.len() != SALT_LENGTH {
        return Err(CryptoError::InvalidSalt {
            expected: SALT_LENGTH,
            actual: salt.len(),
        });
    }

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(HASH_LENGTH),
    )
    .map_err(|error| CryptoError::PasswordHash(error.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut output = [0u8; HASH_LENGTH];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|error| CryptoError::PasswordHash(error.to_string()))?;

    Ok(output)
}

/// Recomputes the key with the default parameters and compares in constant time.
#[must_use]
pub fn verify_password(password: &str, hash: &[u8], salt: &[u8]) -> bool {
    verify_password_with(password, hash, salt, KdfParams::default())
}

/// Recomputes the key with explicit parameters and compares in constant time.
#[must_use]
pub fn verify_password_with(password: &str, hash: &[u8], salt: &[u8], params: KdfParams) -> bool {
    match hash_password_with(password, salt, params) {
        Ok(computed) => computed.as_slice().ct_eq(hash).into(),
        Err(_) => false,
    }
}
