use tessera_crypto::{
    CryptoError, compute_lookup_hash_bytes, decrypt_raw, encrypt, generate_salt,
    hash_password_with, verify_password_with,
};

use super::*;

/// Salt for the derivation that runs when sign-in finds no account.
const DUMMY_SALT: [u8; tessera_crypto::SALT_LENGTH] = [0u8; tessera_crypto::SALT_LENGTH];

impl AuthnService {
    /// Keyed lookup hash of an already normalized value.
    pub(super) fn lookup_hash(&self, value: &str) -> AppResult<Vec<u8>> {
        compute_lookup_hash_bytes(value, &self.config.signing_key)
            .map(|digest| digest.to_vec())
            .ok_or_else(|| AppError::Config("signing key must be 32 bytes".to_owned()))
    }

    /// Encrypts a normalized value and pairs it with its lookup hash.
    pub(super) fn seal(&self, value: &str) -> AppResult<SealedSecret> {
        let parts = encrypt(value.as_bytes(), &self.config.encryption_key)
            .map_err(|error| AppError::EncryptionFailed(error.to_string()))?;
        let raw = parts
            .decode()
            .map_err(|error| AppError::EncryptionFailed(error.to_string()))?;

        Ok(SealedSecret {
            ciphertext: raw.ciphertext,
            iv: raw.iv,
            tag: raw.tag,
            lookup: self.lookup_hash(value)?,
        })
    }

    /// Decrypts a sealed value back to its plaintext.
    pub(super) fn open(&self, sealed: &SealedSecret) -> AppResult<String> {
        let plaintext = decrypt_raw(
            &sealed.ciphertext,
            &sealed.iv,
            &sealed.tag,
            &self.config.encryption_key,
        )
        .map_err(|error| AppError::DecryptionFailed(error.to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::DecryptionFailed("plaintext is not valid utf-8".to_owned()))
    }

    /// Derives a fresh salt and hash for a validated password.
    pub(super) fn derive_password(&self, password: &str) -> AppResult<PasswordCredential> {
        let salt = generate_salt().map_err(|error| AppError::PasswordHashFailed(error.to_string()))?;
        let hash = hash_password_with(password, &salt, self.config.kdf)
            .map_err(|error| AppError::PasswordHashFailed(error.to_string()))?;

        Ok(PasswordCredential {
            hash: hash.to_vec(),
            salt: salt.to_vec(),
        })
    }

    pub(super) fn password_matches(&self, user: &User, password: &str) -> bool {
        verify_password_with(
            password,
            &user.password.hash,
            &user.password.salt,
            self.config.kdf,
        )
    }

    /// Burns one derivation so a missing account costs the same as a wrong
    /// password.
    pub(super) fn dummy_derivation(&self, password: &str) {
        let _ = hash_password_with(password, &DUMMY_SALT, self.config.kdf);
    }

    pub(super) fn token_error(error: CryptoError) -> AppError {
        match error {
            CryptoError::TokenExpired => AppError::TokenExpired,
            other => AppError::TokenVerificationFailed(other.to_string()),
        }
    }
}
