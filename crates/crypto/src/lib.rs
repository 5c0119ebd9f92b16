//! Cryptographic primitives used by the credential engine.
//!
//! Everything here is a pure function over bytes and strings: AES-256-GCM
//! sealing with split ciphertext/nonce/tag, keyed lookup hashes, Argon2id
//! password derivation, random material, and PASETO v4.public tokens.

#![forbid(unsafe_code)]

mod aead;
mod error;
mod lookup;
mod password;
mod random;
mod token;

pub use aead::{
    KEY_LENGTH, NONCE_LENGTH, RawSealedParts, SealedParts, TAG_LENGTH, decrypt, decrypt_raw,
    encrypt,
};
pub use error::CryptoError;
pub use lookup::{compute_lookup_hash, compute_lookup_hash_bytes};
pub use password::{
    HASH_LENGTH, KdfParams, SALT_LENGTH, hash_password, hash_password_with, verify_password,
    verify_password_with,
};
pub use random::{
    fill_random, generate_numeric_pin, generate_password, generate_salt, generate_secure_token,
};
pub use token::{
    PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, TOKEN_HEADER, TokenClaims, generate_keypair,
    generate_token, generate_token_at, keypair_from_seed, public_key_from_private, verify_token,
    verify_token_at,
};
