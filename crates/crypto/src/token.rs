//! PASETO v4.public session tokens.
//!
//! Signing and verification go through `pasetors`; this module owns the
//! claim layout, key length checks and expiry.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use ed25519_dalek::SigningKey;
use pasetors::Public;
use pasetors::errors::Error as PasetorsError;
use pasetors::keys::{AsymmetricPublicKey, AsymmetricSecretKey};
use pasetors::token::UntrustedToken;
use pasetors::version4::{PublicToken, V4};
use serde::{Deserialize, Serialize};

use crate::CryptoError;

/// Version and purpose prefix of every token.
pub const TOKEN_HEADER: &str = "v4.public.";

/// Ed25519 secret key length (seed followed by public key).
pub const PRIVATE_KEY_LENGTH: usize = 64;

/// Ed25519 public key length.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject, usually the user id.
    pub subject: String,
    /// Session identifier.
    pub session_id: String,
    /// Intended audience.
    pub audience: String,
    /// Free-form string context.
    pub context: BTreeMap<String, String>,
    /// Expiry as unix seconds.
    pub expires_at: i64,
    /// Authorization data version at issuance.
    pub authz_version: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    sid: String,
    aud: String,
    exp: String,
    iat: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    ctx: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authz_ver: Option<i64>,
}

/// Signs `claims` with a 64-byte Ed25519 secret key at the current time.
pub fn generate_token(claims: &TokenClaims, private_key: &[u8]) -> Result<String, CryptoError> {
    generate_token_at(claims, private_key, Utc::now().timestamp())
}

/// Signs `claims` with `now_unix` recorded as the issue time.
pub fn generate_token_at(
    claims: &TokenClaims,
    private_key: &[u8],
    now_unix: i64,
) -> Result<String, CryptoError> {
    let keypair = signing_key_from(private_key)?.to_keypair_bytes();
    let secret_key =
        AsymmetricSecretKey::<V4>::from(&keypair).map_err(|error| map_paseto_error(&error))?;

    let wire = WireClaims {
        sub: claims.subject.clone(),
        sid: claims.session_id.clone(),
        aud: claims.audience.clone(),
        exp: rfc3339_from_unix(claims.expires_at)?,
        iat: rfc3339_from_unix(now_unix)?,
        ctx: claims.context.clone(),
        authz_ver: claims.authz_version,
    };
    let payload =
        serde_json::to_vec(&wire).map_err(|error| CryptoError::TokenEncoding(error.to_string()))?;

    PublicToken::sign(&secret_key, &payload, None, None)
        .map_err(|error| CryptoError::TokenEncoding(format!("{error:?}")))
}

/// Verifies signature and expiry against the current time.
pub fn verify_token(token: &str, public_key: &[u8]) -> Result<TokenClaims, CryptoError> {
    verify_token_at(token, public_key, Utc::now().timestamp())
}

/// Verifies signature and expiry against `now_unix`.
pub fn verify_token_at(
    token: &str,
    public_key: &[u8],
    now_unix: i64,
) -> Result<TokenClaims, CryptoError> {
    if public_key.is_empty() {
        return Err(CryptoError::MissingKey);
    }
    let key_bytes: [u8; PUBLIC_KEY_LENGTH] =
        public_key
            .try_into()
            .map_err(|_| CryptoError::InvalidKey {
                expected: PUBLIC_KEY_LENGTH,
                actual: public_key.len(),
            })?;
    let verifying_key =
        AsymmetricPublicKey::<V4>::from(&key_bytes).map_err(|_| CryptoError::InvalidKeyMaterial)?;

    let untrusted = UntrustedToken::<Public, V4>::try_from(token)
        .map_err(|error| map_paseto_error(&error))?;
    let trusted = PublicToken::verify(&verifying_key, &untrusted, None, None)
        .map_err(|error| map_paseto_error(&error))?;

    let wire: WireClaims =
        serde_json::from_str(trusted.payload()).map_err(|_| invalid("malformed claims"))?;
    let expires_at = unix_from_rfc3339(&wire.exp)?;
    if expires_at <= now_unix {
        return Err(CryptoError::TokenExpired);
    }

    Ok(TokenClaims {
        subject: wire.sub,
        session_id: wire.sid,
        audience: wire.aud,
        context: wire.ctx,
        expires_at,
        authz_version: wire.authz_ver,
    })
}

/// Derives the 32-byte verifying key from a 64-byte secret key.
pub fn public_key_from_private(
    private_key: &[u8],
) -> Result<[u8; PUBLIC_KEY_LENGTH], CryptoError> {
    Ok(signing_key_from(private_key)?.verifying_key().to_bytes())
}

/// Expands a 32-byte seed into a 64-byte secret key.
#[must_use]
pub fn keypair_from_seed(seed: &[u8; 32]) -> [u8; PRIVATE_KEY_LENGTH] {
    SigningKey::from_bytes(seed).to_keypair_bytes()
}

/// Generates a random 64-byte secret key.
pub fn generate_keypair() -> Result<[u8; PRIVATE_KEY_LENGTH], CryptoError> {
    let mut seed = [0u8; 32];
    crate::fill_random(&mut seed)?;
    Ok(keypair_from_seed(&seed))
}

fn keypair_bytes(private_key: &[u8]) -> Result<[u8; PRIVATE_KEY_LENGTH], CryptoError> {
    if private_key.is_empty() {
        return Err(CryptoError::MissingKey);
    }
    private_key
        .try_into()
        .map_err(|_| CryptoError::InvalidKey {
            expected: PRIVATE_KEY_LENGTH,
            actual: private_key.len(),
        })
}

fn signing_key_from(private_key: &[u8]) -> Result<SigningKey, CryptoError> {
    let keypair = keypair_bytes(private_key)?;
    SigningKey::from_keypair_bytes(&keypair).map_err(|_| CryptoError::InvalidKeyMaterial)
}

fn map_paseto_error(error: &PasetorsError) -> CryptoError {
    match error {
        PasetorsError::Key => CryptoError::InvalidKeyMaterial,
        PasetorsError::Base64 => invalid("malformed encoding"),
        PasetorsError::TokenValidation => invalid("signature mismatch"),
        PasetorsError::FooterParsing => invalid("malformed footer"),
        _ => invalid("malformed token"),
    }
}

fn invalid(reason: &str) -> CryptoError {
    CryptoError::InvalidToken(reason.to_owned())
}

fn rfc3339_from_unix(unix_seconds: i64) -> Result<String, CryptoError> {
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .map(|timestamp| timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| CryptoError::TokenEncoding(format!("timestamp out of range: {unix_seconds}")))
}

fn unix_from_rfc3339(value: &str) -> Result<i64, CryptoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.timestamp())
        .map_err(|_| invalid("malformed expiry"))
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn keypair() -> [u8; PRIVATE_KEY_LENGTH] {
        keypair_from_seed(&[7u8; 32])
    }

    fn claims() -> TokenClaims {
        let mut context = BTreeMap::new();
        context.insert("tenant".to_owned(), "acme".to_owned());
        TokenClaims {
            subject: "user-1".to_owned(),
            session_id: "session-1".to_owned(),
            audience: "tessera".to_owned(),
            context,
            expires_at: NOW + 3600,
            authz_version: Some(3),
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() -> Result<(), CryptoError> {
        let private_key = keypair();
        let public_key = public_key_from_private(&private_key)?;

        let token = generate_token_at(&claims(), &private_key, NOW)?;
        assert!(token.starts_with(TOKEN_HEADER));

        let verified = verify_token_at(&token, &public_key, NOW + 10)?;
        assert_eq!(verified, claims());
        Ok(())
    }

    #[test]
    fn optional_claims_are_omitted_on_the_wire() -> Result<(), CryptoError> {
        let private_key = keypair();
        let public_key = public_key_from_private(&private_key)?;
        let bare = TokenClaims {
            context: BTreeMap::new(),
            authz_version: None,
            ..claims()
        };

        let token = generate_token_at(&bare, &private_key, NOW)?;
        let verified = verify_token_at(&token, &public_key, NOW)?;
        assert!(verified.context.is_empty());
        assert_eq!(verified.authz_version, None);
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<(), CryptoError> {
        let private_key = keypair();
        let public_key = public_key_from_private(&private_key)?;
        let token = generate_token_at(&claims(), &private_key, NOW)?;

        assert_eq!(
            verify_token_at(&token, &public_key, NOW + 3600),
            Err(CryptoError::TokenExpired)
        );
        Ok(())
    }

    #[test]
    fn tampered_payload_is_rejected() -> Result<(), CryptoError> {
        let private_key = keypair();
        let public_key = public_key_from_private(&private_key)?;
        let token = generate_token_at(&claims(), &private_key, NOW)?;

        let body = token.trim_start_matches(TOKEN_HEADER);
        let mut raw = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| invalid("test decode"))?;
        raw[2] ^= 0x01;
        let forged = format!("{TOKEN_HEADER}{}", URL_SAFE_NO_PAD.encode(raw));

        assert!(matches!(
            verify_token_at(&forged, &public_key, NOW),
            Err(CryptoError::InvalidToken(_))
        ));
        Ok(())
    }

    #[test]
    fn foreign_key_is_rejected() -> Result<(), CryptoError> {
        let token = generate_token_at(&claims(), &keypair(), NOW)?;
        let other = SigningKey::from_bytes(&[9u8; 32]).verifying_key().to_bytes();

        assert!(matches!(
            verify_token_at(&token, &other, NOW),
            Err(CryptoError::InvalidToken(_))
        ));
        Ok(())
    }

    #[test]
    fn generated_keypairs_are_usable() -> Result<(), CryptoError> {
        let private_key = generate_keypair()?;
        let public_key = public_key_from_private(&private_key)?;
        let token = generate_token_at(&claims(), &private_key, NOW)?;
        assert!(verify_token_at(&token, &public_key, NOW).is_ok());
        assert_ne!(generate_keypair()?, private_key);
        Ok(())
    }

    #[test]
    fn missing_keys_are_reported() {
        assert_eq!(
            generate_token_at(&claims(), &[], NOW),
            Err(CryptoError::MissingKey)
        );
        assert_eq!(
            verify_token_at("v4.public.abc", &[], NOW),
            Err(CryptoError::MissingKey)
        );
    }

    #[test]
    fn malformed_tokens_are_rejected() -> Result<(), CryptoError> {
        let public_key = public_key_from_private(&keypair())?;
        for token in ["v2.local.abc", "v4.public.", "v4.public.@@@", "v4.public.AAAA"] {
            assert!(matches!(
                verify_token_at(token, &public_key, NOW),
                Err(CryptoError::InvalidToken(_))
            ));
        }
        Ok(())
    }

    #[test]
    fn mismatched_keypair_halves_are_rejected() {
        let mut private_key = keypair();
        private_key[40] ^= 0xff;
        assert_eq!(
            generate_token_at(&claims(), &private_key, NOW),
            Err(CryptoError::InvalidKeyMaterial)
        );
    }
}
