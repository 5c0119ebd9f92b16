//! Random salts, tokens, PINs and generated passwords.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::{CryptoError, SALT_LENGTH};

const MIN_TOKEN_BYTES: usize = 32;
const MIN_GENERATED_PASSWORD_LENGTH: usize = 8;

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!#%+-=?@^_";

/// Fills `buffer` from the operating system random source.
pub fn fill_random(buffer: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::fill(buffer).map_err(|error| CryptoError::Random(error.to_string()))
}

/// Returns 32 random bytes.
pub fn generate_salt() -> Result<[u8; SALT_LENGTH], CryptoError> {
    let mut salt = [0u8; SALT_LENGTH];
    fill_random(&mut salt)?;
    Ok(salt)
}

/// Returns URL-safe base64 of `max(length, 32)` random bytes.
pub fn generate_secure_token(length: usize) -> Result<String, CryptoError> {
    let mut bytes = vec![0u8; length.max(MIN_TOKEN_BYTES)];
    fill_random(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Returns `length` uniformly distributed decimal digits.
pub fn generate_numeric_pin(length: usize) -> Result<String, CryptoError> {
    let mut pin = String::with_capacity(length);
    while pin.len() < length {
        let index = random_index(10)?;
        pin.push(char::from(b'0' + index as u8));
    }

    Ok(pin)
}

/// Returns a random password that contains an uppercase letter, a lowercase
/// letter, a digit and a symbol.
///
/// Lengths below 8 are raised to 8.
pub fn generate_password(length: usize) -> Result<String, CryptoError> {
    let length = length.max(MIN_GENERATED_PASSWORD_LENGTH);
    let classes = [UPPER, LOWER, DIGITS, SYMBOLS];
    let alphabet: Vec<u8> = classes.concat();

    let mut characters = Vec::with_capacity(length);
    for class in classes {
        characters.push(class[random_index(class.len())?]);
    }
    while characters.len() < length {
        characters.push(alphabet[random_index(alphabet.len())?]);
    }

    for upper in (1..characters.len()).rev() {
        let swap_with = random_index(upper + 1)?;
        characters.swap(upper, swap_with);
    }

    Ok(characters.into_iter().map(char::from).collect())
}

/// Draws an unbiased index in `0..bound` by rejection sampling.
fn random_index(bound: usize) -> Result<usize, CryptoError> {
    let bound = u32::try_from(bound)
        .map_err(|_| CryptoError::Random("index bound exceeds u32".to_owned()))?;
    if bound == 0 {
        return Err(CryptoError::Random("index bound must be positive".to_owned()));
    }

    let zone = u32::MAX - (u32::MAX % bound);
    loop {
        let mut bytes = [0u8; 4];
        fill_random(&mut bytes)?;
        let value = u32::from_le_bytes(bytes);
        if value < zone {
            return Ok((value % bound) as usize);
        }
    }
}
