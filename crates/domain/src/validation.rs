//! Canonical forms and syntactic rules for user-supplied identifiers and
//! secrets.
//!
//! Normalization is idempotent. Validators expect the normalized value.

use tessera_core::{AppError, AppResult};

/// Maximum email length (RFC 5321 path limit).
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length.
pub const PASSWORD_MAX_LENGTH: usize = 72;

/// Minimum username length.
pub const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length.
pub const USERNAME_MAX_LENGTH: usize = 32;

/// Maximum display name length.
pub const DISPLAY_NAME_MAX_LENGTH: usize = 128;

/// Minimum role name length.
pub const ROLE_NAME_MIN_LENGTH: usize = 2;

/// Maximum role name length.
pub const ROLE_NAME_MAX_LENGTH: usize = 64;

/// Minimum PIN length.
pub const PIN_MIN_LENGTH: usize = 4;

/// Maximum PIN length.
pub const PIN_MAX_LENGTH: usize = 8;

/// Lowercases and trims an email address.
#[must_use]
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Lowercases, trims whitespace and strips leading or trailing `.`, `_`, `-`.
#[must_use]
pub fn normalize_username(value: &str) -> String {
    value
        .to_lowercase()
        .trim_matches(|character: char| {
            character.is_whitespace() || matches!(character, '.' | '_' | '-')
        })
        .to_owned()
}

/// Trims a display name, keeping its case.
#[must_use]
pub fn normalize_display_name(value: &str) -> String {
    value.trim().to_owned()
}

/// Lowercases and trims a role name.
#[must_use]
pub fn normalize_role_name(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Checks the structure of a normalized email address.
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.is_empty() {
        return Err(invalid_email("email address must not be empty"));
    }

    if email.len() > EMAIL_MAX_LENGTH {
        return Err(AppError::InvalidEmail(format!(
            "email address must not exceed {EMAIL_MAX_LENGTH} characters"
        )));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid_email("email address must not contain whitespace"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid_email("email address must contain exactly one '@'"));
    };
    if domain.contains('@') {
        return Err(invalid_email("email address must contain exactly one '@'"));
    }

    if local.is_empty() {
        return Err(invalid_email("email local part must not be empty"));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid_email(
            "email domain must contain dot-separated labels",
        ));
    }

    let top_level = labels.last().copied().unwrap_or_default();
    if top_level.chars().count() < 2 {
        return Err(invalid_email(
            "email top-level domain must be at least 2 characters",
        ));
    }

    Ok(())
}

/// Checks password length and character classes.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::InvalidPassword(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::InvalidPassword(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    let requirements = [
        (
            password.chars().any(char::is_uppercase),
            "an uppercase letter",
        ),
        (
            password.chars().any(char::is_lowercase),
            "a lowercase letter",
        ),
        (password.chars().any(|c| c.is_ascii_digit()), "a digit"),
        (
            password.chars().any(|c| !c.is_alphanumeric()),
            "a symbol",
        ),
    ];

    for (satisfied, description) in requirements {
        if !satisfied {
            return Err(AppError::InvalidPassword(format!(
                "password must contain {description}"
            )));
        }
    }

    Ok(())
}

/// Checks a normalized username.
pub fn validate_username(username: &str) -> AppResult<()> {
    let length = username.chars().count();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
        return Err(AppError::InvalidUsername(format!(
            "username must be between {USERNAME_MIN_LENGTH} and {USERNAME_MAX_LENGTH} characters"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AppError::InvalidUsername(
            "username may only contain letters, digits, '_', '-' and '.'".to_owned(),
        ));
    }

    Ok(())
}

/// Checks a trimmed display name.
pub fn validate_display_name(name: &str) -> AppResult<()> {
    let length = name.chars().count();
    if length == 0 {
        return Err(AppError::InvalidDisplayName(
            "display name must not be empty".to_owned(),
        ));
    }

    if length > DISPLAY_NAME_MAX_LENGTH {
        return Err(AppError::InvalidDisplayName(format!(
            "display name must not exceed {DISPLAY_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Checks a normalized role name.
pub fn validate_role_name(name: &str) -> AppResult<()> {
    let length = name.chars().count();
    if !(ROLE_NAME_MIN_LENGTH..=ROLE_NAME_MAX_LENGTH).contains(&length) {
        return Err(AppError::InvalidRoleName(format!(
            "role name must be between {ROLE_NAME_MIN_LENGTH} and {ROLE_NAME_MAX_LENGTH} characters"
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    {
        return Err(AppError::InvalidRoleName(
            "role name may only contain letters, digits, '_' and '-'".to_owned(),
        ));
    }

    Ok(())
}

/// Checks that a PIN is 4 to 8 ASCII digits.
pub fn validate_pin(pin: &str) -> AppResult<()> {
    if !(PIN_MIN_LENGTH..=PIN_MAX_LENGTH).contains(&pin.len()) {
        return Err(AppError::InvalidPin(format!(
            "pin must be between {PIN_MIN_LENGTH} and {PIN_MAX_LENGTH} digits"
        )));
    }

    if !pin.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(AppError::InvalidPin("pin may only contain digits".to_owned()));
    }

    Ok(())
}

fn invalid_email(message: &str) -> AppError {
    AppError::InvalidEmail(message.to_owned())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn email_is_lowercased_and_trimmed() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn well_formed_emails_are_accepted() {
        for email in ["a@b.io", "first.last@mail.example.com", "x+tag@domain.org"] {
            assert!(validate_email(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in [
            "",
            "noatsign",
            "two@@example.com",
            "a@b@example.com",
            "@example.com",
            "user@nodot",
            "user@example.c",
            "user@.com",
            "user@example..com",
            "us er@example.com",
        ] {
            assert!(
                matches!(validate_email(email), Err(AppError::InvalidEmail(_))),
                "{email}"
            );
        }
    }

    #[test]
    fn overlong_email_is_rejected() {
        let email = format!("{}@example.com", "a".repeat(EMAIL_MAX_LENGTH));
        assert!(validate_email(&email).is_err());
    }

    #[test]
    fn password_requires_every_class() {
        assert!(validate_password("Password123!").is_ok());
        assert!(validate_password("password123!").is_err());
        assert!(validate_password("PASSWORD123!").is_err());
        assert!(validate_password("Password!!!!").is_err());
        assert!(validate_password("Password1234").is_err());
    }

    #[test]
    fn password_length_bounds_are_enforced() {
        assert!(validate_password("Pa1!").is_err());
        assert!(validate_password("Pass12!x").is_ok());

        let at_limit = format!("Aa1!{}", "x".repeat(PASSWORD_MAX_LENGTH - 4));
        assert!(validate_password(&at_limit).is_ok());
        let over_limit = format!("{at_limit}y");
        assert!(matches!(
            validate_password(&over_limit),
            Err(AppError::InvalidPassword(_))
        ));
    }

    #[test]
    fn username_normalization_strips_separators() {
        assert_eq!(normalize_username("  ._Alice-_ "), "alice");
        assert_eq!(normalize_username("Bob.Smith"), "bob.smith");
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LENGTH + 1)).is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("alice@home").is_err());
    }

    #[test]
    fn display_name_keeps_case() {
        assert_eq!(normalize_display_name("  Ada Lovelace "), "Ada Lovelace");
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name(&"n".repeat(DISPLAY_NAME_MAX_LENGTH)).is_ok());
        assert!(validate_display_name(&"n".repeat(DISPLAY_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn role_name_rules() {
        assert_eq!(normalize_role_name(" Content-Editor "), "content-editor");
        assert!(validate_role_name("content-editor").is_ok());
        assert!(validate_role_name("a").is_err());
        assert!(validate_role_name("has.dot").is_err());
        assert!(validate_role_name(&"r".repeat(ROLE_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn pin_rules() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("12345678").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("123456789").is_err());
        assert!(matches!(validate_pin("12a4"), Err(AppError::InvalidPin(_))));
    }

    proptest! {
        #[test]
        fn email_normalization_is_idempotent(raw in "\\PC{0,40}") {
            let once = normalize_email(&raw);
            prop_assert_eq!(normalize_email(&once), once);
        }

        #[test]
        fn username_normalization_is_idempotent(raw in "[ ._\\-A-Za-z0-9]{0,40}") {
            let once = normalize_username(&raw);
            prop_assert_eq!(normalize_username(&once), once);
        }

        #[test]
        fn role_name_normalization_is_idempotent(raw in "\\PC{0,40}") {
            let once = normalize_role_name(&raw);
            prop_assert_eq!(normalize_role_name(&once), once);
        }

        #[test]
        fn digit_strings_of_valid_length_are_pins(pin in "[0-9]{4,8}") {
            prop_assert!(validate_pin(&pin).is_ok());
        }
    }
}
