//! Username and password rules for self-registration.

use crate::error::CoreError;

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 64;

/// Default minimum password length when none is configured.
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// Validate a username: non-blank, no surrounding whitespace, at most
/// [`MAX_USERNAME_LEN`] characters.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if username.trim().is_empty() {
        return Err(CoreError::Validation("Username must not be empty".into()));
    }
    if username.trim() != username {
        return Err(CoreError::Validation(
            "Username must not start or end with whitespace".into(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(CoreError::Validation(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate that a password meets the configured minimum length.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}
