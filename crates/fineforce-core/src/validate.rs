//! Local form validation. Failures here block an action before any remote call.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide an image for analysis.")]
    MissingImage,
    #[error("Please enter a valid email address for the notification.")]
    InvalidEmail,
    #[error("Cannot save, violation type is not specified.")]
    UnresolvedType,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters long.")]
    PasswordTooShort,
}

/// Basic `local@domain.tld` shape check.
pub fn is_valid_email(s: &str) -> bool {
    EMAIL.is_match(s)
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}
