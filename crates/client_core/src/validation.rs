//! Local field validation for the registration form.

use thiserror::Error;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;
pub const AGE_MIN: i64 = 0;
pub const AGE_MAX: i64 = 120;

pub const USERNAME_FIELD: &str = "username";
pub const AGE_FIELD: &str = "age";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("username is required")]
    UsernameRequired,
    #[error("username must be at least 3 characters")]
    UsernameTooShort,
    #[error("username must be at most 20 characters")]
    UsernameTooLong,
    #[error("username may only contain letters, digits and underscores")]
    UsernameInvalidCharacters,
    #[error("age is required")]
    AgeRequired,
    #[error("age must be a whole number")]
    AgeNotInteger,
    #[error("age must not be below 0")]
    AgeTooLow,
    #[error("age must not exceed 120")]
    AgeTooHigh,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::UsernameRequired
            | Self::UsernameTooShort
            | Self::UsernameTooLong
            | Self::UsernameInvalidCharacters => USERNAME_FIELD,
            Self::AgeRequired | Self::AgeNotInteger | Self::AgeTooLow | Self::AgeTooHigh => {
                AGE_FIELD
            }
        }
    }
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if len > USERNAME_MAX_LEN {
        return Err(ValidationError::UsernameTooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::UsernameInvalidCharacters);
    }
    Ok(())
}

/// Validates the raw age input and returns the parsed value.
pub fn validate_age(age: &str) -> Result<i64, ValidationError> {
    let age = age.trim();
    if age.is_empty() {
        return Err(ValidationError::AgeRequired);
    }
    let parsed: i64 = age.parse().map_err(|_| ValidationError::AgeNotInteger)?;
    if parsed < AGE_MIN {
        return Err(ValidationError::AgeTooLow);
    }
    if parsed > AGE_MAX {
        return Err(ValidationError::AgeTooHigh);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_usernames_within_bounds_and_charset() {
        for name in ["abc", "bob_42", "A_B_C", "x".repeat(20).as_str(), "___"] {
            assert_eq!(validate_username(name), Ok(()), "{name}");
        }
    }

    #[test]
    fn rejects_usernames_with_matching_reason() {
        assert_eq!(
            validate_username(""),
            Err(ValidationError::UsernameRequired)
        );
        assert_eq!(
            validate_username("ab"),
            Err(ValidationError::UsernameTooShort)
        );
        assert_eq!(
            validate_username(&"y".repeat(21)),
            Err(ValidationError::UsernameTooLong)
        );
        assert_eq!(
            validate_username("bob smith"),
            Err(ValidationError::UsernameInvalidCharacters)
        );
        assert_eq!(
            validate_username("bob-smith"),
            Err(ValidationError::UsernameInvalidCharacters)
        );
        assert_eq!(
            validate_username("zoë_123"),
            Err(ValidationError::UsernameInvalidCharacters)
        );
    }

    #[test]
    fn accepts_ages_in_range() {
        assert_eq!(validate_age("0"), Ok(0));
        assert_eq!(validate_age("42"), Ok(42));
        assert_eq!(validate_age(" 120 "), Ok(120));
    }

    #[test]
    fn rejects_ages_with_matching_reason() {
        assert_eq!(validate_age(""), Err(ValidationError::AgeRequired));
        assert_eq!(validate_age("abc"), Err(ValidationError::AgeNotInteger));
        assert_eq!(validate_age("12.5"), Err(ValidationError::AgeNotInteger));
        assert_eq!(validate_age("-1"), Err(ValidationError::AgeTooLow));
        assert_eq!(validate_age("121"), Err(ValidationError::AgeTooHigh));
    }

    #[test]
    fn errors_name_their_field_and_render_messages() {
        assert_eq!(ValidationError::UsernameTooShort.field(), USERNAME_FIELD);
        assert_eq!(ValidationError::AgeTooHigh.field(), AGE_FIELD);
        assert_eq!(
            ValidationError::UsernameTooShort.to_string(),
            "username must be at least 3 characters"
        );
        assert_eq!(ValidationError::AgeTooHigh.to_string(), "age must not exceed 120");
    }
}
