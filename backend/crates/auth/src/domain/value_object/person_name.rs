//! Person Name Value Object
//!
//! First and last names share the same rule: 2 to 100 characters after
//! trimming, counted as Unicode scalar values.

use derive_more::Display;

use crate::error::{AuthError, AuthResult};

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name; `field` names the request field in the error message.
    pub fn new(raw: impl AsRef<str>, field: &str) -> AuthResult<Self> {
        let name = raw.as_ref().trim();
        let length = name.chars().count();

        if length == 0 {
            return Err(AuthError::Validation(format!("{field} is required")));
        }
        if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&length) {
            return Err(AuthError::Validation(format!(
                "{field} must be between {NAME_MIN_LENGTH} and {NAME_MAX_LENGTH} characters"
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(AuthError::Validation(format!(
                "{field} contains invalid characters"
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        assert!(PersonName::new("A", "first_name").is_err());
        assert!(PersonName::new("Al", "first_name").is_ok());
        assert!(PersonName::new("a".repeat(100), "first_name").is_ok());
        assert!(PersonName::new("a".repeat(101), "first_name").is_err());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 2 characters, 6 bytes
        assert!(PersonName::new("太郎", "first_name").is_ok());
    }

    #[test]
    fn test_error_names_the_field() {
        match PersonName::new("", "last_name") {
            Err(AuthError::Validation(msg)) => assert_eq!(msg, "last_name is required"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
