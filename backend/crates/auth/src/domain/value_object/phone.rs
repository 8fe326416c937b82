//! Phone Value Object

use derive_more::Display;

use crate::error::{AuthError, AuthResult};

const PHONE_MAX_LENGTH: usize = 32;

/// Phone number as entered, trimmed. Unique across identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct Phone(String);

impl Phone {
    pub fn new(raw: impl AsRef<str>) -> AuthResult<Self> {
        let phone = raw.as_ref().trim();

        if phone.is_empty() {
            return Err(AuthError::Validation("phone is required".to_string()));
        }
        if phone.chars().count() > PHONE_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "phone must be at most {PHONE_MAX_LENGTH} characters"
            )));
        }
        if phone.chars().any(char::is_control) {
            return Err(AuthError::Validation(
                "phone contains invalid characters".to_string(),
            ));
        }

        Ok(Self(phone.to_string()))
    }

    pub fn from_db(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone() {
        assert_eq!(Phone::new(" 555 ").unwrap().as_str(), "555");
        assert!(Phone::new("+81 90-1234-5678").is_ok());
        assert!(Phone::new("").is_err());
        assert!(Phone::new("\t").is_err());
        assert!(Phone::new("5".repeat(33)).is_err());
        assert!(Phone::new("555\u{0000}").is_err());
    }
}
