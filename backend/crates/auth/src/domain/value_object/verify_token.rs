//! Verification Token
//!
//! One-time opaque token mailed to the registrant. 32 random bytes from the
//! OS CSPRNG, base64url without padding (43 characters, URL safe as-is).

use derive_more::Display;

/// Random bytes per token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Longest value accepted from a request before it is even looked up
const TOKEN_MAX_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct VerifyToken(String);

impl VerifyToken {
    pub fn generate() -> Self {
        Self(platform::crypto::random_token(TOKEN_BYTES))
    }

    /// Accept a token from a query string. `None` when blank or oversized.
    pub fn from_request(raw: &str) -> Option<Self> {
        let token = raw.trim();
        if token.is_empty() || token.len() > TOKEN_MAX_LENGTH {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn from_db(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let a = VerifyToken::generate();
        let b = VerifyToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 43);
        assert!(
            a.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_from_request() {
        assert!(VerifyToken::from_request("").is_none());
        assert!(VerifyToken::from_request("   ").is_none());
        assert!(VerifyToken::from_request(&"a".repeat(129)).is_none());
        assert_eq!(VerifyToken::from_request(" abc ").unwrap().as_str(), "abc");
    }
}
