//! Application Configuration
//!
//! Built once at startup and shared behind `Arc`.

use std::fmt;
use std::time::Duration;

use platform::password::HashCost;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for access and refresh tokens
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime (24 hours)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (168 hours)
    pub refresh_token_ttl: Duration,
    /// Pending registration lifetime (24 hours)
    pub verification_ttl: Duration,
    /// Upper bound for every store operation (100 seconds)
    pub store_timeout: Duration,
    /// Upper bound for handing the verification email to the relay
    pub mail_timeout: Duration,
    /// Link target in the verification email; `?token=...` is appended
    pub verify_link_base: String,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id parameters for new hashes
    pub password_cost: HashCost,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            access_token_ttl: Duration::from_secs(24 * 3600),
            refresh_token_ttl: Duration::from_secs(168 * 3600),
            verification_ttl: Duration::from_secs(24 * 3600),
            store_timeout: Duration::from_secs(100),
            mail_timeout: Duration::from_secs(30),
            verify_link_base: "http://localhost:8000/users/verify-email".to_string(),
            password_pepper: None,
            password_cost: HashCost::production(),
        }
    }
}

impl AuthConfig {
    /// Config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }

    /// Cheap hashing and a random secret (for tests)
    pub fn for_tests() -> Self {
        Self {
            password_cost: HashCost::minimal(),
            ..Self::with_random_secret()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("store_timeout", &self.store_timeout)
            .field("mail_timeout", &self.mail_timeout)
            .field("verify_link_base", &self.verify_link_base)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("password_cost", &self.password_cost)
            .finish()
    }
}
