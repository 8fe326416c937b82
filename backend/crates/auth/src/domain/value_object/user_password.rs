//! User Password Value Object
//!
//! Domain wrappers around `platform::password`. Hashing itself is driven by
//! [`crate::application::credential_store::CredentialStore`], which moves
//! the work off the async executor.

use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input. Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Signup password: normalized and checked against the policy
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| {
            let message = match e {
                PasswordPolicyError::TooShort { min, .. } => {
                    format!("password must be at least {min} characters")
                }
                PasswordPolicyError::TooLong { max, .. } => {
                    format!("password must be at most {max} characters")
                }
                PasswordPolicyError::EmptyOrWhitespace => "password is required".to_string(),
                PasswordPolicyError::InvalidCharacter => {
                    "password contains invalid characters".to_string()
                }
            };
            AuthError::Validation(message)
        })?;

        Ok(Self(clear_text))
    }

    /// Login password: compared only, so no policy applies
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::for_comparison(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Stored password hash (PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub(crate) fn from_hashed(hashed: HashedPassword) -> Self {
        Self(hashed)
    }

    pub fn from_db(phc: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(phc))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time check; a malformed stored hash is a mismatch
    pub(crate) fn verify(&self, password: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(password.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
