//! Credential Store
//!
//! Argon2id hashing and verification on the blocking thread pool, so a
//! 100ms+ hash never stalls the async executor.

use std::sync::Arc;

use platform::password::HashCost;

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct CredentialStore {
    pepper: Option<Arc<[u8]>>,
    cost: HashCost,
}

impl CredentialStore {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            pepper: config.pepper().map(Arc::from),
            cost: config.password_cost,
        }
    }

    /// Hash a signup password. Any failure is a fault, never a weaker hash.
    pub async fn hash(&self, password: RawPassword) -> AuthResult<UserPassword> {
        let pepper = self.pepper.clone();
        let cost = self.cost;

        let hashed = tokio::task::spawn_blocking(move || {
            password.inner().hash(pepper.as_deref(), cost)
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing task failed");
            AuthError::Internal("password hashing task failed".to_string())
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AuthError::Internal("password hashing failed".to_string())
        })?;

        Ok(UserPassword::from_hashed(hashed))
    }

    /// `false` on mismatch, on a malformed stored hash, and if the blocking
    /// task itself dies
    pub async fn verify(&self, password: RawPassword, stored: &UserPassword) -> bool {
        let pepper = self.pepper.clone();
        let stored = stored.clone();

        tokio::task::spawn_blocking(move || stored.verify(&password, pepper.as_deref()))
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Password verification task failed");
                false
            })
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .field("cost", &self.cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(&AuthConfig::for_tests())
    }

    fn raw(p: &str) -> RawPassword {
        RawPassword::new(p.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_verify_matches_only_same_password() {
        let store = store();
        let hashed = store.hash(raw("secret1")).await.unwrap();

        assert!(store.verify(RawPassword::for_login("secret1".into()), &hashed).await);
        assert!(!store.verify(RawPassword::for_login("secret2".into()), &hashed).await);
    }

    #[tokio::test]
    async fn test_pepper_is_applied() {
        let peppered = CredentialStore::new(&AuthConfig {
            password_pepper: Some(b"pepper".to_vec()),
            ..AuthConfig::for_tests()
        });
        let hashed = peppered.hash(raw("secret1")).await.unwrap();

        assert!(peppered.verify(RawPassword::for_login("secret1".into()), &hashed).await);
        assert!(!store().verify(RawPassword::for_login("secret1".into()), &hashed).await);
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_is_false() {
        let stored = UserPassword::from_db("$2a$14$legacy-bcrypt-value");
        assert!(!store().verify(RawPassword::for_login("secret1".into()), &stored).await);
    }

    #[tokio::test]
    async fn test_invalid_cost_is_internal() {
        let broken = CredentialStore::new(&AuthConfig {
            password_cost: HashCost {
                memory_kib: 0,
                iterations: 0,
                parallelism: 0,
            },
            ..AuthConfig::for_tests()
        });
        assert!(matches!(
            broken.hash(raw("secret1")).await,
            Err(AuthError::Internal(_))
        ));
    }
}
