//! Expired Pending Sweep
//!
//! Run once at startup. Bounded by the store timeout like any other store call.

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::repository::PendingRegistrationRepository;
use crate::error::AuthResult;

/// Delete every pending registration expired at `now`; returns the count
pub async fn sweep_expired_pending<R>(
    repo: &R,
    config: &AuthConfig,
    now: DateTime<Utc>,
) -> AuthResult<u64>
where
    R: PendingRegistrationRepository,
{
    within(
        config.store_timeout,
        "sweep expired pending registrations",
        repo.cleanup_expired(now),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::entity::{pending_registration::PendingRegistration, profile::UserProfile};
    use crate::domain::value_object::{
        email::Email, person_name::PersonName, phone::Phone, user_password::UserPassword,
        user_role::UserRole, verify_token::VerifyToken,
    };
    use crate::error::AuthError;
    use crate::infra::memory::InMemoryAuthRepository;

    fn pending(email: &str, phone: &str, created: DateTime<Utc>) -> PendingRegistration {
        PendingRegistration::new(
            UserProfile {
                email: Email::new(email).unwrap(),
                first_name: PersonName::new("Ann", "first_name").unwrap(),
                last_name: PersonName::new("Lee", "last_name").unwrap(),
                phone: Phone::new(phone).unwrap(),
                user_role: UserRole::User,
            },
            UserPassword::from_db("$argon2id$stub"),
            VerifyToken::generate(),
            chrono::Duration::hours(24),
            created,
        )
    }

    /// Ledger whose every call hangs
    struct StalledLedger;

    impl PendingRegistrationRepository for StalledLedger {
        async fn count_live_by_email(&self, _: &Email, _: DateTime<Utc>) -> AuthResult<i64> {
            std::future::pending().await
        }

        async fn count_live_by_phone(&self, _: &Phone, _: DateTime<Utc>) -> AuthResult<i64> {
            std::future::pending().await
        }

        async fn create(&self, _: &PendingRegistration) -> AuthResult<()> {
            std::future::pending().await
        }

        async fn find_by_token(&self, _: &VerifyToken) -> AuthResult<Option<PendingRegistration>> {
            std::future::pending().await
        }

        async fn promote(
            &self,
            _: &VerifyToken,
            _: &crate::domain::entity::user_identity::UserIdentity,
        ) -> AuthResult<()> {
            std::future::pending().await
        }

        async fn cleanup_expired(&self, _: DateTime<Utc>) -> AuthResult<u64> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_sweeps_only_expired() {
        let repo = InMemoryAuthRepository::new();
        let now = Utc::now();
        repo.create(&pending("old@x.com", "1", now - chrono::Duration::hours(30)))
            .await
            .unwrap();
        repo.create(&pending("new@x.com", "2", now)).await.unwrap();

        let deleted = sweep_expired_pending(&repo, &AuthConfig::for_tests(), now)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(
            repo.count_live_by_email(&Email::new("new@x.com").unwrap(), now)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_times_out() {
        let config = AuthConfig {
            store_timeout: Duration::from_secs(100),
            ..AuthConfig::for_tests()
        };
        let result = sweep_expired_pending(&StalledLedger, &config, Utc::now()).await;
        assert!(matches!(result, Err(AuthError::Timeout(_))));
    }
}
