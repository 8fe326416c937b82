//! Pending Registration Entity
//!
//! An unverified signup, keyed by its one-time token. Lives in the
//! verification ledger until it is promoted to a [`UserIdentity`] or swept
//! after expiry.

use chrono::{DateTime, Duration, Utc};

use crate::domain::entity::{profile::UserProfile, user_identity::UserIdentity};
use crate::domain::value_object::{
    user_id::UserId, user_password::UserPassword, verify_token::VerifyToken,
};

#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub verify_token: VerifyToken,
    pub profile: UserProfile,
    pub password_hash: UserPassword,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PendingRegistration {
    pub fn new(
        profile: UserProfile,
        password_hash: UserPassword,
        verify_token: VerifyToken,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            verify_token,
            profile,
            password_hash,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Still valid at the instant of expiry; expired strictly after it
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Build the verified identity this registration turns into
    pub fn into_identity(self, now: DateTime<Utc>) -> UserIdentity {
        UserIdentity {
            user_id: UserId::new(),
            profile: self.profile,
            password_hash: self.password_hash,
            is_verified: true,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        email::Email, person_name::PersonName, phone::Phone, user_role::UserRole,
    };

    fn pending(now: DateTime<Utc>) -> PendingRegistration {
        let profile = UserProfile {
            email: Email::new("a@x.com").unwrap(),
            first_name: PersonName::new("Ann", "first_name").unwrap(),
            last_name: PersonName::new("Lee", "last_name").unwrap(),
            phone: Phone::new("555").unwrap(),
            user_role: UserRole::User,
        };
        PendingRegistration::new(
            profile,
            UserPassword::from_db("$argon2id$stub"),
            VerifyToken::generate(),
            Duration::hours(24),
            now,
        )
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let record = pending(now);
        assert_eq!(record.expires_at - record.created_at, Duration::hours(24));
        assert!(!record.is_expired_at(now));
        assert!(!record.is_expired_at(record.expires_at));
        assert!(record.is_expired_at(record.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_into_identity() {
        let now = Utc::now();
        let record = pending(now);
        let profile = record.profile.clone();

        let identity = record.into_identity(now);
        assert!(identity.is_verified);
        assert_eq!(identity.profile, profile);
        assert!(identity.token.is_none());
        assert_eq!(identity.created_at, now);
    }
}
