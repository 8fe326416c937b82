//! In-memory Repository
//!
//! Same uniqueness and atomicity rules as the PostgreSQL repository, with
//! a single mutex standing in for transactions. Used by tests and local
//! runs without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::entity::{
    pending_registration::PendingRegistration,
    user_identity::{UserIdentity, UserPage},
};
use crate::domain::repository::{IdentityRepository, PendingRegistrationRepository};
use crate::domain::value_object::{
    email::Email, page::PageRequest, phone::Phone, user_id::UserId, verify_token::VerifyToken,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<UserId, UserIdentity>,
    pending: HashMap<String, PendingRegistration>,
}

impl State {
    fn check_user_unique(&self, identity: &UserIdentity) -> AuthResult<()> {
        for other in self.users.values() {
            if other.user_id == identity.user_id {
                continue;
            }
            if other.profile.email == identity.profile.email {
                return Err(AuthError::EmailTaken);
            }
            if other.profile.phone == identity.profile.phone {
                return Err(AuthError::PhoneTaken);
            }
        }
        Ok(())
    }

    fn insert_user(&mut self, identity: &UserIdentity) -> AuthResult<()> {
        if self.users.contains_key(&identity.user_id) {
            return Err(AuthError::Internal(format!(
                "duplicate user_id {}",
                identity.user_id
            )));
        }
        self.check_user_unique(identity)?;
        self.users.insert(identity.user_id, identity.clone());
        Ok(())
    }
}

/// Thread-safe in-memory implementation of both repository traits
#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AuthError::Internal("repository lock poisoned".to_string()))
    }
}

impl IdentityRepository for InMemoryAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<UserIdentity>> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|u| &u.profile.email == email)
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<UserIdentity>> {
        Ok(self.lock()?.users.get(user_id).cloned())
    }

    async fn count_by_email(&self, email: &Email) -> AuthResult<i64> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .filter(|u| &u.profile.email == email)
            .count() as i64)
    }

    async fn count_by_phone(&self, phone: &Phone) -> AuthResult<i64> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .filter(|u| &u.profile.phone == phone)
            .count() as i64)
    }

    async fn insert(&self, identity: &UserIdentity) -> AuthResult<()> {
        self.lock()?.insert_user(identity)
    }

    async fn upsert_tokens(&self, identity: &UserIdentity) -> AuthResult<()> {
        let mut state = self.lock()?;
        match state.users.get_mut(&identity.user_id) {
            Some(existing) => {
                existing.token = identity.token.clone();
                existing.refresh_token = identity.refresh_token.clone();
                existing.updated_at = identity.updated_at;
                Ok(())
            }
            None => state.insert_user(identity),
        }
    }

    async fn list_page(&self, page: PageRequest) -> AuthResult<UserPage> {
        let state = self.lock()?;
        let mut users: Vec<&UserIdentity> = state.users.values().collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.user_id.as_uuid().cmp(b.user_id.as_uuid()))
        });

        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.per_page()).unwrap_or(usize::MAX);
        let items = users.into_iter().skip(skip).take(take).cloned().collect();

        Ok(UserPage {
            total_count: state.users.len() as i64,
            items,
        })
    }
}

impl PendingRegistrationRepository for InMemoryAuthRepository {
    async fn count_live_by_email(&self, email: &Email, now: DateTime<Utc>) -> AuthResult<i64> {
        let state = self.lock()?;
        Ok(state
            .pending
            .values()
            .filter(|p| &p.profile.email == email && !p.is_expired_at(now))
            .count() as i64)
    }

    async fn count_live_by_phone(&self, phone: &Phone, now: DateTime<Utc>) -> AuthResult<i64> {
        let state = self.lock()?;
        Ok(state
            .pending
            .values()
            .filter(|p| &p.profile.phone == phone && !p.is_expired_at(now))
            .count() as i64)
    }

    async fn create(&self, pending: &PendingRegistration) -> AuthResult<()> {
        let mut state = self.lock()?;
        let now = pending.created_at;

        state.pending.retain(|_, p| {
            let same_holder =
                p.profile.email == pending.profile.email || p.profile.phone == pending.profile.phone;
            !(same_holder && p.is_expired_at(now))
        });

        for other in state.pending.values() {
            if other.verify_token == pending.verify_token {
                return Err(AuthError::Internal("duplicate verify_token".to_string()));
            }
            if other.profile.email == pending.profile.email {
                return Err(AuthError::EmailTaken);
            }
            if other.profile.phone == pending.profile.phone {
                return Err(AuthError::PhoneTaken);
            }
        }

        state
            .pending
            .insert(pending.verify_token.as_str().to_string(), pending.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &VerifyToken) -> AuthResult<Option<PendingRegistration>> {
        Ok(self.lock()?.pending.get(token.as_str()).cloned())
    }

    async fn promote(&self, token: &VerifyToken, identity: &UserIdentity) -> AuthResult<()> {
        let mut state = self.lock()?;

        let Some(pending) = state.pending.remove(token.as_str()) else {
            return Err(AuthError::VerificationNotFound);
        };

        if let Err(e) = state.insert_user(identity) {
            // Roll back
            state.pending.insert(token.as_str().to_string(), pending);
            return Err(e);
        }
        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.lock()?;
        let before = state.pending.len();
        state.pending.retain(|_, p| !p.is_expired_at(now));
        let deleted = (before - state.pending.len()) as u64;

        tracing::info!(
            pending_deleted = deleted,
            "Cleaned up expired pending registrations"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::profile::UserProfile;
    use crate::domain::value_object::{
        person_name::PersonName, user_password::UserPassword, user_role::UserRole,
    };
    use chrono::Duration;

    fn profile(email: &str, phone: &str) -> UserProfile {
        UserProfile {
            email: Email::new(email).unwrap(),
            first_name: PersonName::new("Ann", "first_name").unwrap(),
            last_name: PersonName::new("Lee", "last_name").unwrap(),
            phone: Phone::new(phone).unwrap(),
            user_role: UserRole::User,
        }
    }

    fn pending(email: &str, phone: &str, now: DateTime<Utc>) -> PendingRegistration {
        PendingRegistration::new(
            profile(email, phone),
            UserPassword::from_db("$argon2id$stub"),
            VerifyToken::generate(),
            Duration::hours(24),
            now,
        )
    }

    #[tokio::test]
    async fn test_pending_uniqueness() {
        let repo = InMemoryAuthRepository::new();
        let now = Utc::now();
        repo.create(&pending("a@x.com", "555", now)).await.unwrap();

        assert!(matches!(
            repo.create(&pending("a@x.com", "556", now)).await,
            Err(AuthError::EmailTaken)
        ));
        assert!(matches!(
            repo.create(&pending("b@x.com", "555", now)).await,
            Err(AuthError::PhoneTaken)
        ));
    }

    #[tokio::test]
    async fn test_expired_pending_is_replaced() {
        let repo = InMemoryAuthRepository::new();
        let long_ago = Utc::now() - Duration::hours(48);
        let stale = pending("a@x.com", "555", long_ago);
        repo.create(&stale).await.unwrap();

        let fresh = pending("a@x.com", "555", Utc::now());
        repo.create(&fresh).await.unwrap();

        assert!(repo.find_by_token(&stale.verify_token).await.unwrap().is_none());
        assert!(repo.find_by_token(&fresh.verify_token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_promote_once() {
        let repo = InMemoryAuthRepository::new();
        let now = Utc::now();
        let record = pending("a@x.com", "555", now);
        let token = record.verify_token.clone();
        repo.create(&record).await.unwrap();

        let identity = record.into_identity(now);
        repo.promote(&token, &identity).await.unwrap();
        assert!(repo.find_by_token(&token).await.unwrap().is_none());
        assert!(repo.find_by_user_id(&identity.user_id).await.unwrap().is_some());

        let again = identity.clone();
        assert!(matches!(
            repo.promote(&token, &again).await,
            Err(AuthError::VerificationNotFound)
        ));
    }

    #[tokio::test]
    async fn test_promote_conflict_keeps_pending() {
        let repo = InMemoryAuthRepository::new();
        let now = Utc::now();

        let first = pending("a@x.com", "555", now);
        let first_token = first.verify_token.clone();
        repo.create(&first).await.unwrap();
        repo.promote(&first_token, &first.into_identity(now))
            .await
            .unwrap();

        // Same email slipped into the ledger before the first promotion
        let second = pending("a@x.com", "777", now);
        let second_token = second.verify_token.clone();
        repo.create(&second).await.unwrap();

        assert!(matches!(
            repo.promote(&second_token, &second.into_identity(now)).await,
            Err(AuthError::EmailTaken)
        ));
        assert!(repo.find_by_token(&second_token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let repo = InMemoryAuthRepository::new();
        let now = Utc::now();
        repo.create(&pending("old@x.com", "1", now - Duration::hours(30)))
            .await
            .unwrap();
        repo.create(&pending("new@x.com", "2", now)).await.unwrap();

        assert_eq!(repo.cleanup_expired(now).await.unwrap(), 1);
        assert_eq!(
            repo.count_live_by_email(&Email::new("new@x.com").unwrap(), now)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_upsert_tokens() {
        let repo = InMemoryAuthRepository::new();
        let now = Utc::now();
        let mut identity = pending("a@x.com", "555", now).into_identity(now);

        // Absent: inserted
        identity.token = Some("t1".to_string());
        repo.upsert_tokens(&identity).await.unwrap();

        // Present: token fields overwritten
        identity.token = Some("t2".to_string());
        identity.refresh_token = Some("r2".to_string());
        repo.upsert_tokens(&identity).await.unwrap();

        let stored = repo.find_by_user_id(&identity.user_id).await.unwrap().unwrap();
        assert_eq!(stored.token.as_deref(), Some("t2"));
        assert_eq!(stored.refresh_token.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_list_page_offset() {
        let repo = InMemoryAuthRepository::new();
        let base = Utc::now();
        for i in 0..25 {
            let at = base + Duration::seconds(i);
            let identity =
                pending(&format!("u{i}@x.com"), &format!("{i}"), at).into_identity(at);
            repo.insert(&identity).await.unwrap();
        }

        let page = repo.list_page(PageRequest::new(Some(10), Some(3))).await.unwrap();
        assert_eq!(page.total_count, 25);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].profile.email.as_str(), "u20@x.com");

        let empty = repo.list_page(PageRequest::new(Some(10), Some(9))).await.unwrap();
        assert_eq!(empty.total_count, 25);
        assert!(empty.items.is_empty());
    }
}
