//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer. Email and phone uniqueness is enforced by the
//! implementation, which reports violations as `EmailTaken`/`PhoneTaken`.

use chrono::{DateTime, Utc};

use crate::domain::entity::{
    pending_registration::PendingRegistration,
    user_identity::{UserIdentity, UserPage},
};
use crate::domain::value_object::{
    email::Email, page::PageRequest, phone::Phone, user_id::UserId, verify_token::VerifyToken,
};
use crate::error::AuthResult;

/// Identity store: verified users
#[trait_variant::make(IdentityRepository: Send)]
pub trait LocalIdentityRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<UserIdentity>>;

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<UserIdentity>>;

    async fn count_by_email(&self, email: &Email) -> AuthResult<i64>;

    async fn count_by_phone(&self, phone: &Phone) -> AuthResult<i64>;

    /// Insert a new identity
    async fn insert(&self, identity: &UserIdentity) -> AuthResult<()>;

    /// Insert the identity if absent, otherwise overwrite its token fields
    /// and `updated_at`
    async fn upsert_tokens(&self, identity: &UserIdentity) -> AuthResult<()>;

    /// Ordered by creation time, then user id
    async fn list_page(&self, page: PageRequest) -> AuthResult<UserPage>;
}

/// Verification ledger: pending registrations keyed by token
#[trait_variant::make(PendingRegistrationRepository: Send)]
pub trait LocalPendingRegistrationRepository {
    /// Pending registrations for this email that have not expired at `now`
    async fn count_live_by_email(&self, email: &Email, now: DateTime<Utc>) -> AuthResult<i64>;

    async fn count_live_by_phone(&self, phone: &Phone, now: DateTime<Utc>) -> AuthResult<i64>;

    /// Store a new pending registration, first dropping expired records
    /// that hold the same email or phone
    async fn create(&self, pending: &PendingRegistration) -> AuthResult<()>;

    async fn find_by_token(&self, token: &VerifyToken) -> AuthResult<Option<PendingRegistration>>;

    /// Atomically delete the pending record and insert `identity`.
    ///
    /// Fails `VerificationNotFound` (and writes nothing) when the token was
    /// already consumed.
    async fn promote(&self, token: &VerifyToken, identity: &UserIdentity) -> AuthResult<()>;

    /// Delete every pending record expired at `now`; returns the count
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}
