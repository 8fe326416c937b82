//! User Identity Entity
//!
//! A verified user. Carries the most recently issued token pair; issuing a
//! new pair overwrites the previous one.

use chrono::{DateTime, Utc};

use crate::domain::entity::{profile::UserProfile, token::TokenPair};
use crate::domain::value_object::{user_id::UserId, user_password::UserPassword};

#[derive(Debug, Clone)]
pub struct UserIdentity {
    /// Generated once, never reassigned
    pub user_id: UserId,
    pub profile: UserProfile,
    pub password_hash: UserPassword,
    pub is_verified: bool,
    /// Current access token
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserIdentity {
    pub fn apply_tokens(&mut self, tokens: TokenPair, now: DateTime<Utc>) {
        self.token = Some(tokens.access_token);
        self.refresh_token = Some(tokens.refresh_token);
        self.updated_at = now;
    }
}

/// One page of the user listing
#[derive(Debug, Clone)]
pub struct UserPage {
    /// Number of identities in the store, not on this page
    pub total_count: i64,
    pub items: Vec<UserIdentity>,
}
