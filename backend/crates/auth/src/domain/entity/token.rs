//! Token claims
//!
//! Wire shape of the signed payloads. The access token carries the identity
//! and role; the refresh token carries only its expiry.

use serde::{Deserialize, Serialize};

use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

/// Access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: UserId,
    pub user_type: UserRole,
    /// Unix seconds
    pub exp: i64,
    /// Random id, so two pairs minted in the same second still differ
    pub jti: String,
}

/// Refresh token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
