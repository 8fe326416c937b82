//! Authorization Gate
//!
//! Per-request decisions made from the claims of a validated access token.

use crate::domain::entity::token::TokenClaims;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Caller identity for one request, placed in request extensions by the
/// authentication middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_role: UserRole,
    pub subject_user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl AuthContext {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_role: claims.user_type,
            subject_user_id: claims.uid,
            email: claims.email,
            first_name: claims.first_name,
            last_name: claims.last_name,
        }
    }

    /// Fails unless the caller holds exactly `role`
    pub fn require_role(&self, role: UserRole) -> AuthResult<()> {
        if self.user_role == role {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        }
    }

    /// Passes for a caller holding `role`, or for a `USER` whose own id is
    /// `target_user_id`
    pub fn require_self_or_role(&self, target_user_id: &UserId, role: UserRole) -> AuthResult<()> {
        if self.user_role == role {
            return Ok(());
        }
        if self.user_role == UserRole::User && self.subject_user_id == *target_user_id {
            return Ok(());
        }
        Err(AuthError::Unauthorized)
    }
}
