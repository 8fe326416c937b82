//! User Query Use Case
//!
//! Role-gated reads of the identity store.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::authorization::AuthContext;
use crate::domain::entity::user_identity::{UserIdentity, UserPage};
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{page::PageRequest, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

pub struct UserQueryUseCase<R>
where
    R: IdentityRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> UserQueryUseCase<R>
where
    R: IdentityRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// ADMIN only
    pub async fn list(&self, caller: &AuthContext, page: PageRequest) -> AuthResult<UserPage> {
        caller.require_role(UserRole::Admin)?;
        within(self.config.store_timeout, "list users", self.repo.list_page(page)).await
    }

    /// ADMIN, or the USER whose id this is. Any UUID spelling is accepted.
    pub async fn get(&self, caller: &AuthContext, raw_user_id: &str) -> AuthResult<UserIdentity> {
        let Some(user_id) = UserId::parse(raw_user_id) else {
            // A USER can never own an unparseable id; an admin just misses
            caller.require_role(UserRole::Admin)?;
            return Err(AuthError::UserNotFound);
        };
        caller.require_self_or_role(&user_id, UserRole::Admin)?;

        within(
            self.config.store_timeout,
            "find user by id",
            self.repo.find_by_user_id(&user_id),
        )
        .await?
        .ok_or(AuthError::UserNotFound)
    }
}
