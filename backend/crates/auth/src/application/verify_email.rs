//! Verify Email Use Case
//!
//! Redeems a verification token: the pending registration becomes a
//! verified identity with its first token pair. Redemption is atomic in the
//! repository, so a token confirms at most once.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::application::token_issuer::TokenIssuer;
use crate::domain::entity::user_identity::UserIdentity;
use crate::domain::repository::PendingRegistrationRepository;
use crate::domain::value_object::verify_token::VerifyToken;
use crate::error::{AuthError, AuthResult};

pub struct VerifyEmailUseCase<R>
where
    R: PendingRegistrationRepository,
{
    repo: Arc<R>,
    issuer: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<R> VerifyEmailUseCase<R>
where
    R: PendingRegistrationRepository,
{
    pub fn new(repo: Arc<R>, issuer: Arc<TokenIssuer>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            issuer,
            config,
        }
    }

    pub async fn execute(&self, raw_token: Option<&str>) -> AuthResult<UserIdentity> {
        let token = raw_token
            .and_then(VerifyToken::from_request)
            .ok_or(AuthError::VerificationTokenMissing)?;
        let limit = self.config.store_timeout;

        let pending = within(limit, "find pending registration", self.repo.find_by_token(&token))
            .await?
            .ok_or(AuthError::VerificationNotFound)?;

        let now = Utc::now();
        if pending.is_expired_at(now) {
            // Left in place for the startup sweep, or replaced by a new signup
            return Err(AuthError::VerificationExpired);
        }

        let mut identity = pending.into_identity(now);
        let tokens = self.issuer.issue_at(&identity, now)?;
        identity.apply_tokens(tokens, now);

        within(limit, "promote pending registration", self.repo.promote(&token, &identity))
            .await?;

        tracing::info!(
            user_id = %identity.user_id,
            email = %identity.profile.email,
            "Email verified, user created"
        );

        Ok(identity)
    }
}
