//! Sign In Use Case
//!
//! Checks email and password, then issues and stores a fresh token pair.
//! An unknown email and a wrong password are indistinguishable to the
//! caller.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::credential_store::CredentialStore;
use crate::application::deadline::within;
use crate::application::token_issuer::TokenIssuer;
use crate::domain::entity::user_identity::UserIdentity;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: IdentityRepository,
{
    repo: Arc<R>,
    issuer: Arc<TokenIssuer>,
    credentials: Arc<CredentialStore>,
    config: Arc<AuthConfig>,
}

impl<R> SignInUseCase<R>
where
    R: IdentityRepository,
{
    pub fn new(
        repo: Arc<R>,
        issuer: Arc<TokenIssuer>,
        credentials: Arc<CredentialStore>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            issuer,
            credentials,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<UserIdentity> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;
        let password = RawPassword::for_login(input.password);
        let limit = self.config.store_timeout;

        let identity = within(limit, "find user by email", self.repo.find_by_email(&email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .credentials
            .verify(password, &identity.password_hash)
            .await
        {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let tokens = self.issuer.issue_at(&identity, now)?;
        let user_id = identity.user_id;
        within(
            limit,
            "persist tokens",
            self.issuer.persist(&*self.repo, identity, tokens, now),
        )
        .await?;

        // Answer with the stored record, not the in-memory copy
        let identity = within(limit, "find user by id", self.repo.find_by_user_id(&user_id))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(user_id = %identity.user_id, "User signed in");

        Ok(identity)
    }
}
