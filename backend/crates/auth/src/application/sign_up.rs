//! Sign Up Use Case
//!
//! Validates the candidate, hashes the password, mails the verification
//! link and records the pending registration. Nothing is stored when the
//! email cannot be handed to the relay.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::application::credential_store::CredentialStore;
use crate::application::deadline::within;
use crate::domain::entity::{pending_registration::PendingRegistration, profile::UserProfile};
use crate::domain::notification::VerificationMailer;
use crate::domain::repository::{IdentityRepository, PendingRegistrationRepository};
use crate::domain::value_object::{
    email::Email, person_name::PersonName, phone::Phone, user_password::RawPassword,
    user_role::UserRole, verify_token::VerifyToken,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input, fields as received
pub struct SignUpInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub user_type: String,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub email: Email,
    pub expires_at: DateTime<Utc>,
}

/// Sign up use case
pub struct SignUpUseCase<R, M>
where
    R: IdentityRepository + PendingRegistrationRepository,
    M: VerificationMailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    credentials: Arc<CredentialStore>,
    config: Arc<AuthConfig>,
}

impl<R, M> SignUpUseCase<R, M>
where
    R: IdentityRepository + PendingRegistrationRepository,
    M: VerificationMailer,
{
    pub fn new(
        repo: Arc<R>,
        mailer: Arc<M>,
        credentials: Arc<CredentialStore>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            mailer,
            credentials,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let profile = UserProfile {
            first_name: PersonName::new(&input.first_name, "first_name")?,
            last_name: PersonName::new(&input.last_name, "last_name")?,
            email: Email::new(&input.email)?,
            phone: Phone::new(&input.phone)?,
            user_role: input.user_type.parse::<UserRole>()?,
        };
        let password = RawPassword::new(input.password)?;

        let now = Utc::now();
        self.ensure_available(&profile, now).await?;

        let password_hash = self.credentials.hash(password).await?;

        let ttl = chrono::Duration::from_std(self.config.verification_ttl)
            .map_err(|_| AuthError::Internal("verification lifetime out of range".to_string()))?;
        let pending = PendingRegistration::new(
            profile,
            password_hash,
            VerifyToken::generate(),
            ttl,
            now,
        );

        // Mail first: a failed send must leave no pending record behind
        match tokio::time::timeout(
            self.config.mail_timeout,
            self.mailer
                .send_verification_email(&pending.profile.email, &pending.verify_token),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(AuthError::DeliveryFailed(
                    "mail relay did not answer in time".to_string(),
                ));
            }
        }

        within(
            self.config.store_timeout,
            "create pending registration",
            self.repo.create(&pending),
        )
        .await?;

        tracing::info!(
            email = %pending.profile.email,
            user_role = %pending.profile.user_role,
            expires_at = %pending.expires_at,
            "Registration pending verification"
        );

        Ok(SignUpOutput {
            email: pending.profile.email,
            expires_at: pending.expires_at,
        })
    }

    /// Friendly conflict check. The store's unique constraints still decide
    /// races between concurrent signups.
    async fn ensure_available(&self, profile: &UserProfile, now: DateTime<Utc>) -> AuthResult<()> {
        let limit = self.config.store_timeout;

        let emails = within(limit, "count users by email", self.repo.count_by_email(&profile.email))
            .await?
            + within(
                limit,
                "count pending by email",
                self.repo.count_live_by_email(&profile.email, now),
            )
            .await?;
        if emails > 0 {
            return Err(AuthError::EmailTaken);
        }

        let phones = within(limit, "count users by phone", self.repo.count_by_phone(&profile.phone))
            .await?
            + within(
                limit,
                "count pending by phone",
                self.repo.count_live_by_phone(&profile.phone, now),
            )
            .await?;
        if phones > 0 {
            return Err(AuthError::PhoneTaken);
        }

        Ok(())
    }
}
