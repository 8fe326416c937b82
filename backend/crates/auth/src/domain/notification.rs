//! Outbound verification message port

use crate::domain::value_object::{email::Email, verify_token::VerifyToken};
use crate::error::AuthResult;

#[trait_variant::make(VerificationMailer: Send)]
pub trait LocalVerificationMailer {
    /// Deliver the verification link for `token` to `to`.
    ///
    /// Failures are reported as `AuthError::DeliveryFailed`.
    async fn send_verification_email(&self, to: &Email, token: &VerifyToken) -> AuthResult<()>;
}
