//! Verification Mail Delivery
//!
//! SMTP delivery through `platform::mail`, or a log-only fallback for
//! local runs without a relay.

use platform::mail::SmtpMailer;

use crate::domain::notification::VerificationMailer;
use crate::domain::value_object::{email::Email, verify_token::VerifyToken};
use crate::error::{AuthError, AuthResult};

const SUBJECT: &str = "Email Verification";

/// Link the registrant clicks
pub fn verification_link(base: &str, token: &VerifyToken) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}token={token}")
}

fn verification_body(link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: sans-serif; line-height: 1.5;">
    <h2>Confirm your email address</h2>
    <p>Click the link below to finish creating your account:</p>
    <p><a href="{link}">Verify email</a></p>
    <p>This link is valid for 24 hours. If you did not sign up, ignore this message.</p>
  </body>
</html>
"#
    )
}

#[derive(Clone)]
enum Transport {
    Smtp(SmtpMailer),
    Log,
}

#[derive(Clone)]
pub struct EmailVerificationMailer {
    transport: Transport,
    link_base: String,
}

impl EmailVerificationMailer {
    pub fn smtp(mailer: SmtpMailer, link_base: impl Into<String>) -> Self {
        Self {
            transport: Transport::Smtp(mailer),
            link_base: link_base.into(),
        }
    }

    /// Writes the link to the log instead of sending anything
    pub fn log_only(link_base: impl Into<String>) -> Self {
        Self {
            transport: Transport::Log,
            link_base: link_base.into(),
        }
    }
}

impl VerificationMailer for EmailVerificationMailer {
    async fn send_verification_email(&self, to: &Email, token: &VerifyToken) -> AuthResult<()> {
        let link = verification_link(&self.link_base, token);

        match &self.transport {
            Transport::Smtp(mailer) => {
                mailer
                    .send_html(to.as_str(), SUBJECT, verification_body(&link))
                    .await
                    .map_err(|e| AuthError::DeliveryFailed(e.to_string()))?;
                tracing::info!(to = %to, "Verification email sent");
            }
            Transport::Log => {
                tracing::info!(to = %to, link = %link, "Verification email (not sent, no SMTP relay)");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_link() {
        let token = VerifyToken::from_db("abc_-123");
        assert_eq!(
            verification_link("http://localhost:8000/users/verify-email", &token),
            "http://localhost:8000/users/verify-email?token=abc_-123"
        );
        assert_eq!(
            verification_link("https://app.example.com/verify?lang=en", &token),
            "https://app.example.com/verify?lang=en&token=abc_-123"
        );
    }

    #[test]
    fn test_body_contains_link_and_validity() {
        let body = verification_body("https://x/verify?token=t");
        assert!(body.contains(r#"href="https://x/verify?token=t""#));
        assert!(body.contains("24 hours"));
    }

    #[tokio::test]
    async fn test_log_only_never_fails() {
        let mailer = EmailVerificationMailer::log_only("http://localhost:8000/users/verify-email");
        let to = Email::new("a@x.com").unwrap();
        assert!(
            mailer
                .send_verification_email(&to, &VerifyToken::generate())
                .await
                .is_ok()
        );
    }
}
