//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Client errors carry their message to
//! the response body; server errors are logged here and rendered with a
//! generic message only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request field failed validation
    #[error("{0}")]
    Validation(String),

    /// Email already belongs to a user or a live pending registration
    #[error("This email is already registered")]
    EmailTaken,

    /// Phone already belongs to a user or a live pending registration
    #[error("This phone number is already registered")]
    PhoneTaken,

    /// `token` query parameter absent or blank
    #[error("Verification token is required")]
    VerificationTokenMissing,

    /// No pending registration holds this token (never issued or already used)
    #[error("Invalid or already used verification token")]
    VerificationNotFound,

    /// Pending registration exists but its expiry has passed
    #[error("Verification token has expired")]
    VerificationExpired,

    /// Unknown email or wrong password
    #[error("Email or password is incorrect")]
    InvalidCredentials,

    /// No access token on a protected request
    #[error("Authentication token is required")]
    TokenMissing,

    /// Access token signature does not verify
    #[error("Invalid token signature")]
    TokenInvalidSignature,

    /// Access token could not be parsed into claims
    #[error("Malformed token")]
    TokenMalformed,

    /// Access token `exp` has passed
    #[error("Token has expired")]
    TokenExpired,

    /// Caller's role or identity does not permit the request
    #[error("Unauthorized to access this resource")]
    Unauthorized,

    /// Requested user does not exist
    #[error("User not found")]
    UserNotFound,

    /// Verification email could not be handed to the mail relay
    #[error("Failed to send verification email: {0}")]
    DeliveryFailed(String),

    /// A store operation exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(&'static str),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::VerificationTokenMissing
            | AuthError::VerificationNotFound
            | AuthError::VerificationExpired => ErrorKind::BadRequest,
            AuthError::EmailTaken | AuthError::PhoneTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::TokenMissing
            | AuthError::TokenInvalidSignature
            | AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Timeout(_) => ErrorKind::GatewayTimeout,
            AuthError::DeliveryFailed(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
            AuthError::Database(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::DeliveryFailed(reason) => {
                tracing::error!(reason = %reason, "Verification email delivery failed");
            }
            AuthError::Timeout(operation) => {
                tracing::warn!(operation = operation, "Auth store operation timed out");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TokenInvalidSignature => {
                tracing::warn!("Access token with invalid signature rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            // Keep sqlx's own classification (pool exhaustion -> 503, etc.)
            AuthError::Database(e) => AppError::from(e),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::PhoneTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::VerificationNotFound.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::VerificationExpired.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::DeliveryFailed("relay down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::Timeout("find user").status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let app: AppError = AuthError::Internal("pool exploded at 0xdeadbeef".into()).into();
        assert!(!app.public_message().contains("0xdeadbeef"));

        let app: AppError = AuthError::DeliveryFailed("535 auth failed".into()).into();
        assert!(!app.public_message().contains("535"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let app: AppError = AuthError::Validation("first_name is required".into()).into();
        assert_eq!(app.public_message(), "first_name is required");
    }

    #[test]
    fn test_database_error_uses_kernel_mapping() {
        let app: AppError = AuthError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(app.kind(), ErrorKind::ServiceUnavailable);
    }
}
