//! Application Error - Unified error type for the application
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// アプリケーション統一エラー型
///
/// サービスクレートのエラー (`AuthError` など) はここに変換されてから
/// Problem Details レスポンスになる。`source` はログ専用で、レスポンスには
/// 含めない。
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::Conflict, "This email is already registered");
/// assert_eq!(err.status_code(), 409);
/// assert_eq!(err.public_message(), "This email is already registered");
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

/// `Result<T, AppError>` の省略形
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// 元のエラーを保持（ログ用）
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// クライアントに返してよいメッセージ
    ///
    /// 5xx は理由フレーズだけ。ドライバや SMTP の文言は外に出さない。
    #[inline]
    pub fn public_message(&self) -> &str {
        if self.kind.is_server_error() {
            self.kind.as_str()
        } else {
            &self.message
        }
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_keeps_message() {
        let err = AppError::new(ErrorKind::BadRequest, "first_name is required");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), "first_name is required");
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_server_error_hides_detail() {
        let err = AppError::new(
            ErrorKind::InternalServerError,
            "Failed to send verification email: 535 auth failed",
        );
        assert_eq!(err.public_message(), "Internal Server Error");
        assert!(err.message().contains("535"));
    }

    #[test]
    fn test_source_is_kept_for_logs() {
        let io_err = std::io::Error::other("connection reset");
        let err = AppError::new(ErrorKind::ServiceUnavailable, "Database connection error")
            .with_source(io_err);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "[Service Unavailable] Database connection error");
    }
}
