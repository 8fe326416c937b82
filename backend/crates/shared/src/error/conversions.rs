//! Error conversions
//!
//! `sqlx::Error` classification and the HTTP rendering of [`AppError`],
//! each behind its cargo feature.

#[cfg(any(feature = "sqlx", feature = "axum"))]
use super::app_error::AppError;
#[cfg(any(feature = "sqlx", feature = "axum"))]
use super::kind::ErrorKind;

/// SQLSTATE classes worth distinguishing; everything else is a plain 500.
/// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
#[cfg(feature = "sqlx")]
fn classify_sqlstate(code: &str) -> (ErrorKind, &'static str) {
    match code {
        "23505" => (ErrorKind::Conflict, "Duplicate key value"),
        "23502" | "23514" => (ErrorKind::BadRequest, "Constraint violation"),
        "57014" => (ErrorKind::GatewayTimeout, "Statement cancelled"),
        c if c.starts_with("53") => (ErrorKind::ServiceUnavailable, "Database resource exhausted"),
        c if c.starts_with("08") => (ErrorKind::ServiceUnavailable, "Database connection error"),
        _ => (ErrorKind::InternalServerError, "Database error"),
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let (kind, message) = match &err {
            sqlx::Error::RowNotFound => (ErrorKind::NotFound, "Record not found"),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                (ErrorKind::ServiceUnavailable, "Database connection pool unavailable")
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                (ErrorKind::ServiceUnavailable, "Database connection error")
            }
            sqlx::Error::Database(db_err) => {
                classify_sqlstate(db_err.code().as_deref().unwrap_or_default())
            }
            _ => (ErrorKind::InternalServerError, "Database error"),
        };
        AppError::new(kind, message).with_source(err)
    }
}

/// RFC 7807 Problem Details
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let kind: ErrorKind = self.kind();

        let body = serde_json::json!({
            "type": "about:blank",
            "title": kind.as_str(),
            "status": status.as_u16(),
            "detail": self.public_message(),
        });

        (status, Json(body)).into_response()
    }
}
