//! Auth Middleware
//!
//! Validates the access token on protected routes and hands the caller's
//! [`AuthContext`] to handlers through request extensions.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::{HeaderMap, header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::application::TokenIssuer;
use crate::domain::authorization::AuthContext;
use crate::error::AuthError;

/// Header carrying the raw access token, as existing clients send it
pub const TOKEN_HEADER: &str = "token";

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub issuer: Arc<TokenIssuer>,
}

/// `token` header first, then `Authorization: Bearer`
pub fn extract_access_token(headers: &HeaderMap) -> Option<&str> {
    let from_token_header = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    from_token_header.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| {
                v.strip_prefix("Bearer ")
                    .or_else(|| v.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

/// Middleware that requires a valid access token
pub async fn require_access_token(
    State(state): State<AuthMiddlewareState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_access_token(req.headers()).ok_or(AuthError::TokenMissing)?;
    let claims = state.issuer.validate(token)?;

    let context = AuthContext::from_claims(claims);
    tracing::debug!(
        user_id = %context.subject_user_id,
        user_role = %context.user_role,
        "Request authenticated"
    );
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::TokenMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_access_token(&headers), Some("abc"));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_access_token(&headers), Some("xyz"));
    }

    #[test]
    fn test_missing_or_blank() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_access_token(&headers), None);

        headers.insert(TOKEN_HEADER, HeaderValue::from_static("  "));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(extract_access_token(&headers), None);
    }
}
