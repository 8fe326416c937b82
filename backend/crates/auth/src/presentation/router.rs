//! Auth Router

use axum::{Router, middleware::from_fn_with_state, routing::{get, post}};
use std::sync::Arc;

use crate::application::{AuthConfig, CredentialStore, TokenIssuer};
use crate::domain::notification::VerificationMailer;
use crate::domain::repository::{IdentityRepository, PendingRegistrationRepository};
use crate::error::AuthResult;
use crate::infra::{mailer::EmailVerificationMailer, postgres::PgAuthRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_access_token};

/// Create the Auth router with PostgreSQL repository and SMTP/log mailer
pub fn auth_router(
    repo: PgAuthRepository,
    mailer: EmailVerificationMailer,
    config: AuthConfig,
) -> AuthResult<Router> {
    auth_router_generic(repo, mailer, config)
}

/// Create a generic Auth router for any repository and mailer
///
/// Public: `POST /users/signup`, `POST /users/login`,
/// `GET /users/verify-email`. Token required: `GET /users`,
/// `GET /users/{user_id}`.
pub fn auth_router_generic<R, M>(repo: R, mailer: M, config: AuthConfig) -> AuthResult<Router>
where
    R: IdentityRepository + PendingRegistrationRepository + Send + Sync + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    let issuer = Arc::new(TokenIssuer::new(&config)?);
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        issuer: issuer.clone(),
        credentials: Arc::new(CredentialStore::new(&config)),
        config: Arc::new(config),
    };

    let protected = Router::new()
        .route("/users", get(handlers::list_users::<R, M>))
        .route("/users/{user_id}", get(handlers::get_user::<R, M>))
        .route_layer(from_fn_with_state(
            AuthMiddlewareState { issuer },
            require_access_token,
        ));

    let router = Router::new()
        .route("/users/signup", post(handlers::sign_up::<R, M>))
        .route("/users/login", post(handlers::login::<R, M>))
        .route("/users/verify-email", get(handlers::verify_email::<R, M>))
        .merge(protected)
        .with_state(state);

    Ok(router)
}
