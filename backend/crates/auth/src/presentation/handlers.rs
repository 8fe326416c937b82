//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    CredentialStore, SignInUseCase, SignUpUseCase, TokenIssuer, UserQueryUseCase,
    VerifyEmailUseCase,
};
use crate::domain::authorization::AuthContext;
use crate::domain::notification::VerificationMailer;
use crate::domain::repository::{IdentityRepository, PendingRegistrationRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ListUsersQuery, ListUsersResponse, LoginRequest, MessageResponse, SignUpRequest,
    UserResponse, VerifyEmailQuery, VerifyEmailResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, M> {
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub issuer: Arc<TokenIssuer>,
    pub credentials: Arc<CredentialStore>,
    pub config: Arc<AuthConfig>,
}

// Manual impl: cloning the Arcs must not require `R: Clone`
impl<R, M> Clone for AuthAppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            issuer: self.issuer.clone(),
            credentials: self.credentials.clone(),
            config: self.config.clone(),
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AuthResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AuthError::Validation(rejection.body_text()))
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /users/signup
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> AuthResult<Json<MessageResponse>>
where
    R: IdentityRepository + PendingRegistrationRepository + Send + Sync + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    let input = json_body(payload)?.into_input()?;

    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.credentials.clone(),
        state.config.clone(),
    );
    let output = use_case.execute(input).await?;

    Ok(Json(MessageResponse {
        message: format!(
            "Verification email sent to {}. Please confirm within 24 hours.",
            output.email
        ),
    }))
}

// ============================================================================
// Verify Email
// ============================================================================

/// GET /users/verify-email?token=...
pub async fn verify_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(query): Query<VerifyEmailQuery>,
) -> AuthResult<Json<VerifyEmailResponse>>
where
    R: IdentityRepository + PendingRegistrationRepository + Send + Sync + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(
        state.repo.clone(),
        state.issuer.clone(),
        state.config.clone(),
    );
    let identity = use_case.execute(query.token.as_deref()).await?;

    Ok(Json(VerifyEmailResponse {
        message: "Email verified successfully".to_string(),
        user: UserResponse::with_tokens(identity),
    }))
}

// ============================================================================
// Login
// ============================================================================

/// POST /users/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityRepository + PendingRegistrationRepository + Send + Sync + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    let input = json_body(payload)?.into_input()?;

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.issuer.clone(),
        state.credentials.clone(),
        state.config.clone(),
    );
    let identity = use_case.execute(input).await?;

    Ok(Json(UserResponse::with_tokens(identity)))
}

// ============================================================================
// Users
// ============================================================================

/// GET /users (ADMIN)
pub async fn list_users<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: AuthContext,
    Query(query): Query<ListUsersQuery>,
) -> AuthResult<Json<ListUsersResponse>>
where
    R: IdentityRepository + PendingRegistrationRepository + Send + Sync + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    let use_case = UserQueryUseCase::new(state.repo.clone(), state.config.clone());
    let page = use_case.list(&caller, query.page_request()).await?;

    Ok(Json(page.into()))
}

/// GET /users/{user_id} (ADMIN, or the user themself)
pub async fn get_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: AuthContext,
    Path(user_id): Path<String>,
) -> AuthResult<Json<UserResponse>>
where
    R: IdentityRepository + PendingRegistrationRepository + Send + Sync + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    let use_case = UserQueryUseCase::new(state.repo.clone(), state.config.clone());
    let identity = use_case.get(&caller, &user_id).await?;

    Ok(Json(UserResponse::profile(&identity)))
}
