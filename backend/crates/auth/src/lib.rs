//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, authorization gate
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory repositories, mail delivery
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Signup held as a pending registration until the emailed link is opened
//! - Email + password login returning an HS256 access/refresh token pair
//! - Role-gated user listing (ADMIN) and lookup (ADMIN or self)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id off the async executor
//! - One-time verification tokens from the OS CSPRNG, valid 24 hours
//! - Access tokens checked for signature before any claim is read
//! - Email/phone uniqueness enforced by storage constraints

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::authorization::AuthContext;
pub use error::{AuthError, AuthResult};
pub use infra::{
    mailer::EmailVerificationMailer, memory::InMemoryAuthRepository, postgres::PgAuthRepository,
};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
