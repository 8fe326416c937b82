//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod credential_store;
pub mod deadline;
pub mod sign_in;
pub mod sign_up;
pub mod sweep;
pub mod token_issuer;
pub mod user_query;
pub mod verify_email;

// Re-exports
pub use config::AuthConfig;
pub use credential_store::CredentialStore;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use sweep::sweep_expired_pending;
pub use token_issuer::TokenIssuer;
pub use user_query::UserQueryUseCase;
pub use verify_email::VerifyEmailUseCase;
