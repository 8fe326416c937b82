//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the
//! authorization gate.

pub mod authorization;
pub mod entity;
pub mod notification;
pub mod repository;
pub mod value_object;

// Re-exports
pub use authorization::AuthContext;
pub use entity::{
    pending_registration::PendingRegistration, token::TokenPair, user_identity::UserIdentity,
};
pub use notification::VerificationMailer;
pub use repository::{IdentityRepository, PendingRegistrationRepository};
