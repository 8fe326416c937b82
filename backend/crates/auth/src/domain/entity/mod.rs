//! Entity Module

pub mod pending_registration;
pub mod profile;
pub mod token;
pub mod user_identity;
