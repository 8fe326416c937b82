//! Value Object Module

pub mod email;
pub mod page;
pub mod person_name;
pub mod phone;
pub mod user_id;
pub mod user_password;
pub mod user_role;
pub mod verify_token;
