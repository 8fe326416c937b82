//! Profile fields shared by pending registrations and identities

use crate::domain::value_object::{
    email::Email, person_name::PersonName, phone::Phone, user_role::UserRole,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub email: Email,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub phone: Phone,
    pub user_role: UserRole,
}
