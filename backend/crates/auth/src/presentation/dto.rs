//! API DTOs (Data Transfer Objects)
//!
//! Field names are snake_case on the wire. Request fields are optional at
//! the serde level so a missing field is reported as a 400 naming it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{SignInInput, SignUpInput};
use crate::domain::entity::user_identity::{UserIdentity, UserPage};
use crate::domain::value_object::{page::PageRequest, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

fn required(field: &str, value: Option<String>) -> AuthResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AuthError::Validation(format!("{field} is required"))),
    }
}

// ============================================================================
// Sign Up
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub user_type: Option<String>,
}

impl SignUpRequest {
    pub fn into_input(self) -> AuthResult<SignUpInput> {
        Ok(SignUpInput {
            first_name: required("first_name", self.first_name)?,
            last_name: required("last_name", self.last_name)?,
            email: required("email", self.email)?,
            password: required("password", self.password)?,
            phone: required("phone", self.phone)?,
            user_type: required("user_type", self.user_type)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Verify Email
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailResponse {
    pub message: String,
    pub user: UserResponse,
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    // Older clients send the capitalized key
    #[serde(alias = "Password")]
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_input(self) -> AuthResult<SignInInput> {
        Ok(SignInInput {
            email: required("email", self.email)?,
            password: required("password", self.password)?,
        })
    }
}

// ============================================================================
// Users
// ============================================================================

/// Identity as returned to clients. Never carries the password hash; token
/// fields are present only on the login and verification responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub user_type: UserRole,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    /// Includes the current token pair
    pub fn with_tokens(identity: UserIdentity) -> Self {
        let mut response = Self::profile(&identity);
        response.token = identity.token;
        response.refresh_token = identity.refresh_token;
        response
    }

    pub fn profile(identity: &UserIdentity) -> Self {
        Self {
            user_id: identity.user_id,
            first_name: identity.profile.first_name.as_str().to_string(),
            last_name: identity.profile.last_name.as_str().to_string(),
            email: identity.profile.email.as_str().to_string(),
            phone: identity.profile.phone.as_str().to_string(),
            user_type: identity.profile.user_role,
            is_verified: identity.is_verified,
            token: None,
            refresh_token: None,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

/// `?recordPerPage=&page=`; unparsable or sub-minimum values use defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    #[serde(rename = "recordPerPage")]
    pub record_per_page: Option<String>,
    pub page: Option<String>,
}

impl ListUsersQuery {
    pub fn page_request(&self) -> PageRequest {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        PageRequest::new(parse(&self.record_per_page), parse(&self.page))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListUsersResponse {
    pub total_count: i64,
    pub user_items: Vec<UserResponse>,
}

impl From<UserPage> for ListUsersResponse {
    fn from(page: UserPage) -> Self {
        Self {
            total_count: page.total_count,
            user_items: page.items.iter().map(UserResponse::profile).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_it() {
        let request = SignUpRequest {
            first_name: Some("Ann".into()),
            last_name: Some("Lee".into()),
            email: Some("a@x.com".into()),
            password: Some("secret1".into()),
            phone: None,
            user_type: Some("USER".into()),
        };
        match request.into_input() {
            Err(AuthError::Validation(msg)) => assert_eq!(msg, "phone is required"),
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_login_accepts_capitalized_password() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","Password":"secret1"}"#).unwrap();
        let input = request.into_input().unwrap();
        assert_eq!(input.password, "secret1");
    }

    #[test]
    fn test_list_query_parsing() {
        let query: ListUsersQuery = serde_json::from_str(r#"{"recordPerPage":"5","page":"2"}"#).unwrap();
        let page = query.page_request();
        assert_eq!((page.per_page(), page.page()), (5, 2));

        let junk = ListUsersQuery {
            record_per_page: Some("ten".into()),
            page: Some("0".into()),
        };
        let page = junk.page_request();
        assert_eq!((page.per_page(), page.page()), (10, 1));
    }
}
