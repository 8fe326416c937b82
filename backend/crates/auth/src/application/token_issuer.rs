//! Token Issuer
//!
//! Mints and validates HS256 access/refresh pairs. Access tokens expire 24h
//! after issuance, refresh tokens 168h. A token counts as expired from the
//! second named in its `exp` claim onward.

use chrono::{DateTime, Utc};
use platform::jwt::{Hs256, JwtError};

use crate::application::config::AuthConfig;
use crate::domain::entity::{
    token::{RefreshClaims, TokenClaims, TokenPair},
    user_identity::UserIdentity,
};
use crate::domain::repository::IdentityRepository;
use crate::error::{AuthError, AuthResult};

/// Random bytes in each token's `jti`
const JTI_BYTES: usize = 16;

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: Hs256,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let to_chrono = |d: std::time::Duration| {
            chrono::Duration::from_std(d)
                .map_err(|_| AuthError::Internal("token lifetime out of range".to_string()))
        };
        Ok(Self {
            codec: Hs256::new(config.jwt_secret.clone()),
            access_ttl: to_chrono(config.access_token_ttl)?,
            refresh_ttl: to_chrono(config.refresh_token_ttl)?,
        })
    }

    pub fn issue_at(&self, identity: &UserIdentity, now: DateTime<Utc>) -> AuthResult<TokenPair> {
        let profile = &identity.profile;
        let access = TokenClaims {
            email: profile.email.as_str().to_string(),
            first_name: profile.first_name.as_str().to_string(),
            last_name: profile.last_name.as_str().to_string(),
            uid: identity.user_id,
            user_type: profile.user_role,
            exp: (now + self.access_ttl).timestamp(),
            jti: platform::crypto::random_token(JTI_BYTES),
        };
        let refresh = RefreshClaims {
            exp: (now + self.refresh_ttl).timestamp(),
            jti: platform::crypto::random_token(JTI_BYTES),
        };

        Ok(TokenPair {
            access_token: self.codec.encode(&access).map_err(encode_failure)?,
            refresh_token: self.codec.encode(&refresh).map_err(encode_failure)?,
        })
    }

    pub fn validate(&self, token: &str) -> AuthResult<TokenClaims> {
        self.validate_at(token, Utc::now())
    }

    /// Signature first, then claim shape, then expiry
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenClaims> {
        let claims: TokenClaims = self.codec.decode(token).map_err(|e| match e {
            JwtError::InvalidSignature => AuthError::TokenInvalidSignature,
            JwtError::Malformed(_) | JwtError::Encode(_) => AuthError::TokenMalformed,
        })?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    /// Store `tokens` as the identity's current pair: insert the identity if
    /// absent, else overwrite its token fields and `updated_at`
    pub async fn persist<R>(
        &self,
        repo: &R,
        mut identity: UserIdentity,
        tokens: TokenPair,
        now: DateTime<Utc>,
    ) -> AuthResult<UserIdentity>
    where
        R: IdentityRepository,
    {
        identity.apply_tokens(tokens, now);
        repo.upsert_tokens(&identity).await?;
        Ok(identity)
    }
}

fn encode_failure(e: JwtError) -> AuthError {
    tracing::error!(error = %e, "Failed to sign token");
    AuthError::Internal("failed to sign token".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::profile::UserProfile;
    use crate::domain::value_object::{
        email::Email, person_name::PersonName, phone::Phone, user_id::UserId,
        user_password::UserPassword, user_role::UserRole,
    };
    use chrono::Duration;

    fn identity(role: UserRole) -> UserIdentity {
        let now = Utc::now();
        UserIdentity {
            user_id: UserId::new(),
            profile: UserProfile {
                email: Email::new("a@x.com").unwrap(),
                first_name: PersonName::new("Ann", "first_name").unwrap(),
                last_name: PersonName::new("Lee", "last_name").unwrap(),
                phone: Phone::new("555").unwrap(),
                user_role: role,
            },
            password_hash: UserPassword::from_db("$argon2id$stub"),
            is_verified: true,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig::with_random_secret()).unwrap()
    }

    #[test]
    fn test_validate_recovers_claims() {
        let issuer = issuer();
        let user = identity(UserRole::Admin);
        let now = Utc::now();

        let pair = issuer.issue_at(&user, now).unwrap();
        let claims = issuer.validate_at(&pair.access_token, now).unwrap();

        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.first_name, "Ann");
        assert_eq!(claims.last_name, "Lee");
        assert_eq!(claims.uid, user.user_id);
        assert_eq!(claims.user_type, UserRole::Admin);
        assert_eq!(claims.exp, (now + Duration::hours(24)).timestamp());
    }

    #[test]
    fn test_expiry_boundary() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_at(&identity(UserRole::User), now).unwrap();
        let exp = now + Duration::hours(24);

        assert!(issuer.validate_at(&pair.access_token, exp - Duration::seconds(1)).is_ok());
        assert!(matches!(
            issuer.validate_at(&pair.access_token, exp),
            Err(AuthError::TokenExpired)
        ));
        assert!(matches!(
            issuer.validate_at(&pair.access_token, exp + Duration::days(1)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_refresh_token_carries_only_expiry() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_at(&identity(UserRole::User), now).unwrap();

        let refresh: RefreshClaims = issuer.codec.decode(&pair.refresh_token).unwrap();
        assert_eq!(refresh.exp, (now + Duration::hours(168)).timestamp());

        // Not usable where an access token is expected
        assert!(matches!(
            issuer.validate_at(&pair.refresh_token, now),
            Err(AuthError::TokenMalformed)
        ));
    }

    #[test]
    fn test_pairs_rotate_within_one_second() {
        let issuer = issuer();
        let now = Utc::now();
        let user = identity(UserRole::User);
        let first = issuer.issue_at(&user, now).unwrap();
        let second = issuer.issue_at(&user, now).unwrap();
        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_other_secret_is_invalid_signature() {
        let pair = issuer()
            .issue_at(&identity(UserRole::User), Utc::now())
            .unwrap();
        assert!(matches!(
            issuer().validate(&pair.access_token),
            Err(AuthError::TokenInvalidSignature)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            issuer().validate("not.a.token"),
            Err(AuthError::TokenMalformed)
        ));
        assert!(matches!(issuer().validate(""), Err(AuthError::TokenMalformed)));
    }
}
