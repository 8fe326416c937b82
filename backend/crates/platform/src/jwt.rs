//! HS256 JSON Web Tokens
//!
//! Thin wrapper over `jsonwebtoken` pinned to HS256. Any other `alg`
//! (including `none`) is rejected as malformed; a bad MAC is reported
//! separately as [`JwtError::InvalidSignature`].
//!
//! Expiry is *not* checked here: claims are opaque to this module and the
//! caller decides what "expired" means.

use std::collections::HashSet;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// JWT encode/decode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// Token structure, header or payload could not be parsed
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature does not match the signing input
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Claims could not be serialized
    #[error("Failed to encode token: {0}")]
    Encode(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::Malformed(err.to_string()),
        }
    }
}

/// Signs and verifies HS256 tokens with one secret
#[derive(Clone)]
pub struct Hs256 {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256 {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        let secret = secret.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            validation,
        }
    }

    /// Encode claims as a signed compact token
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }

    /// Verify the signature, then decode the claims
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let data = jsonwebtoken::decode::<T>(token.trim(), &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for Hs256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hs256").field("secret", &"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::to_base64url;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    fn claims() -> Claims {
        Claims {
            sub: "user-1".to_string(),
            exp: 1_700_000_000,
        }
    }

    #[test]
    fn test_encode_decode() {
        let codec = Hs256::new(b"secret".to_vec());
        let token = codec.encode(&claims()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec.decode::<Claims>(&token).unwrap(), claims());
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = Hs256::new(b"secret".to_vec()).encode(&claims()).unwrap();
        let result = Hs256::new(b"other".to_vec()).decode::<Claims>(&token);
        assert_eq!(result, Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        let codec = Hs256::new(b"secret".to_vec());
        let token = codec.encode(&claims()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged = Claims {
            sub: "admin".to_string(),
            exp: i64::MAX,
        };
        let forged_payload = to_base64url(&serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            codec.decode::<Claims>(&tampered),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_structural_garbage_is_malformed() {
        let codec = Hs256::new(b"secret".to_vec());
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.##"] {
            assert!(
                matches!(codec.decode::<Claims>(token), Err(JwtError::Malformed(_))),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_alg_none_is_rejected() {
        let codec = Hs256::new(b"secret".to_vec());
        let header = to_base64url(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = to_base64url(&serde_json::to_vec(&claims()).unwrap());
        let token = format!("{header}.{payload}.");
        assert!(matches!(
            codec.decode::<Claims>(&token),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_other_hmac_algorithm_is_malformed() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims(),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let result = Hs256::new(b"secret".to_vec()).decode::<Claims>(&token);
        assert!(matches!(result, Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_past_exp_is_left_to_caller() {
        let codec = Hs256::new(b"secret".to_vec());
        let stale = Claims {
            sub: "user-1".to_string(),
            exp: 1,
        };
        let token = codec.encode(&stale).unwrap();
        assert_eq!(codec.decode::<Claims>(&token).unwrap(), stale);
    }

    #[test]
    fn test_signed_but_wrong_shape_is_malformed() {
        let codec = Hs256::new(b"secret".to_vec());
        let token = codec.encode(&serde_json::json!({ "unrelated": true })).unwrap();
        assert!(matches!(
            codec.decode::<Claims>(&token),
            Err(JwtError::Malformed(_))
        ));
    }
}
