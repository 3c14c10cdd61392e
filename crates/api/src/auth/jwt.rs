//! JWT session tokens
//!
//! Opaque signed credential carrying the account id. HS256, issued at
//! login/registration, validated by the auth middleware.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: Uuid,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl JwtManager {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    /// Issue a session token bound to `user_id`
    pub fn issue_token(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::default();
        decode::<Claims>(token, &self.decoding_key, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-jwt-secret-key-for-testing-only";

    #[test]
    fn round_trips_account_id() {
        let manager = JwtManager::new(SECRET, 24);
        let user_id = Uuid::new_v4();

        let token = manager.issue_token(user_id).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = JwtManager::new("completely-different-secret-material", 24);
        let verifier = JwtManager::new(SECRET, 24);

        let token = issuer.issue_token(Uuid::new_v4()).unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        // Expiry well past the default validation leeway
        let manager = JwtManager::new(SECRET, -2);

        let token = manager.issue_token(Uuid::new_v4()).unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn rejects_garbage_token() {
        let manager = JwtManager::new(SECRET, 24);
        assert!(manager.validate_token("not.a.jwt").is_err());
    }
}
