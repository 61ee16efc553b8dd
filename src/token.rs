//! Bearer session tokens
//!
//! Tokens are HS256 JWTs carrying the user id, role, issue time and expiry.
//! Nothing is stored server side; a token is valid until it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::MAX_TOKEN_TTL_DAYS;
use crate::error::{AppError, AppResult};
use crate::models::{Role, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::days(ttl_days.clamp(1, MAX_TOKEN_TTL_DAYS)),
        }
    }

    /// Sign a token for `user`
    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Check signature and expiry. Every failure is `Unauthenticated`.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                AppError::Unauthenticated("Invalid or expired token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: "user-1".to_string(),
            name: "Kavya".to_string(),
            email: "kavya@example.com".to_string(),
            phone: "+919800000001".to_string(),
            password_hash: String::new(),
            role: Role::Broker,
            is_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new("a-very-secret-signing-key", 30);
        let token = issuer.issue(&user()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Broker);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new("a-very-secret-signing-key", 30)
            .issue(&user())
            .unwrap();
        let other = TokenIssuer::new("another-secret-signing-key", 30);

        assert!(matches!(
            other.verify(&token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new("a-very-secret-signing-key", 30);
        let now = Utc::now().timestamp();
        let token = issuer
            .sign(&Claims {
                sub: "user-1".to_string(),
                role: Role::Customer,
                iat: now - 120,
                exp: now - 60,
            })
            .unwrap();

        assert!(matches!(
            issuer.verify(&token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let issuer = TokenIssuer::new("a-very-secret-signing-key", i64::MAX);
        let token = issuer.issue(&user()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL_DAYS * 86_400);
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new("a-very-secret-signing-key", 30);
        assert!(issuer.verify("not.a.jwt").is_err());
        assert!(issuer.verify("").is_err());
    }
}
