//! # JWT Token Management
//!
//! HS256 access tokens. Each token carries a `jti` so a sign-out can revoke it.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{AuthError, AuthResult};
use super::Identity;

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (credential row id)
    pub sub: String,
    pub email: String,
    /// Issued at (Unix epoch seconds)
    pub iat: i64,
    /// Expiration (Unix epoch seconds)
    pub exp: i64,
    pub iss: String,
    /// Token id, used for revocation
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_ttl: Duration,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string(),
            access_token_ttl: Duration::minutes(60),
            issuer: "granja-api".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues an access token; returns the token and its claims.
    pub fn issue(&self, identity: &Identity) -> AuthResult<(String, JwtClaims)> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: identity.user_id.clone(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.access_token_ttl).timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)?;
        Ok((token, claims))
    }

    /// Validates signature, issuer and expiry. Stateless.
    pub fn validate(&self, token: &str) -> AuthResult<JwtClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.leeway = 0;

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: "7".into(),
            email: "ana@granja.ec".into(),
        }
    }

    #[test]
    fn issued_token_validates() {
        let jwt = JwtManager::new(JwtConfig::default());
        let (token, issued) = jwt.issue(&identity()).unwrap();
        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "ana@granja.ec");
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let (token, _) = JwtManager::new(JwtConfig::default()).issue(&identity()).unwrap();
        let other = JwtManager::new(JwtConfig {
            secret: "another-secret".into(),
            ..JwtConfig::default()
        });
        assert!(matches!(other.validate(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtManager::new(JwtConfig {
            access_token_ttl: Duration::minutes(-5),
            ..JwtConfig::default()
        });
        let (token, _) = jwt.issue(&identity()).unwrap();
        assert!(matches!(jwt.validate(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn garbage_is_malformed() {
        let jwt = JwtManager::new(JwtConfig::default());
        assert!(matches!(jwt.validate("not.a.jwt"), Err(AuthError::MalformedToken)));
    }
}
