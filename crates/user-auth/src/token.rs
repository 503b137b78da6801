//! Access Tokens

use crate::AuthError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token type reported to clients
pub const TOKEN_TYPE: &str = "bearer";

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HMAC secret
    pub secret_key: String,
    /// Token lifetime (minutes)
    pub access_token_expire_minutes: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_key: "insecure-development-secret".to_string(),
            access_token_expire_minutes: 30,
        }
    }
}

/// Claims embedded in every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret_key.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl: Duration::minutes(config.access_token_expire_minutes),
        }
    }

    /// Issue a token for a subject with the configured lifetime
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_with_expiry(subject, Utc::now() + self.ttl)
    }

    /// Issue a token with an explicit expiry
    pub fn issue_with_expiry(
        &self,
        subject: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })
    }

    /// Configured token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
