//! JWT Token Codec
//! Mission: Sign and verify stateless access tokens

use crate::auth::models::{Claims, Credential};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Why a token failed verification. Each variant maps to a different
/// caller-visible outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No token was supplied at all.
    Missing,
    /// Signature is valid but `exp` is in the past.
    Expired,
    /// Signature does not match recomputation (tampering or wrong key).
    BadSignature,
    /// Token cannot be parsed as a JWT.
    Malformed,
}

/// Stateless access-token codec. Pure function of its secret, TTL, and
/// wall-clock time; safe to share across requests without coordination.
pub struct TokenCodec {
    secret: String,
    ttl_seconds: u64,
}

impl TokenCodec {
    pub fn new(secret: String, ttl_seconds: u64) -> Self {
        Self {
            secret,
            ttl_seconds,
        }
    }

    /// Mint a signed access token for a credential, snapshotting its
    /// current roles. Returns the token and its lifetime in seconds.
    pub fn sign(&self, credential: &Credential) -> Result<(String, u64)> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: credential.id.to_string(),
            login: credential.login.clone(),
            roles: credential.roles.clone(),
            iat: now as usize,
            exp: (now + self.ttl_seconds as i64) as usize,
            jti: Uuid::new_v4().to_string(),
        };

        debug!(
            login = %credential.login,
            ttl_seconds = self.ttl_seconds,
            "Generating access token"
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign access token")?;

        Ok((token, self.ttl_seconds))
    }

    /// Verify a bearer token and extract its claims.
    pub fn verify(&self, token: Option<&str>) -> Result<Claims, TokenError> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(TokenError::Missing),
        };

        // Zero leeway: `exp < now` is exact, not fuzzy
        let mut validation = Validation::default();
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed,
        })?;

        debug!(login = %decoded.claims.login, "Access token verified");

        Ok(decoded.claims)
    }
}
