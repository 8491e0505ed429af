//! Authentication Service
//! Mission: Orchestrate login, refresh, and logout flows

use crate::auth::errors::AuthError;
use crate::auth::jwt::TokenCodec;
use crate::auth::password;
use crate::auth::store::CredentialStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of a successful login: fresh token pair plus the credential's
/// opaque settings blob, passed through unchanged.
#[derive(Debug)]
pub struct LoginOutput {
    pub access_token: String,
    pub refresh_token: String,
    pub settings: Value,
}

/// Result of a successful refresh: a new access token only.
#[derive(Debug)]
pub struct TokenOutput {
    pub access_token: String,
}

/// Orchestrates credential verification and token issuance on top of the
/// store and codec collaborators.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Verify a login/password pair, rotate the stored refresh token, and
    /// mint an access token.
    ///
    /// Unknown login and bad password return the same `InvalidCredential`
    /// so the wire does not leak which logins exist; the two cases are
    /// logged distinctly.
    ///
    /// The refresh-token rotation is persisted before minting. Operator
    /// note: if minting fails after that write, the old session is already
    /// invalidated even though the client never saw the new token.
    pub fn login(&self, login: &str, plaintext: &str) -> Result<LoginOutput, AuthError> {
        debug!(login, "Login attempt");

        let Some(mut credential) = self.store.find_by_login(login)? else {
            warn!(login, "Login failed: unknown login");
            return Err(AuthError::InvalidCredential);
        };

        if !password::verify_password(plaintext, &credential.password_hash)? {
            warn!(login, "Login failed: bad password");
            return Err(AuthError::InvalidCredential);
        }

        // Rotate: the new value supersedes any prior refresh token the
        // moment this write lands. Concurrent logins race last-write-wins,
        // the deliberate single-active-session model.
        let refresh_token = Uuid::new_v4().to_string();
        credential.refresh_token = Some(refresh_token.clone());
        self.store.save(&credential)?;

        let (access_token, _expires_in) = self.codec.sign(&credential)?;

        debug!(login, "Login successful");

        Ok(LoginOutput {
            access_token,
            refresh_token,
            settings: credential.settings,
        })
    }

    /// Mint a new access token if the supplied refresh token matches the
    /// stored one bytewise. The stored token is NOT rotated here; only
    /// login rotates it.
    pub fn refresh(
        &self,
        login: &str,
        supplied_refresh_token: Option<&str>,
    ) -> Result<TokenOutput, AuthError> {
        debug!(login, "Refresh attempt");

        let Some(supplied) = supplied_refresh_token.filter(|t| !t.is_empty()) else {
            warn!(login, "Refresh failed: no refresh token in headers");
            return Err(AuthError::MissingRefreshToken);
        };

        // The caller's access token already verified, so an absent record
        // here means the subject vanished: internal inconsistency.
        let Some(credential) = self.store.find_by_login(login)? else {
            return Err(AuthError::UserNotFound);
        };

        if credential.refresh_token.as_deref() != Some(supplied) {
            warn!(login, "Refresh failed: refresh token mismatch");
            return Err(AuthError::RefreshNotAllowed);
        }

        let (access_token, _expires_in) = self.codec.sign(&credential)?;

        debug!(login, "Refresh successful");

        Ok(TokenOutput { access_token })
    }

    /// Clear the stored refresh token, ending the active session. The
    /// access token itself stays valid until it expires (stateless).
    pub fn logout(&self, login: &str) -> Result<(), AuthError> {
        let Some(mut credential) = self.store.find_by_login(login)? else {
            return Err(AuthError::UserNotFound);
        };

        credential.refresh_token = None;
        self.store.save(&credential)?;

        debug!(login, "Logged out, refresh token cleared");

        Ok(())
    }
}
