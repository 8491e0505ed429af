//! Authentication Error Taxonomy
//! Mission: Map every auth failure to a distinct status and log line

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Terminal failures of the auth pipeline. None are retried internally;
/// each maps to a distinct client-visible status so operators can tell a
/// brute-force attempt from an expired session from a storage outage.
#[derive(Debug)]
pub enum AuthError {
    /// Bad login or bad password, deliberately unified so the wire does
    /// not leak which logins exist. The distinction is logged internally.
    InvalidCredential,
    /// No bearer token on the request.
    NoToken,
    /// Token signature valid but past its expiry.
    TokenExpired,
    /// Token tampered with, signed with another key, or unparseable.
    TokenInvalid,
    /// Refresh endpoint called without the refresh header.
    MissingRefreshToken,
    /// Supplied refresh token does not match the stored one (revoked by a
    /// later login, or never issued).
    RefreshNotAllowed,
    /// Gate-time rejection: the token verified but its subject has no
    /// credential record. Client-visible as a plain 401.
    SubjectNotFound,
    /// The token subject vanished between authentication and the refresh
    /// lookup. Internal inconsistency, not a client error, hence the 500.
    UserNotFound,
    /// Authenticated but lacking every required role.
    ForbiddenOperation,
    /// Unexpected lower-layer failure (store I/O, signing).
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Internal(err)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::InvalidCredential => {
                (StatusCode::UNAUTHORIZED, "Invalid login or password")
            }
            AuthError::NoToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Access token has expired"),
            AuthError::TokenInvalid => (StatusCode::UNAUTHORIZED, "Invalid access token"),
            AuthError::MissingRefreshToken => {
                (StatusCode::UNAUTHORIZED, "Refresh token is missing")
            }
            AuthError::RefreshNotAllowed => {
                (StatusCode::UNAUTHORIZED, "Refresh token has been revoked")
            }
            AuthError::SubjectNotFound => (
                StatusCode::UNAUTHORIZED,
                "No user found for login in token",
            ),
            AuthError::UserNotFound => {
                error!("Token subject vanished from credential store");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "User for token no longer exists",
                )
            }
            AuthError::ForbiddenOperation => (StatusCode::FORBIDDEN, "Insufficient permissions"),
            AuthError::Internal(err) => {
                error!("Internal auth failure: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
