//! Authentication & Authorization Middleware
//! Mission: Gate protected endpoints behind token and role checks

use crate::auth::api::AuthState;
use crate::auth::errors::AuthError;
use crate::auth::jwt::TokenError;
use crate::auth::models::Principal;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Request-time authentication gate.
///
/// Extracts the bearer token from the configured header, verifies it, and
/// resolves the token's login against the credential store. On success a
/// [`Principal`] built from the current record (not the token's embedded
/// roles) is attached to the request; any rejection short-circuits with no
/// downstream middleware execution.
pub async fn authentication_gate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(state.auth_header.as_str())
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    let claims = state.codec.verify(token).map_err(|e| match e {
        TokenError::Missing => AuthError::NoToken,
        TokenError::Expired => AuthError::TokenExpired,
        TokenError::BadSignature | TokenError::Malformed => AuthError::TokenInvalid,
    })?;

    let Some(credential) = state.store.find_by_login(&claims.login)? else {
        warn!(login = %claims.login, "Token subject not found in credential store");
        return Err(AuthError::SubjectNotFound);
    };

    debug!(login = %credential.login, "Request authenticated");

    req.extensions_mut()
        .insert(Principal::from_credential(&credential));

    Ok(next.run(req).await)
}

/// Per-endpoint authorization guard, composed after [`authentication_gate`].
///
/// An empty required set always passes; otherwise the principal needs any
/// one of the required roles. Reaching this guard without a principal is a
/// routing wiring bug, reported as an internal error rather than a 401.
pub fn require_roles(
    required: &[&str],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>
       + Clone
       + Send
       + 'static {
    let required: Arc<Vec<String>> =
        Arc::new(required.iter().map(|r| r.to_string()).collect());

    move |req: Request, next: Next| {
        let required = required.clone();
        Box::pin(async move {
            if required.is_empty() {
                return Ok(next.run(req).await);
            }

            let Some(principal) = req.extensions().get::<Principal>().cloned() else {
                error!("Authorization guard reached without an authenticated principal");
                return Err(AuthError::Internal(anyhow::anyhow!(
                    "authorization guard composed before authentication gate"
                )));
            };

            if has_any_role(&required, &principal.roles) {
                Ok(next.run(req).await)
            } else {
                warn!(
                    login = %principal.login,
                    required = ?required,
                    held = ?principal.roles,
                    "Forbidden operation"
                );
                Err(AuthError::ForbiddenOperation)
            }
        })
    }
}

/// Any-of role check: an empty required set passes everything.
fn has_any_role(required: &[String], held: &[String]) -> bool {
    required.is_empty() || required.iter().any(|role| held.contains(role))
}

/// Extract the authenticated principal from a request (after the gate).
pub fn extract_principal(req: &Request) -> Option<&Principal> {
    req.extensions().get::<Principal>()
}
