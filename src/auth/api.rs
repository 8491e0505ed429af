//! Authentication API Endpoints
//! Mission: Expose login, logout, refresh, and validate endpoints

use crate::auth::errors::AuthError;
use crate::auth::jwt::TokenCodec;
use crate::auth::middleware::{authentication_gate, extract_principal, require_roles};
use crate::auth::models::{LoginRequest, LoginResponse, RefreshResponse};
use crate::auth::service::AuthService;
use crate::auth::store::CredentialStore;
use crate::config::ApiConfig;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
    pub codec: Arc<TokenCodec>,
    pub store: Arc<dyn CredentialStore>,

    // Header names, injected from configuration
    pub auth_header: String,
    pub refresh_header: String,
}

impl AuthState {
    pub fn new(
        service: Arc<AuthService>,
        codec: Arc<TokenCodec>,
        store: Arc<dyn CredentialStore>,
        config: &ApiConfig,
    ) -> Self {
        Self {
            service,
            codec,
            store,
            auth_header: config.auth_header.clone(),
            refresh_header: config.refresh_header.clone(),
        }
    }
}

/// Assemble the auth router: public login plus token-gated endpoints, with
/// a role-gated admin probe demonstrating the guard composition.
pub fn router(state: AuthState, config: &ApiConfig) -> Router {
    let public = Router::new()
        .route(&config.login_path, post(login))
        .with_state(state.clone());

    let protected = Router::new()
        .route(&config.logout_path, get(logout))
        .route(&config.refresh_path, get(refresh))
        .route(&config.validate_path, get(validate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_gate,
        ))
        .with_state(state.clone());

    // Guard composes after the gate: the layer added last runs first
    let admin = Router::new()
        .route(&config.admin_ping_path, get(admin_ping))
        .route_layer(middleware::from_fn(require_roles(&["ADMIN"])))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_gate,
        ))
        .with_state(state);

    Router::new().merge(public).merge(protected).merge(admin)
}

/// Login endpoint - POST /api/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let output = state.service.login(&payload.login, &payload.password)?;

    Ok(Json(LoginResponse {
        access_token: output.access_token,
        refresh_token: output.refresh_token,
        settings: output.settings,
    }))
}

/// Logout endpoint - GET /api/logout
///
/// Clears the stored refresh token for the authenticated principal.
pub async fn logout(
    State(state): State<AuthState>,
    req: Request,
) -> Result<StatusCode, AuthError> {
    let principal = extract_principal(&req).ok_or(AuthError::NoToken)?;

    state.service.logout(&principal.login)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Refresh endpoint - GET /api/refresh
///
/// Requires a valid access token plus the refresh header; returns a new
/// access token without rotating the stored refresh token.
pub async fn refresh(
    State(state): State<AuthState>,
    req: Request,
) -> Result<Json<RefreshResponse>, AuthError> {
    let principal = extract_principal(&req).ok_or(AuthError::NoToken)?;

    let supplied = req
        .headers()
        .get(state.refresh_header.as_str())
        .and_then(|h| h.to_str().ok());

    let output = state.service.refresh(&principal.login, supplied)?;

    Ok(Json(RefreshResponse {
        access_token: output.access_token,
    }))
}

/// Validate endpoint - GET /api/validate
///
/// The authentication gate already did the work; reaching the handler
/// means the token is good.
pub async fn validate(req: Request) -> Result<StatusCode, AuthError> {
    extract_principal(&req).ok_or(AuthError::NoToken)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Role-gated probe - GET /api/admin/ping (ADMIN only)
pub async fn admin_ping(req: Request) -> Result<Json<serde_json::Value>, AuthError> {
    let principal = extract_principal(&req).ok_or(AuthError::NoToken)?;

    Ok(Json(serde_json::json!({
        "message": "pong",
        "login": principal.login,
    })))
}
