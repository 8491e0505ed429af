//! Gatekeeper - Credential login and token-gated API server
//! Mission: Issue short-lived access tokens, rotate refresh tokens, and
//! gate endpoints by role

use anyhow::{Context, Result};
use axum::{middleware, response::Json, routing::get, Router};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatekeeper_backend::{
    auth::{api as auth_api, AuthService, AuthState, CredentialStore, SqliteCredentialStore, TokenCodec},
    config::ApiConfig,
    middleware::request_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    dotenv().ok();
    init_tracing();

    info!("🚀 Gatekeeper starting");

    let config = ApiConfig::from_env();

    let store: Arc<dyn CredentialStore> = Arc::new(SqliteCredentialStore::new(
        &config.db_path,
        config.hash_cost,
    )?);
    let codec = Arc::new(TokenCodec::new(
        config.token_secret.clone(),
        config.token_ttl_seconds,
    ));
    let service = Arc::new(AuthService::new(store.clone(), codec.clone()));
    let auth_state = AuthState::new(service, codec, store, &config);

    info!("🔐 Credential store initialized at: {}", config.db_path);

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(auth_api::router(auth_state, &config))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Initialize tracing from RUST_LOG with a sane default filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatekeeper_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
