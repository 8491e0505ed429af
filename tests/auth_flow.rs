//! Wire-level tests for the auth pipeline.
//!
//! Drives the assembled router through `tower::ServiceExt::oneshot`,
//! covering the login / refresh / rotation / logout scenarios and role
//! gating end to end.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gatekeeper_backend::auth::{
    api, models::Credential, AuthService, AuthState, CredentialStore, SqliteCredentialStore,
    TokenCodec,
};
use gatekeeper_backend::config::ApiConfig;
use serde_json::Value;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret-key-12345";
const TEST_COST: u32 = 4;

struct TestApp {
    router: Router,
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
    _temp: NamedTempFile,
}

fn test_app() -> TestApp {
    let temp = NamedTempFile::new().unwrap();
    let config = ApiConfig {
        token_secret: TEST_SECRET.to_string(),
        hash_cost: TEST_COST,
        ..ApiConfig::default()
    };

    let store = SqliteCredentialStore::new(temp.path().to_str().unwrap(), TEST_COST).unwrap();
    store
        .create("alice", "secret", vec!["USER".to_string()])
        .unwrap();

    let store: Arc<dyn CredentialStore> = Arc::new(store);
    let codec = Arc::new(TokenCodec::new(
        config.token_secret.clone(),
        config.token_ttl_seconds,
    ));
    let service = Arc::new(AuthService::new(store.clone(), codec.clone()));
    let state = AuthState::new(service, codec.clone(), store.clone(), &config);

    TestApp {
        router: api::router(state, &config),
        codec,
        store,
        _temp: temp,
    }
}

async fn post_login_raw(app: &TestApp, login: &str, password: &str) -> (StatusCode, Vec<u8>) {
    let body = serde_json::json!({ "login": login, "password": password });
    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn post_login(app: &TestApp, login: &str, password: &str) -> (StatusCode, Value) {
    let (status, bytes) = post_login_raw(app, login, password).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get_with_bearer(
    app: &TestApp,
    uri: &str,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = access_token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    if let Some(token) = refresh_token {
        builder = builder.header("refresh", token);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn login_refresh_rotation_scenario() {
    let app = test_app();

    // login("alice","secret") -> 200 with token pair and settings
    let (status, body) = post_login(&app, "alice", "secret").await;
    assert_eq!(status, StatusCode::OK);
    let t1_access = body["accessToken"].as_str().unwrap().to_string();
    let t1_refresh = body["refreshToken"].as_str().unwrap().to_string();
    assert_eq!(body["settings"]["theme"], "theme-default");

    // refresh with T1refresh -> 200, new access token
    let (status, body) =
        get_with_bearer(&app, "/api/refresh", Some(&t1_access), Some(&t1_refresh)).await;
    assert_eq!(status, StatusCode::OK);
    let refreshed = body["accessToken"].as_str().unwrap();
    assert_ne!(refreshed, t1_access);

    // second login rotates: T2refresh differs
    let (status, body) = post_login(&app, "alice", "secret").await;
    assert_eq!(status, StatusCode::OK);
    let t2_access = body["accessToken"].as_str().unwrap().to_string();
    let t2_refresh = body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(t2_refresh, t1_refresh);

    // old refresh token revoked by the rotation
    let (status, _) =
        get_with_bearer(&app, "/api/refresh", Some(&t2_access), Some(&t1_refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // new refresh token works
    let (status, _) =
        get_with_bearer(&app, "/api/refresh", Some(&t2_access), Some(&t2_refresh)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bad_login_and_unknown_login_are_indistinguishable() {
    let app = test_app();

    let (wrong_pw_status, wrong_pw_body) = post_login_raw(&app, "alice", "wrong").await;
    let (no_user_status, no_user_body) = post_login_raw(&app, "nobody", "x").await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user_status, StatusCode::UNAUTHORIZED);
    // Same status AND same body: no login enumeration
    assert_eq!(wrong_pw_body, no_user_body);
}

#[tokio::test]
async fn refresh_without_header_is_rejected() {
    let app = test_app();

    let (_, body) = post_login(&app, "alice", "secret").await;
    let access = body["accessToken"].as_str().unwrap().to_string();

    let (status, _) = get_with_bearer(&app, "/api/refresh", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validate_endpoint() {
    let app = test_app();

    // No token
    let (status, _) = get_with_bearer(&app, "/api/validate", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Garbage token
    let (status, _) = get_with_bearer(&app, "/api/validate", Some("not.a.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Token signed with a different key
    let foreign_codec = TokenCodec::new("some-other-secret".to_string(), 600);
    let ghost = ghost_credential("alice");
    let (foreign_token, _) = foreign_codec.sign(&ghost).unwrap();
    let (status, _) = get_with_bearer(&app, "/api/validate", Some(&foreign_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid token
    let (_, body) = post_login(&app, "alice", "secret").await;
    let access = body["accessToken"].as_str().unwrap().to_string();
    let (status, _) = get_with_bearer(&app, "/api/validate", Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn valid_token_for_vanished_subject_is_unauthorized() {
    let app = test_app();

    // Correctly signed token whose subject has no credential record
    let (token, _) = app.codec.sign(&ghost_credential("ghost")).unwrap();

    let (status, _) = get_with_bearer(&app, "/api/validate", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_refresh_token() {
    let app = test_app();

    let (_, body) = post_login(&app, "alice", "secret").await;
    let access = body["accessToken"].as_str().unwrap().to_string();
    let refresh = body["refreshToken"].as_str().unwrap().to_string();

    let (status, _) = get_with_bearer(&app, "/api/logout", Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Access token is stateless and still validates...
    let (status, _) = get_with_bearer(&app, "/api/validate", Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // ...but the session capability is gone
    let (status, _) = get_with_bearer(&app, "/api/refresh", Some(&access), Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_route_is_role_gated() {
    let app = test_app();

    // Seeded admin holds the ADMIN role
    let (status, body) = post_login(&app, "admin", "admin123").await;
    assert_eq!(status, StatusCode::OK);
    let admin_access = body["accessToken"].as_str().unwrap().to_string();

    let (status, body) = get_with_bearer(&app, "/api/admin/ping", Some(&admin_access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong");

    // Plain USER is authenticated but forbidden
    let (_, body) = post_login(&app, "alice", "secret").await;
    let user_access = body["accessToken"].as_str().unwrap().to_string();

    let (status, _) = get_with_bearer(&app, "/api/admin/ping", Some(&user_access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unauthenticated requests never reach the guard
    let (status, _) = get_with_bearer(&app, "/api/admin/ping", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_changes_are_observed_by_already_issued_tokens() {
    let app = test_app();

    // Token minted while alice holds only USER
    let (_, body) = post_login(&app, "alice", "secret").await;
    let access = body["accessToken"].as_str().unwrap().to_string();

    let (status, _) = get_with_bearer(&app, "/api/admin/ping", Some(&access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Grant ADMIN on the stored record; the token's embedded roles are
    // unchanged, but the gate reads the current record per request
    let mut credential = app.store.find_by_login("alice").unwrap().unwrap();
    credential.roles.push("ADMIN".to_string());
    app.store.save(&credential).unwrap();

    let (status, _) = get_with_bearer(&app, "/api/admin/ping", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    // And the other direction: revoking ADMIN locks the same token out
    let mut credential = app.store.find_by_login("alice").unwrap().unwrap();
    credential.roles.retain(|r| r != "ADMIN");
    app.store.save(&credential).unwrap();

    let (status, _) = get_with_bearer(&app, "/api/admin/ping", Some(&access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn ghost_credential(login: &str) -> Credential {
    Credential {
        id: uuid::Uuid::new_v4(),
        login: login.to_string(),
        password_hash: String::new(),
        roles: vec!["USER".to_string()],
        refresh_token: None,
        settings: gatekeeper_backend::auth::models::default_settings(),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}
