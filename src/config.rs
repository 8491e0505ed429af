//! Configuration
//! Mission: Collect environment-derived scalars in one place
//!
//! The auth core never reads the environment itself; everything it needs
//! is constructed from this struct at startup.

use std::env;

/// All configuration consumed by the service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Socket address the server binds to.
    pub bind_addr: String,
    /// SQLite credential store path.
    pub db_path: String,
    /// Access-token signing secret.
    pub token_secret: String,
    /// Access-token lifetime in seconds.
    pub token_ttl_seconds: u64,
    /// Header carrying `Bearer <accessToken>`.
    pub auth_header: String,
    /// Header carrying the refresh token.
    pub refresh_header: String,
    /// bcrypt cost factor for password hashing.
    pub hash_cost: u32,
    /// Routes (full paths, API base already applied).
    pub login_path: String,
    pub logout_path: String,
    pub refresh_path: String,
    pub validate_path: String,
    pub admin_ping_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            db_path: "gatekeeper_auth.db".to_string(),
            token_secret: "dev-secret-change-in-production-minimum-32-characters".to_string(),
            token_ttl_seconds: 600,
            auth_header: "authorization".to_string(),
            refresh_header: "refresh".to_string(),
            hash_cost: bcrypt::DEFAULT_COST,
            login_path: "/api/login".to_string(),
            logout_path: "/api/logout".to_string(),
            refresh_path: "/api/refresh".to_string(),
            validate_path: "/api/validate".to_string(),
            admin_ping_path: "/api/admin/ping".to_string(),
        }
    }
}

impl ApiConfig {
    /// Build configuration from environment variables, falling back to the
    /// defaults above for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base = env::var("API_BASE").unwrap_or_else(|_| "/api".to_string());
        let route = |var: &str, leaf: &str| -> String {
            let leaf = env::var(var).unwrap_or_else(|_| leaf.to_string());
            apply_base(&api_base, &leaf)
        };

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            db_path: env::var("AUTH_DB_PATH").unwrap_or(defaults.db_path),
            token_secret: env::var("API_ACCESS_TOKEN_SECRET_KEY").unwrap_or(defaults.token_secret),
            token_ttl_seconds: env::var("API_ACCESS_TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(defaults.token_ttl_seconds),
            auth_header: env::var("API_ACCESS_TOKEN_HEADER").unwrap_or(defaults.auth_header),
            refresh_header: env::var("API_REFRESH_TOKEN_HEADER").unwrap_or(defaults.refresh_header),
            hash_cost: env::var("PASSWORD_HASH_COST")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&v| (4..=31).contains(&v))
                .unwrap_or(defaults.hash_cost),
            login_path: route("API_LOGIN_PATH", "/login"),
            logout_path: route("API_LOGOUT_PATH", "/logout"),
            refresh_path: route("API_REFRESH_PATH", "/refresh"),
            validate_path: route("API_VALIDATE_PATH", "/validate"),
            admin_ping_path: route("API_ADMIN_PING_PATH", "/admin/ping"),
        }
    }
}

/// Join a base-relative route onto the API base. An override that already
/// carries the base passes through unchanged, so `API_LOGIN_PATH=/login`
/// and `API_LOGIN_PATH=/api/login` both resolve to `/api/login`.
fn apply_base(base: &str, leaf: &str) -> String {
    if leaf == base || leaf.starts_with(&format!("{}/", base)) {
        return leaf.to_string();
    }
    format!("{}{}", base, leaf)
}
