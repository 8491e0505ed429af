//! Authentication Module
//! Mission: Credential login, token issuance with refresh rotation, and RBAC

pub mod api;
pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod store;

pub use api::AuthState;
pub use errors::AuthError;
pub use jwt::TokenCodec;
pub use middleware::{authentication_gate, require_roles};
pub use service::AuthService;
pub use store::{CredentialStore, SqliteCredentialStore};
