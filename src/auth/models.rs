//! Authentication Models
//! Mission: Define credential, claim, and principal data structures

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role granted to every credential that has no explicit role set.
pub const DEFAULT_ROLE: &str = "USER";

/// One stored credential per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt digest - never serialize
    pub roles: Vec<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub settings: Value,
    pub created_at: String,
}

/// Default opaque settings blob for new credentials.
pub fn default_settings() -> Value {
    serde_json::json!({ "theme": "theme-default" })
}

/// JWT Claims payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (credential id)
    pub login: String,
    pub roles: Vec<String>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String, // unique per mint so consecutive tokens never collide
}

/// Authenticated identity attached to a request after token verification.
///
/// Roles come from the credential record at request time, not from the
/// token, so a revoked role is observed at the very next request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub login: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn from_credential(credential: &Credential) -> Self {
        Self {
            id: credential.id,
            login: credential.login.clone(),
            roles: credential.roles.clone(),
        }
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub settings: Value,
}

/// Refresh response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_credential() -> Credential {
        Credential {
            id: Uuid::new_v4(),
            login: "alice".to_string(),
            password_hash: "hash".to_string(),
            roles: vec!["USER".to_string(), "ADMIN".to_string()],
            refresh_token: Some("rt-1".to_string()),
            settings: default_settings(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_credential_serialization_hides_secrets() {
        let credential = sample_credential();
        let json = serde_json::to_value(&credential).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["login"], "alice");
    }

    #[test]
    fn test_principal_snapshot_from_credential() {
        let credential = sample_credential();
        let principal = Principal::from_credential(&credential);

        assert_eq!(principal.id, credential.id);
        assert_eq!(principal.login, "alice");
        assert_eq!(principal.roles, credential.roles);
    }

    #[test]
    fn test_login_response_wire_format() {
        let response = LoginResponse {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            settings: default_settings(),
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["accessToken"], "at");
        assert_eq!(json["refreshToken"], "rt");
        assert_eq!(json["settings"]["theme"], "theme-default");
    }
}
