//! Credential Storage
//! Mission: Persist credentials with SQLite, keyed by unique login

use crate::auth::models::{default_settings, Credential, DEFAULT_ROLE};
use crate::auth::password;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// Contract the auth core needs from the document store: lookup and save
/// keyed by the unique login field. Blocking, bounded I/O with no internal
/// retries; retry policy belongs to the store client.
pub trait CredentialStore: Send + Sync {
    /// Fetch a credential by its unique login, `None` if absent.
    fn find_by_login(&self, login: &str) -> Result<Option<Credential>>;

    /// Persist the mutable fields of an existing credential (refresh
    /// token, roles, settings). Last write wins; concurrent saves for the
    /// same login are not serialized beyond the store's own locking.
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Insert a new credential, hashing the plaintext password. The
    /// password hash is computed here and only here.
    fn create(&self, login: &str, password: &str, roles: Vec<String>) -> Result<Credential>;
}

/// Credential storage with SQLite backend
pub struct SqliteCredentialStore {
    db_path: String,
    hash_cost: u32,
}

impl SqliteCredentialStore {
    /// Create a new store and initialize the schema.
    pub fn new(db_path: &str, hash_cost: u32) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
            hash_cost,
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS credentials (
                id TEXT PRIMARY KEY,
                login TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                roles TEXT NOT NULL,
                refresh_token TEXT,
                settings TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.seed_default_admin(&conn)?;

        Ok(())
    }

    /// Seed a default admin credential on an empty store so a fresh
    /// deployment is reachable.
    fn seed_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM credentials", [], |row| row.get(0))
            .context("Failed to count credentials")?;

        if count == 0 {
            let password_hash = password::hash_password("admin123", self.hash_cost)?;

            let admin = Credential {
                id: Uuid::new_v4(),
                login: "admin".to_string(),
                password_hash,
                roles: vec!["ADMIN".to_string(), DEFAULT_ROLE.to_string()],
                refresh_token: None,
                settings: default_settings(),
                created_at: Utc::now().to_rfc3339(),
            };
            self.insert(conn, &admin)?;

            info!("🔐 Default admin credential created (login: admin, password: admin123)");
            warn!("⚠️  CHANGE DEFAULT PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    fn insert(&self, conn: &Connection, credential: &Credential) -> Result<()> {
        conn.execute(
            "INSERT INTO credentials (id, login, password_hash, roles, refresh_token, settings, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                credential.id.to_string(),
                credential.login,
                credential.password_hash,
                serde_json::to_string(&credential.roles)?,
                credential.refresh_token,
                credential.settings.to_string(),
                credential.created_at,
            ],
        )
        .context("Failed to insert credential")?;
        Ok(())
    }

    fn row_to_credential(row: &rusqlite::Row<'_>) -> rusqlite::Result<Credential> {
        let id_str: String = row.get(0)?;
        let roles_str: String = row.get(3)?;
        let settings_str: String = row.get(5)?;

        Ok(Credential {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            login: row.get(1)?,
            password_hash: row.get(2)?,
            roles: serde_json::from_str(&roles_str)
                .unwrap_or_else(|_| vec![DEFAULT_ROLE.to_string()]),
            refresh_token: row.get(4)?,
            settings: serde_json::from_str::<Value>(&settings_str)
                .unwrap_or_else(|_| default_settings()),
            created_at: row.get(6)?,
        })
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn find_by_login(&self, login: &str) -> Result<Option<Credential>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, login, password_hash, roles, refresh_token, settings, created_at
             FROM credentials WHERE login = ?1",
        )?;

        let result = stmt.query_row(params![login], Self::row_to_credential);

        match result {
            Ok(credential) => Ok(Some(credential)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn
            .execute(
                "UPDATE credentials
                 SET password_hash = ?2, roles = ?3, refresh_token = ?4, settings = ?5
                 WHERE login = ?1",
                params![
                    credential.login,
                    credential.password_hash,
                    serde_json::to_string(&credential.roles)?,
                    credential.refresh_token,
                    credential.settings.to_string(),
                ],
            )
            .context("Failed to update credential")?;

        if rows_affected == 0 {
            anyhow::bail!("No credential found for login '{}'", credential.login);
        }

        Ok(())
    }

    fn create(&self, login: &str, plaintext: &str, roles: Vec<String>) -> Result<Credential> {
        let password_hash = password::hash_password(plaintext, self.hash_cost)?;

        let roles = if roles.is_empty() {
            vec![DEFAULT_ROLE.to_string()]
        } else {
            roles
        };

        let credential = Credential {
            id: Uuid::new_v4(),
            login: login.to_string(),
            password_hash,
            roles,
            refresh_token: None,
            settings: default_settings(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        self.insert(&conn, &credential)?;

        info!(login = %credential.login, roles = ?credential.roles, "✅ Created credential");

        Ok(credential)
    }
}
