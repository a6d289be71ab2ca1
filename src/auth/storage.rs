use std::sync::Mutex;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use super::AuthUser;
use super::identity::{ProviderSession, RefreshedTokens};
use crate::consts::{SESSION_MAX_AGE_SECS, now_ms};

/// Refresh tokens five minutes before the provider would reject them.
const EXPIRY_BUFFER_MS: u64 = 5 * 60 * 1000;

/// The locally mirrored provider session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    /// ID token expiration, milliseconds since epoch.
    pub expires: u64,
    /// Mirror expiration, milliseconds since epoch. Past this point the
    /// session is revalidated with the provider before use.
    pub mirror_expires: u64,
}

impl Session {
    pub fn from_provider(session: &ProviderSession) -> Self {
        let now = now_ms();
        Self {
            uid: session.uid.clone(),
            email: session.email.clone(),
            display_name: session.display_name.clone(),
            photo_url: session.photo_url.clone(),
            id_token: session.id_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires: token_expiry(now, session.expires_in),
            mirror_expires: now + SESSION_MAX_AGE_SECS * 1000,
        }
    }

    /// Swap in refreshed tokens and re-stamp the mirror.
    pub fn refreshed(mut self, tokens: RefreshedTokens) -> Self {
        let now = now_ms();
        self.id_token = tokens.id_token;
        self.refresh_token = tokens.refresh_token;
        self.expires = token_expiry(now, tokens.expires_in);
        self.mirror_expires = now + SESSION_MAX_AGE_SECS * 1000;
        self
    }

    pub fn is_expired(&self) -> bool {
        now_ms() >= self.expires
    }

    pub fn is_mirror_stale(&self) -> bool {
        now_ms() >= self.mirror_expires
    }

    pub fn user(&self) -> AuthUser {
        AuthUser {
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

fn token_expiry(now: u64, expires_in_secs: u64) -> u64 {
    (now + expires_in_secs * 1000).saturating_sub(EXPIRY_BUFFER_MS)
}

/// Keeps the single current session in SQLite.
///
/// Shares a database with config and documents. Pass the same path
/// used for `SqliteStore`.
pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    /// Open or create the session table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS session (
                id   INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// The current session, if any.
    pub fn get(&self) -> Result<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        let json: Option<String> = conn
            .query_row("SELECT data FROM session WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Replace the current session.
    pub fn set(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO session (id, data) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            [&json],
        )?;
        Ok(())
    }

    /// Forget the current session.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM session", [])?;
        Ok(())
    }
}
