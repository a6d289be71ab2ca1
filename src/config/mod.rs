//! Key-value configuration storage backed by SQLite, and the resolved
//! [`Settings`] the rest of the app is wired from.
//!
//! Shares a database with [`SessionStore`](crate::auth::SessionStore) and
//! [`SqliteStore`](crate::store::sqlite::SqliteStore). Pass the same
//! path to all three.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::consts::DEFAULT_MODEL_URL;

/// Base URL of the identity provider's account endpoints.
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
/// Base URL of the identity provider's token refresh endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Config keys accepted by `emojify config`, with the environment variable
/// that overrides each one.
pub const KEYS: &[(&str, &str)] = &[
    ("firebase_api_key", "FIREBASE_API_KEY"),
    ("huggingface_api_key", "HUGGINGFACE_API_KEY"),
    ("google_client_id", "GOOGLE_CLIENT_ID"),
    ("google_client_secret", "GOOGLE_CLIENT_SECRET"),
    ("model_url", "EMOJIFY_MODEL_URL"),
];

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the config table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get a config value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a config value (upsert). Only keys listed in [`KEYS`] are accepted.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if !is_known_key(key) {
            bail!("unknown config key: {key}");
        }
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a config key.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }
}

fn is_known_key(key: &str) -> bool {
    KEYS.iter().any(|(k, _)| *k == key)
}

/// Values passed on the command line. They beat everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub model_url: Option<String>,
}

/// Everything the services need to talk to the outside world.
#[derive(Debug, Clone)]
pub struct Settings {
    pub firebase_api_key: Option<String>,
    pub huggingface_api_key: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub model_url: String,
    pub identity_url: String,
    pub token_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            firebase_api_key: None,
            huggingface_api_key: None,
            google_client_id: None,
            google_client_secret: None,
            model_url: DEFAULT_MODEL_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings from the process environment.
    /// Priority: command line → environment → config table → default.
    pub fn resolve(config: &Config, overrides: &Overrides) -> Result<Self> {
        Self::resolve_with(config, overrides, |var| std::env::var(var).ok())
    }

    /// Like [`Settings::resolve`] but with an injectable environment lookup.
    pub fn resolve_with(
        config: &Config,
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let lookup = |key: &str| -> Result<Option<String>> {
            let var = KEYS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
                .unwrap_or_default();
            if let Some(value) = env(var).filter(|v| !v.is_empty()) {
                return Ok(Some(value));
            }
            config.get(key)
        };

        let model_url = match &overrides.model_url {
            Some(url) => url.clone(),
            None => lookup("model_url")?.unwrap_or_else(|| DEFAULT_MODEL_URL.to_string()),
        };

        Ok(Self {
            firebase_api_key: lookup("firebase_api_key")?,
            huggingface_api_key: lookup("huggingface_api_key")?,
            google_client_id: lookup("google_client_id")?,
            google_client_secret: lookup("google_client_secret")?,
            model_url,
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_config() -> Config {
        Config::open(":memory:").unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let config = mem_config();
        assert!(config.get("model_url").unwrap().is_none());
    }

    #[test]
    fn set_and_get() {
        let config = mem_config();
        config.set("huggingface_api_key", "hf_test").unwrap();
        assert_eq!(
            config.get("huggingface_api_key").unwrap().unwrap(),
            "hf_test"
        );
    }

    #[test]
    fn set_overwrites_existing() {
        let config = mem_config();
        config.set("model_url", "old").unwrap();
        config.set("model_url", "new").unwrap();
        assert_eq!(config.get("model_url").unwrap().unwrap(), "new");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let config = mem_config();
        let err = config.set("theme", "dark").unwrap_err();
        assert!(err.to_string().contains("unknown config key"));
    }

    #[test]
    fn remove_deletes_key() {
        let config = mem_config();
        config.set("model_url", "test").unwrap();
        config.remove("model_url").unwrap();
        assert!(config.get("model_url").unwrap().is_none());
    }

    #[test]
    fn remove_nonexistent_is_ok() {
        let config = mem_config();
        config.remove("nonexistent").unwrap();
    }

    #[test]
    fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config-test.db");
        let path_str = path.to_str().unwrap();

        {
            let config = Config::open(path_str).unwrap();
            config.set("firebase_api_key", "persisted").unwrap();
        }

        {
            let config = Config::open(path_str).unwrap();
            assert_eq!(
                config.get("firebase_api_key").unwrap().unwrap(),
                "persisted"
            );
        }
    }

    #[test]
    fn resolve_defaults() {
        let settings = Settings::resolve_with(&mem_config(), &Overrides::default(), no_env).unwrap();
        assert_eq!(settings.model_url, DEFAULT_MODEL_URL);
        assert_eq!(settings.identity_url, DEFAULT_IDENTITY_URL);
        assert!(settings.huggingface_api_key.is_none());
        assert!(settings.firebase_api_key.is_none());
    }

    #[test]
    fn resolve_reads_config_table() {
        let config = mem_config();
        config.set("huggingface_api_key", "hf_from_config").unwrap();
        let settings = Settings::resolve_with(&config, &Overrides::default(), no_env).unwrap();
        assert_eq!(settings.huggingface_api_key.as_deref(), Some("hf_from_config"));
    }

    #[test]
    fn env_beats_config_table() {
        let config = mem_config();
        config.set("huggingface_api_key", "hf_from_config").unwrap();
        let env = |var: &str| (var == "HUGGINGFACE_API_KEY").then(|| "hf_from_env".to_string());
        let settings = Settings::resolve_with(&config, &Overrides::default(), env).unwrap();
        assert_eq!(settings.huggingface_api_key.as_deref(), Some("hf_from_env"));
    }

    #[test]
    fn empty_env_falls_through() {
        let config = mem_config();
        config.set("firebase_api_key", "fb_from_config").unwrap();
        let env = |_: &str| Some(String::new());
        let settings = Settings::resolve_with(&config, &Overrides::default(), env).unwrap();
        assert_eq!(settings.firebase_api_key.as_deref(), Some("fb_from_config"));
    }

    #[test]
    fn command_line_beats_env() {
        let env = |var: &str| (var == "EMOJIFY_MODEL_URL").then(|| "http://env".to_string());
        let overrides = Overrides {
            model_url: Some("http://cli".to_string()),
        };
        let settings = Settings::resolve_with(&mem_config(), &overrides, env).unwrap();
        assert_eq!(settings.model_url, "http://cli");
    }
}
