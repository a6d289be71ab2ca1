use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::sync::Mutex;

use super::{EmojiRecord, Store, UserDoc, UserPatch};

/// SQLite-backed document store.
///
/// User profiles are kept as JSON documents keyed by uid; emojis are plain
/// rows so the gallery queries can use indexes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open document database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                uid  TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS emojis (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                prompt     TEXT NOT NULL,
                image_url  TEXT NOT NULL,
                created_at TEXT NOT NULL,
                is_public  INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS emojis_by_owner
                ON emojis (user_id, created_at DESC);
            CREATE INDEX IF NOT EXISTS emojis_by_visibility
                ON emojis (is_public, created_at DESC);",
        )
        .context("failed to create document tables")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }
}

fn read_user(conn: &Connection, uid: &str) -> Result<Option<UserDoc>> {
    let json: Option<String> = conn
        .query_row("SELECT data FROM users WHERE uid = ?1", [uid], |row| {
            row.get(0)
        })
        .optional()?;
    match json {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn write_user(conn: &Connection, doc: &UserDoc) -> Result<()> {
    let json = serde_json::to_string(doc)?;
    conn.execute(
        "INSERT INTO users (uid, data) VALUES (?1, ?2)
         ON CONFLICT(uid) DO UPDATE SET data = excluded.data",
        [&doc.uid, &json],
    )?;
    Ok(())
}

/// Fixed-width timestamps so lexical order is chronological order.
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn emoji_from_row(row: &Row<'_>) -> rusqlite::Result<(EmojiRecord, String)> {
    let created_at: String = row.get(4)?;
    Ok((
        EmojiRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            prompt: row.get(2)?,
            image_url: row.get(3)?,
            created_at: DateTime::<Utc>::default(),
            is_public: row.get(5)?,
        },
        created_at,
    ))
}

fn collect_emojis(
    rows: impl Iterator<Item = rusqlite::Result<(EmojiRecord, String)>>,
) -> Result<Vec<EmojiRecord>> {
    rows.map(|row| {
        let (mut record, created_at) = row?;
        record.created_at = DateTime::parse_from_rfc3339(&created_at)
            .with_context(|| format!("bad created_at on emoji {}", record.id))?
            .with_timezone(&Utc);
        Ok(record)
    })
    .collect()
}

const EMOJI_COLUMNS: &str = "id, user_id, prompt, image_url, created_at, is_public";

#[async_trait]
impl Store for SqliteStore {
    async fn get_user(&self, uid: &str) -> Result<Option<UserDoc>> {
        let conn = self.conn.lock().unwrap();
        read_user(&conn, uid)
    }

    async fn set_user(&self, doc: &UserDoc) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        write_user(&conn, doc)
    }

    async fn merge_user(&self, uid: &str, patch: &UserPatch) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut doc = read_user(&conn, uid)?.unwrap_or_else(|| UserDoc::new(uid));
        doc.apply(patch);
        write_user(&conn, &doc)
    }

    async fn update_user(&self, uid: &str, patch: &UserPatch) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let Some(mut doc) = read_user(&conn, uid)? else {
            bail!("no user document for {uid}");
        };
        doc.apply(patch);
        write_user(&conn, &doc)
    }

    async fn add_emoji(&self, record: &EmojiRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO emojis (id, user_id, prompt, image_url, created_at, is_public)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.user_id,
                record.prompt,
                record.image_url,
                timestamp(&record.created_at),
                record.is_public,
            ],
        )?;
        Ok(())
    }

    async fn find_emoji(&self, id: &str) -> Result<Option<EmojiRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("SELECT {EMOJI_COLUMNS} FROM emojis WHERE id = ?1"))?;
        let rows = stmt.query_map([id], emoji_from_row)?;
        Ok(collect_emojis(rows)?.into_iter().next())
    }

    async fn emojis_by_owner(&self, user_id: &str, limit: usize) -> Result<Vec<EmojiRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {EMOJI_COLUMNS} FROM emojis WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![user_id, limit as i64], emoji_from_row)?;
        collect_emojis(rows)
    }

    async fn public_emojis(&self, limit: usize) -> Result<Vec<EmojiRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {EMOJI_COLUMNS} FROM emojis WHERE is_public = 1
             ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map([limit as i64], emoji_from_row)?;
        collect_emojis(rows)
    }
}
