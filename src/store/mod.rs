pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A per-user profile document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDoc {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// 256px display image (data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// 32px auth thumbnail (data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// A partial write to a [`UserDoc`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl UserDoc {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Self::default()
        }
    }

    /// Copy every field set in `patch` onto this document.
    pub fn apply(&mut self, patch: &UserPatch) {
        fn set<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }
        set(&mut self.email, &patch.email);
        set(&mut self.name, &patch.name);
        set(&mut self.city, &patch.city);
        set(&mut self.country, &patch.country);
        set(&mut self.bio, &patch.bio);
        set(&mut self.photo_url, &patch.photo_url);
        set(&mut self.thumbnail_url, &patch.thumbnail_url);
        set(&mut self.created_at, &patch.created_at);
        set(&mut self.updated_at, &patch.updated_at);
        set(&mut self.last_login, &patch.last_login);
    }
}

/// A generated emoji as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiRecord {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    /// Image as a `data:` URL or a remote URL.
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub is_public: bool,
}

/// The document store holding user profiles and emoji records.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, uid: &str) -> Result<Option<UserDoc>>;

    /// Overwrite the whole document.
    async fn set_user(&self, doc: &UserDoc) -> Result<()>;

    /// Write the patched fields, creating the document if needed.
    async fn merge_user(&self, uid: &str, patch: &UserPatch) -> Result<()>;

    /// Write the patched fields of an existing document. Errors if missing.
    async fn update_user(&self, uid: &str, patch: &UserPatch) -> Result<()>;

    async fn add_emoji(&self, record: &EmojiRecord) -> Result<()>;

    async fn find_emoji(&self, id: &str) -> Result<Option<EmojiRecord>>;

    /// Newest first.
    async fn emojis_by_owner(&self, user_id: &str, limit: usize) -> Result<Vec<EmojiRecord>>;

    /// Newest first.
    async fn public_emojis(&self, limit: usize) -> Result<Vec<EmojiRecord>>;
}
