//! Store double that fails chosen operations and forwards the rest to an
//! in-memory SQLite store.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;

use emojify::store::sqlite::SqliteStore;
use emojify::store::{EmojiRecord, Store, UserDoc, UserPatch};

pub struct FailingStore {
    inner: SqliteStore,
    failing: Mutex<HashSet<&'static str>>,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::in_memory().unwrap(),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make every call to `op` (e.g. `"add_emoji"`) fail from now on.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn fail_all(&self) {
        for op in [
            "get_user",
            "set_user",
            "merge_user",
            "update_user",
            "add_emoji",
            "find_emoji",
            "emojis_by_owner",
            "public_emojis",
        ] {
            self.fail(op);
        }
    }

    pub fn inner(&self) -> &SqliteStore {
        &self.inner
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(op) {
            bail!("database is locked ({op})");
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn get_user(&self, uid: &str) -> Result<Option<UserDoc>> {
        self.check("get_user")?;
        self.inner.get_user(uid).await
    }

    async fn set_user(&self, doc: &UserDoc) -> Result<()> {
        self.check("set_user")?;
        self.inner.set_user(doc).await
    }

    async fn merge_user(&self, uid: &str, patch: &UserPatch) -> Result<()> {
        self.check("merge_user")?;
        self.inner.merge_user(uid, patch).await
    }

    async fn update_user(&self, uid: &str, patch: &UserPatch) -> Result<()> {
        self.check("update_user")?;
        self.inner.update_user(uid, patch).await
    }

    async fn add_emoji(&self, record: &EmojiRecord) -> Result<()> {
        self.check("add_emoji")?;
        self.inner.add_emoji(record).await
    }

    async fn find_emoji(&self, id: &str) -> Result<Option<EmojiRecord>> {
        self.check("find_emoji")?;
        self.inner.find_emoji(id).await
    }

    async fn emojis_by_owner(&self, user_id: &str, limit: usize) -> Result<Vec<EmojiRecord>> {
        self.check("emojis_by_owner")?;
        self.inner.emojis_by_owner(user_id, limit).await
    }

    async fn public_emojis(&self, limit: usize) -> Result<Vec<EmojiRecord>> {
        self.check("public_emojis")?;
        self.inner.public_emojis(limit).await
    }
}
