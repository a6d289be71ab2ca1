//! Gallery queries and terminal cards.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::data_url;
use crate::consts::{GALLERY_LIMIT, format_bytes};
use crate::store::{EmojiRecord, Store};

/// An emoji as shown in the gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct EmojiImage {
    pub id: String,
    pub url: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

impl From<EmojiRecord> for EmojiImage {
    fn from(record: EmojiRecord) -> Self {
        Self {
            id: record.id,
            url: record.image_url,
            prompt: record.prompt,
            created_at: record.created_at,
            user_id: record.user_id,
        }
    }
}

/// Read side of the emoji collection. Failures are logged and show up as an
/// empty gallery.
pub struct Gallery {
    store: Arc<dyn Store>,
}

impl Gallery {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The user's own emojis, newest first.
    pub async fn user_emojis(&self, user_id: &str) -> Vec<EmojiImage> {
        if user_id.is_empty() {
            tracing::error!("no user id provided");
            return Vec::new();
        }
        match self.store.emojis_by_owner(user_id, GALLERY_LIMIT).await {
            Ok(records) => records.into_iter().map(EmojiImage::from).collect(),
            Err(e) => {
                tracing::error!(error = %e, "error fetching user emojis");
                Vec::new()
            }
        }
    }

    /// Everyone's public emojis, newest first.
    pub async fn community_emojis(&self) -> Vec<EmojiImage> {
        match self.store.public_emojis(GALLERY_LIMIT).await {
            Ok(records) => records.into_iter().map(EmojiImage::from).collect(),
            Err(e) => {
                tracing::error!(error = %e, "error fetching community emojis");
                Vec::new()
            }
        }
    }

    /// Look up one emoji the viewer may see: public ones, or their own.
    pub async fn find(&self, id: &str, viewer: Option<&str>) -> Option<EmojiImage> {
        match self.store.find_emoji(id).await {
            Ok(Some(record)) if record.is_public || viewer == Some(record.user_id.as_str()) => {
                Some(record.into())
            }
            Ok(_) => None,
            Err(e) => {
                tracing::error!(error = %e, id, "error fetching emoji");
                None
            }
        }
    }
}

/// Render a gallery card.
pub fn render_card(emoji: &EmojiImage, now: DateTime<Utc>) -> String {
    let size = data_url::payload_len(&emoji.url)
        .map(format_bytes)
        .unwrap_or_else(|| "remote".to_string());
    format!(
        "  {}\n    {} · {} · {}",
        emoji.prompt,
        format_distance(emoji.created_at, now),
        emoji.id,
        size
    )
}

/// Render a list of cards, or a friendly placeholder.
pub fn render_grid(emojis: &[EmojiImage], now: DateTime<Utc>, empty: &str) -> String {
    if emojis.is_empty() {
        return format!("  {empty}\n");
    }
    let mut out = String::new();
    for emoji in emojis {
        out.push_str(&render_card(emoji, now));
        out.push('\n');
    }
    out
}

/// "3 minutes ago" style distance between `then` and `now`.
pub fn format_distance(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }
    let minutes = (secs as f64 / 60.0).round() as i64;
    let hours = (minutes as f64 / 60.0).round() as i64;
    let days = (minutes as f64 / 1440.0).round() as i64;
    let months = (days as f64 / 30.0).round() as i64;

    let phrase = match minutes {
        _ if secs < 30 => "less than a minute".to_string(),
        0..=1 => "1 minute".to_string(),
        2..=44 => format!("{minutes} minutes"),
        45..=89 => "about 1 hour".to_string(),
        90..=1439 => format!("about {hours} hours"),
        1440..=2519 => "1 day".to_string(),
        2520..=43199 => format!("{days} days"),
        43200..=86399 => format!("about {} month{}", months.max(1), if months > 1 { "s" } else { "" }),
        86400..=525599 => format!("{} months", months.max(2)),
        _ => {
            let years = days / 365;
            let remainder = days % 365;
            match remainder {
                0..=90 => format!("about {years} year{}", plural(years)),
                91..=273 => format!("over {years} year{}", plural(years)),
                _ => format!("almost {} years", years + 1),
            }
        }
    };
    format!("{phrase} ago")
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}
