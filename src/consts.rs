//! Project-wide constants.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Hosted model that turns a prompt into an emoji image.
pub const DEFAULT_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/PTtuts/flux-emoji";

/// Maximum number of emojis returned by a gallery query.
pub const GALLERY_LIMIT: usize = 50;

/// Largest accepted profile picture upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Lifetime of the local session mirror, in seconds.
pub const SESSION_MAX_AGE_SECS: u64 = 7200;

/// Default database path: `~/.emojify/emojify.db`.
/// Single DB for config, session, and documents.
pub fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".emojify").join("emojify.db"))
}

/// Format a byte count for display (e.g. `1.4 KB`).
pub fn format_bytes(n: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let n = n as f64;
    if n >= MB {
        format!("{:.1} MB", n / MB)
    } else if n >= KB {
        format!("{:.1} KB", n / KB)
    } else {
        format!("{} B", n as u64)
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!AUTHOR.is_empty());
        assert!(!HOMEPAGE.is_empty());
        assert!(!REPO.is_empty());
        assert!(!DEFAULT_MODEL_URL.is_empty());
    }

    #[test]
    fn consts_from_cargo_toml() {
        assert!(AUTHOR.contains("Emojify"));
        assert!(REPO.contains("github.com"));
    }

    #[test]
    fn upload_limit_is_five_mebibytes() {
        assert_eq!(MAX_UPLOAD_BYTES, 5_242_880);
    }

    #[test]
    fn format_bytes_small() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(999), "999 B");
    }

    #[test]
    fn format_bytes_kilobytes() {
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
    }

    #[test]
    fn format_bytes_megabytes() {
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn default_db_path_is_under_dot_emojify() {
        if let Ok(path) = default_db_path() {
            assert!(path.ends_with(".emojify/emojify.db"));
        }
    }
}
