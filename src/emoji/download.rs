//! Saving an emoji image to disk.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use super::data_url;

/// `emoji-<id>.png`, or `download` when there is no id.
pub fn file_name(id: &str) -> String {
    if id.is_empty() {
        "download".to_string()
    } else {
        format!("emoji-{id}.png")
    }
}

/// Resolve the image bytes behind `url`: decoded inline for `data:` URLs,
/// fetched over HTTP otherwise.
pub async fn fetch(http: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    if url.starts_with("data:") {
        let (_, bytes) = data_url::decode(url).context("malformed data URL")?;
        return Ok(bytes);
    }

    let resp = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("failed to fetch {url}: {status}");
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Write the image for emoji `id` into `dir`. Returns the written path.
pub async fn save(http: &reqwest::Client, id: &str, url: &str, dir: &Path) -> Result<PathBuf> {
    let bytes = fetch(http, url).await?;
    let path = dir.join(file_name(id));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "emoji saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(file_name("abc"), "emoji-abc.png");
        assert_eq!(file_name(""), "download");
    }

    #[tokio::test]
    async fn saves_data_url_payload() {
        let dir = tempfile::tempdir().unwrap();
        let url = data_url::encode(Some("image/png"), b"pixels");
        let path = save(&reqwest::Client::new(), "e1", &url, dir.path())
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("emoji-e1.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn malformed_data_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = save(&reqwest::Client::new(), "e1", "data:nope", dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed data URL"));
    }
}
