use async_trait::async_trait;
use std::path::Path;

use super::{Command, CommandResult, ReplContext, report};
use crate::app::App;
use crate::consts::MAX_UPLOAD_BYTES;
use crate::profile::ProfileError;

pub struct AvatarCommand;

/// MIME type from the file extension, the way a browser labels uploads.
fn content_type(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Upload a new profile picture from a local file.
pub async fn set_avatar(app: &App, path: &Path) -> anyhow::Result<()> {
    let Some(user) = app.auth.current_user().await? else {
        anyhow::bail!("Please sign in to change your profile picture");
    };
    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?
        .len();
    if size > MAX_UPLOAD_BYTES as u64 {
        return Err(ProfileError::FileTooLarge.into());
    }
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;

    app.profiles.get_user_profile(&user.uid).await?;
    app.profiles
        .update_profile_picture(&user.uid, bytes, content_type(path))
        .await?;
    println!("  ✓ profile picture updated");
    Ok(())
}

#[async_trait]
impl Command for AvatarCommand {
    fn name(&self) -> &str {
        "/avatar"
    }

    fn usage(&self) -> &str {
        "<path>"
    }

    fn description(&self) -> &str {
        "upload a profile picture"
    }

    async fn execute(&self, args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        if args.is_empty() {
            report("usage: /avatar <path>");
            return CommandResult::Handled;
        }
        if let Err(e) = set_avatar(ctx.app, Path::new(args)).await {
            report(e);
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_app;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type(Path::new("me.png")), "image/png");
        assert_eq!(content_type(Path::new("me.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("notes.txt")), "application/octet-stream");
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_reading() {
        let app = test_app();
        let user = app
            .auth
            .sign_up("ada@example.com", "secret1", "Ada")
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_UPLOAD_BYTES as u64 + 1).unwrap();

        let err = set_avatar(&app, &path).await.unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 5MB");
        let doc = app.profiles.get_user_profile(&user.uid).await.unwrap();
        assert!(doc.photo_url.unwrap_or_default().is_empty());
    }
}
