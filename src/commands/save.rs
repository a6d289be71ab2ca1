use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{Command, CommandResult, ReplContext, report};
use crate::app::App;
use crate::emoji::download;

pub struct SaveCommand;

/// Save an emoji the current user can see into `dir`.
pub async fn save_emoji(app: &App, id: &str, dir: &Path) -> anyhow::Result<PathBuf> {
    let viewer = app.auth.current_user().await?.map(|u| u.uid);
    let Some(emoji) = app.gallery.find(id, viewer.as_deref()).await else {
        anyhow::bail!("no emoji with id {id}");
    };
    let path = download::save(&app.http, &emoji.id, &emoji.url, dir).await?;
    println!("  ✓ saved to {}", path.display());
    Ok(path)
}

#[async_trait]
impl Command for SaveCommand {
    fn name(&self) -> &str {
        "/save"
    }

    fn aliases(&self) -> &[&str] {
        &["/download"]
    }

    fn usage(&self) -> &str {
        "<id> [dir]"
    }

    fn description(&self) -> &str {
        "save an emoji as a PNG file"
    }

    async fn execute(&self, args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        let mut parts = args.split_whitespace();
        let Some(id) = parts.next() else {
            report("usage: /save <id> [dir]");
            return CommandResult::Handled;
        };
        let dir = PathBuf::from(parts.next().unwrap_or("."));
        if let Err(e) = save_emoji(ctx.app, id, &dir).await {
            report(e);
        }
        CommandResult::Handled
    }
}
