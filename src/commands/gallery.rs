use async_trait::async_trait;
use chrono::Utc;

use super::{Command, CommandResult, ReplContext, report};
use crate::app::App;
use crate::emoji::gallery::render_grid;

pub struct GalleryCommand;

/// Print the user's own emojis, or everyone's public ones.
pub async fn show_gallery(app: &App, community: bool) -> anyhow::Result<()> {
    let (title, emojis, empty) = if community {
        (
            "Community emojis",
            app.gallery.community_emojis().await,
            "No community emojis yet. Be the first to share!",
        )
    } else {
        let Some(user) = app.auth.current_user().await? else {
            anyhow::bail!("Please sign in to see your emojis");
        };
        (
            "My emojis",
            app.gallery.user_emojis(&user.uid).await,
            "You haven't created any emojis yet. Describe one to get started!",
        )
    };

    println!("  {title} ({})\n", emojis.len());
    print!("{}", render_grid(&emojis, Utc::now(), empty));
    Ok(())
}

#[async_trait]
impl Command for GalleryCommand {
    fn name(&self) -> &str {
        "/gallery"
    }

    fn usage(&self) -> &str {
        "[mine|community]"
    }

    fn description(&self) -> &str {
        "browse your emojis or the community's"
    }

    async fn execute(&self, args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        let community = match args {
            "" | "mine" => false,
            "community" | "all" => true,
            other => {
                report(format!("unknown gallery: {other} (expected mine or community)"));
                return CommandResult::Handled;
            }
        };
        if let Err(e) = show_gallery(ctx.app, community).await {
            report(e);
        }
        CommandResult::Handled
    }
}
