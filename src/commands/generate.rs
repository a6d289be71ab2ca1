use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;

use super::{Command, CommandResult, ReplContext, report};
use crate::app::App;
use crate::emoji::Visibility;
use crate::emoji::download;
use crate::emoji::gallery::{EmojiImage, render_card};
use crate::spinner::Spinner;
use crate::store::EmojiRecord;

pub struct AgainCommand;

/// Generate an emoji, print its card, and optionally save it into `out`.
pub async fn generate(
    app: &App,
    prompt: &str,
    visibility: Visibility,
    out: Option<&Path>,
) -> anyhow::Result<EmojiRecord> {
    let spinner = Spinner::start("generating");
    let result = app.emojis.generate_emoji(prompt, visibility).await;
    spinner.stop().await;
    let record = result?;

    println!("  ✓ {visibility} emoji created\n");
    println!("{}", render_card(&EmojiImage::from(record.clone()), Utc::now()));

    if let Some(dir) = out {
        let path = download::save(&app.http, &record.id, &record.image_url, dir).await?;
        println!("  saved to {}", path.display());
    }
    Ok(record)
}

impl ReplContext<'_> {
    /// Generate from a REPL prompt and remember it for `/again`.
    pub async fn run_prompt(&mut self, prompt: &str) {
        self.last_prompt = Some(prompt.to_string());
        match generate(self.app, prompt, self.visibility, None).await {
            Ok(_) => self.generated += 1,
            Err(e) => report(e),
        }
    }
}

#[async_trait]
impl Command for AgainCommand {
    fn name(&self) -> &str {
        "/again"
    }

    fn aliases(&self) -> &[&str] {
        &["/retry"]
    }

    fn description(&self) -> &str {
        "generate the last prompt again"
    }

    async fn execute(&self, _args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        match &ctx.last_prompt {
            Some(prompt) => CommandResult::Generate(prompt.clone()),
            None => {
                println!("  nothing to generate again yet: type a prompt first");
                CommandResult::Handled
            }
        }
    }
}
