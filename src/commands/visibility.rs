use async_trait::async_trait;

use super::{Command, CommandResult, ReplContext, report};
use crate::emoji::Visibility;

pub struct VisibilityCommand;

#[async_trait]
impl Command for VisibilityCommand {
    fn name(&self) -> &str {
        "/visibility"
    }

    fn usage(&self) -> &str {
        "[public|private]"
    }

    fn description(&self) -> &str {
        "show or set who sees new emojis"
    }

    async fn execute(&self, args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        if args.is_empty() {
            println!("  new emojis are {}", ctx.visibility);
            return CommandResult::Handled;
        }
        match args.parse::<Visibility>() {
            Ok(v) => {
                ctx.visibility = v;
                println!("  ✓ new emojis are {v}");
            }
            Err(e) => report(e),
        }
        CommandResult::Handled
    }
}
