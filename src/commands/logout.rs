use async_trait::async_trait;

use super::{Command, CommandResult, ReplContext, report};
use crate::app::App;

pub struct LogoutCommand;

pub async fn log_out(app: &App) -> anyhow::Result<()> {
    app.auth.sign_out().await?;
    println!("  ✓ signed out");
    Ok(())
}

#[async_trait]
impl Command for LogoutCommand {
    fn name(&self) -> &str {
        "/logout"
    }

    fn aliases(&self) -> &[&str] {
        &["/signout"]
    }

    fn description(&self) -> &str {
        "sign out"
    }

    async fn execute(&self, _args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        if let Err(e) = log_out(ctx.app).await {
            report(e);
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sign_up;
    use crate::commands::tests::test_app;

    #[tokio::test]
    async fn clears_the_session() {
        let app = test_app();
        sign_up(
            &app,
            Some("ada@example.com".to_string()),
            Some("secret1".to_string()),
            Some("Ada".to_string()),
        )
        .await
        .unwrap();

        let mut ctx = ReplContext::new(&app);
        assert_eq!(
            LogoutCommand.execute("", &mut ctx).await,
            CommandResult::Handled
        );
        assert!(app.auth.current_user().await.unwrap().is_none());
    }
}
