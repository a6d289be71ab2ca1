use async_trait::async_trait;

use super::{Command, CommandResult, ReplContext, report};
use crate::app::App;

pub struct WhoamiCommand;

/// Print the signed-in user and what generation will use.
pub async fn print_whoami(app: &App) -> anyhow::Result<()> {
    match app.auth.current_user().await? {
        Some(user) => {
            println!("  user      {}", user.label());
            if let Some(email) = &user.email {
                println!("  email     {email}");
            }
            println!("  uid       {}", user.uid);
        }
        None => println!("  user      not signed in"),
    }
    println!("  model     {}", app.emojis.model().unwrap_or("not configured"));
    println!("  database  {}", app.db_label());
    Ok(())
}

#[async_trait]
impl Command for WhoamiCommand {
    fn name(&self) -> &str {
        "/whoami"
    }

    fn description(&self) -> &str {
        "show the signed-in user and model"
    }

    async fn execute(&self, _args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        if let Err(e) = print_whoami(ctx.app).await {
            report(e);
            return CommandResult::Handled;
        }
        println!("  new       {}", ctx.visibility);
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_app;

    #[tokio::test]
    async fn returns_handled() {
        let app = test_app();
        let mut ctx = ReplContext::new(&app);
        assert_eq!(
            WhoamiCommand.execute("", &mut ctx).await,
            CommandResult::Handled
        );
    }

    #[tokio::test]
    async fn works_signed_in_and_out() {
        let app = test_app();
        print_whoami(&app).await.unwrap();
        app.auth
            .sign_up("ada@example.com", "secret1", "Ada")
            .await
            .unwrap();
        print_whoami(&app).await.unwrap();
    }
}
