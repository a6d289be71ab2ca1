use async_trait::async_trait;

use super::{Command, CommandResult, ReplContext, read_line, report};
use crate::app::App;
use crate::auth::AuthUser;

pub struct SignupCommand;

/// Fill in whatever was not given on the command line from stdin.
fn ask(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(read_line(label)?),
    }
}

/// Create an account and sign in to it.
pub async fn sign_up(
    app: &App,
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
) -> anyhow::Result<AuthUser> {
    let name = ask(name, "  name: ")?;
    let email = ask(email, "  email: ")?;
    let password = ask(password, "  password: ")?;
    let user = app.auth.sign_up(&email, &password, &name).await?;
    println!("  ✓ welcome, {}", user.label());
    Ok(user)
}

#[async_trait]
impl Command for SignupCommand {
    fn name(&self) -> &str {
        "/signup"
    }

    fn aliases(&self) -> &[&str] {
        &["/register"]
    }

    fn usage(&self) -> &str {
        "[email]"
    }

    fn description(&self) -> &str {
        "create an account"
    }

    async fn execute(&self, args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        let email = Some(args.to_string()).filter(|a| !a.is_empty());
        if let Err(e) = sign_up(ctx.app, email, None, None).await {
            report(e);
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_app;

    #[tokio::test]
    async fn signs_up_with_everything_given() {
        let app = test_app();
        let user = sign_up(
            &app,
            Some("ada@example.com".to_string()),
            Some("secret1".to_string()),
            Some("Ada".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
        assert_eq!(app.auth.current_user().await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn validation_message_is_surfaced() {
        let app = test_app();
        let err = sign_up(
            &app,
            Some("ada@example.com".to_string()),
            Some("123".to_string()),
            Some("Ada".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must be at least 6 characters long."
        );
    }
}
