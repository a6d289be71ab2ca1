use async_trait::async_trait;

use super::{Command, CommandResult, ReplContext, read_line, report};
use crate::app::App;
use crate::auth::AuthUser;

pub struct LoginCommand;

/// Sign in with email and password, prompting for what is missing.
pub async fn log_in(
    app: &App,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<AuthUser> {
    let email = match email {
        Some(e) => e,
        None => read_line("  email: ")?,
    };
    let password = match password {
        Some(p) => p,
        None => read_line("  password: ")?,
    };
    let user = app.auth.sign_in(&email, &password).await?;
    println!("  ✓ signed in as {}", user.label());
    Ok(user)
}

#[async_trait]
impl Command for LoginCommand {
    fn name(&self) -> &str {
        "/login"
    }

    fn aliases(&self) -> &[&str] {
        &["/signin"]
    }

    fn usage(&self) -> &str {
        "[email]"
    }

    fn description(&self) -> &str {
        "sign in with email and password"
    }

    async fn execute(&self, args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        let email = Some(args.to_string()).filter(|a| !a.is_empty());
        if let Err(e) = log_in(ctx.app, email, None).await {
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
    async fn unknown_account_is_reported() {
        let app = test_app();
        let err = log_in(
            &app,
            Some("nobody@example.com".to_string()),
            Some("secret1".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No account found with this email. Please sign up first."
        );
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let app = test_app();
        let err = log_in(&app, Some(String::new()), Some(String::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter both email and password.");
    }
}
