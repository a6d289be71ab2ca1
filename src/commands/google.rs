use async_trait::async_trait;

use super::{Command, CommandResult, ReplContext, read_line, report};
use crate::app::App;
use crate::auth::{AuthError, AuthUser};

pub struct GoogleCommand;

/// Browser sign-in with Google: print the consent URL, read back the code
/// or redirect URL, and sign in with the resulting ID token.
pub async fn google_sign_in(app: &App) -> anyhow::Result<AuthUser> {
    let Some(google) = &app.google else {
        anyhow::bail!("Google sign in is not configured (set google_client_id)");
    };

    let pending = google.start();
    // headless or SSH sessions have no browser
    let _ = open::that(&pending.url);

    println!("  Open this URL to sign in with Google:\n");
    println!("  {}\n", pending.url);
    let pasted = read_line("  Paste the code or the redirect URL: ")?;

    let id_token = google.finish(&pending, &pasted).await?;
    let user = app.auth.sign_in_with_google(&id_token).await?;
    println!("  ✓ signed in as {}", user.label());
    Ok(user)
}

#[async_trait]
impl Command for GoogleCommand {
    fn name(&self) -> &str {
        "/google"
    }

    fn description(&self) -> &str {
        "sign in with Google"
    }

    async fn execute(&self, _args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        if let Err(e) = google_sign_in(ctx.app).await {
            match e.downcast_ref::<AuthError>() {
                Some(AuthError::PopupClosedByUser) => println!("  {e}"),
                _ => report(e),
            }
        }
        CommandResult::Handled
    }
}
