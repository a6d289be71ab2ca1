use async_trait::async_trait;
use chrono::Utc;

use super::{Command, CommandResult, ReplContext, report};
use crate::app::App;
use crate::auth::AuthUser;
use crate::consts::format_bytes;
use crate::emoji::data_url;
use crate::emoji::gallery::format_distance;
use crate::profile::ProfileChanges;
use crate::store::UserDoc;

pub struct ProfileCommand;

async fn signed_in(app: &App) -> anyhow::Result<AuthUser> {
    app.auth
        .current_user()
        .await?
        .ok_or_else(|| anyhow::anyhow!("Please sign in to view your profile"))
}

fn render_profile(doc: &UserDoc) -> String {
    let field = |v: &Option<String>| {
        v.as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("—")
            .to_string()
    };
    let picture = doc
        .photo_url
        .as_deref()
        .and_then(data_url::payload_len)
        .filter(|n| *n > 0)
        .map(|n| format!("set ({})", format_bytes(n)))
        .unwrap_or_else(|| "none".to_string());

    let mut out = String::new();
    out.push_str(&format!("  name      {}\n", field(&doc.name)));
    out.push_str(&format!("  email     {}\n", field(&doc.email)));
    out.push_str(&format!("  city      {}\n", field(&doc.city)));
    out.push_str(&format!("  country   {}\n", field(&doc.country)));
    out.push_str(&format!("  bio       {}\n", field(&doc.bio)));
    out.push_str(&format!("  picture   {picture}\n"));
    if let Some(created) = doc.created_at {
        out.push_str(&format!(
            "  joined    {}\n",
            format_distance(created, Utc::now())
        ));
    }
    out
}

/// Print the signed-in user's profile.
pub async fn show_profile(app: &App) -> anyhow::Result<UserDoc> {
    let user = signed_in(app).await?;
    let doc = app.profiles.get_user_profile(&user.uid).await?;
    print!("{}", render_profile(&doc));
    Ok(doc)
}

/// Apply text changes to the signed-in user's profile.
pub async fn update_profile(app: &App, changes: &ProfileChanges) -> anyhow::Result<()> {
    let user = signed_in(app).await?;
    // the document must exist before an update
    app.profiles.get_user_profile(&user.uid).await?;
    app.profiles.update_user_profile(&user.uid, changes).await?;
    println!("  ✓ profile updated");
    Ok(())
}

#[async_trait]
impl Command for ProfileCommand {
    fn name(&self) -> &str {
        "/profile"
    }

    fn usage(&self) -> &str {
        "[set <field> <value>]"
    }

    fn description(&self) -> &str {
        "show or edit your profile (name, city, country, bio)"
    }

    async fn execute(&self, args: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        if args.is_empty() {
            if let Err(e) = show_profile(ctx.app).await {
                report(e);
            }
            return CommandResult::Handled;
        }

        let Some(rest) = args.strip_prefix("set ") else {
            report("usage: /profile set <field> <value>");
            return CommandResult::Handled;
        };
        let rest = rest.trim();
        let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

        let mut changes = ProfileChanges::default();
        let result = match changes.set(field, value) {
            Ok(()) => update_profile(ctx.app, &changes).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
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
    async fn set_then_show() {
        let app = test_app();
        let user = sign_up(
            &app,
            Some("ada@example.com".to_string()),
            Some("secret1".to_string()),
            Some("Ada".to_string()),
        )
        .await
        .unwrap();

        let mut ctx = ReplContext::new(&app);
        ProfileCommand.execute("set city Lisbon", &mut ctx).await;
        ProfileCommand.execute("set bio likes  tacos", &mut ctx).await;

        let doc = app.profiles.get_user_profile(&user.uid).await.unwrap();
        assert_eq!(doc.city.as_deref(), Some("Lisbon"));
        assert_eq!(doc.bio.as_deref(), Some("likes  tacos"));
        let text = render_profile(&doc);
        assert!(text.contains("Lisbon"));
        assert!(text.contains("picture   none"));
    }

    #[tokio::test]
    async fn show_requires_sign_in() {
        let app = test_app();
        let err = show_profile(&app).await.unwrap_err();
        assert_eq!(err.to_string(), "Please sign in to view your profile");
    }
}
