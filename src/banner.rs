//! Startup banner and farewell.

use crate::consts::{AUTHOR, HOMEPAGE, REPO};

/// What the banner reports about this session.
pub struct BannerInfo<'a> {
    /// Display name or email of the signed-in user.
    pub user: Option<&'a str>,
    pub model: Option<&'a str>,
    pub google: bool,
    pub database: &'a str,
}

pub fn render_banner(info: &BannerInfo) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             E M O J I F Y             ║
   ║      describe it, and it appears      ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   user      {}
   model     {}
   google    {}
   database  {}

   type /help for commands, or describe an emoji
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.user.unwrap_or("not signed in (try /login or /signup)"),
        info.model
            .unwrap_or("not configured (emojify config set huggingface_api_key ...)"),
        if info.google { "available" } else { "not configured" },
        info.database,
    )
}

pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}

/// Print how many emojis this session made, then say goodbye.
pub fn print_session_summary(generated: usize) {
    match generated {
        0 => {}
        1 => println!("session: 1 emoji generated"),
        n => println!("session: {n} emojis generated"),
    }
    println!("goodbye.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_shows_session() {
        let text = render_banner(&BannerInfo {
            user: Some("Ada"),
            model: Some("PTtuts/flux-emoji"),
            google: false,
            database: "ephemeral",
        });
        assert!(text.contains("user      Ada"));
        assert!(text.contains("model     PTtuts/flux-emoji"));
        assert!(text.contains("google    not configured"));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn banner_hints_at_missing_setup() {
        let text = render_banner(&BannerInfo {
            user: None,
            model: None,
            google: true,
            database: "/tmp/emojify.db",
        });
        assert!(text.contains("not signed in"));
        assert!(text.contains("huggingface_api_key"));
    }

    #[test]
    fn summary_does_not_panic() {
        print_session_summary(0);
        print_session_summary(3);
    }
}
