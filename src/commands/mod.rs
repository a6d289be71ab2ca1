//! REPL commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`], which handles dispatch, alias resolution and help
//! generation. Most command modules also expose the plain async function
//! behind the command so the one-shot subcommands can share it.

mod avatar;
mod gallery;
mod generate;
mod google;
mod login;
mod logout;
mod profile;
mod save;
mod signup;
mod visibility;
mod whoami;

pub use avatar::set_avatar;
pub use gallery::show_gallery;
pub use generate::generate;
pub use google::google_sign_in;
pub use login::log_in;
pub use logout::log_out;
pub use profile::{show_profile, update_profile};
pub use save::save_emoji;
pub use signup::sign_up;
pub use whoami::print_whoami;

use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::Arc;

use crate::app::App;
use crate::emoji::Visibility;

/// REPL state commands may read and change.
pub struct ReplContext<'a> {
    pub app: &'a App,
    pub visibility: Visibility,
    pub last_prompt: Option<String>,
    /// Emojis generated this session.
    pub generated: usize,
}

impl<'a> ReplContext<'a> {
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            visibility: Visibility::default(),
            last_prompt: None,
            generated: 0,
        }
    }
}

/// What the REPL should do after a command runs.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Not a command: the input is a prompt.
    NotACommand,
    /// Command handled, continue the REPL loop.
    Handled,
    /// Generate from this prompt, as if it had been typed.
    Generate(String),
    /// Exit the REPL.
    Quit,
}

#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/whoami"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/h", "/?"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Argument synopsis for `/help`, e.g. `"<id> [dir]"`.
    fn usage(&self) -> &str {
        ""
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    /// Run the command. `args` is everything after the command name.
    async fn execute(&self, args: &str, ctx: &mut ReplContext<'_>) -> CommandResult;
}

pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(HelpCommand),
            Arc::new(whoami::WhoamiCommand),
            Arc::new(signup::SignupCommand),
            Arc::new(login::LoginCommand),
            Arc::new(google::GoogleCommand),
            Arc::new(logout::LogoutCommand),
            Arc::new(profile::ProfileCommand),
            Arc::new(avatar::AvatarCommand),
            Arc::new(gallery::GalleryCommand),
            Arc::new(save::SaveCommand),
            Arc::new(generate::AgainCommand),
            Arc::new(visibility::VisibilityCommand),
            Arc::new(QuitCommand),
        ];
        Self { commands }
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, ctx: &mut ReplContext<'_>) -> CommandResult {
        let input = input.trim();
        let (head, args) = input
            .split_once(char::is_whitespace)
            .map(|(h, a)| (h, a.trim()))
            .unwrap_or((input, ""));
        // bare aliases like `exit` only count on their own
        if !head.starts_with('/') && !args.is_empty() {
            return CommandResult::NotACommand;
        }

        for command in &self.commands {
            if head == command.name() || command.aliases().contains(&head) {
                // /help needs the registry itself
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(args, ctx).await;
            }
        }

        if head.starts_with('/') {
            println!("unknown command: {head}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    pub fn help_text(&self) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.usage(), c.aliases()), c.description()))
            .collect();

        let max_width = entries
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out.push_str("\n  anything else is a prompt: describe an emoji to generate it\n");
        out
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases.
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "/help"
    }

    fn aliases(&self) -> &[&str] {
        &["/h", "/?"]
    }

    fn description(&self) -> &str {
        "list commands"
    }

    async fn execute(&self, _args: &str, _ctx: &mut ReplContext<'_>) -> CommandResult {
        CommandResult::Handled
    }
}

/// Ends the REPL. Bare `quit` and `exit` work too, since people type them.
struct QuitCommand;

#[async_trait]
impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["quit", "exit", "/exit"]
    }

    fn description(&self) -> &str {
        "exit emojify"
    }

    async fn execute(&self, _args: &str, _ctx: &mut ReplContext<'_>) -> CommandResult {
        CommandResult::Quit
    }
}

fn format_label(name: &str, usage: &str, aliases: &[&str]) -> String {
    let mut label = name.to_string();
    if !usage.is_empty() {
        label.push(' ');
        label.push_str(usage);
    }
    if !aliases.is_empty() {
        label.push_str(&format!(" ({})", aliases.join(", ")));
    }
    label
}

/// Print `label` and read one trimmed line from stdin.
pub fn read_line(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Print a command failure the way every command does.
pub(crate) fn report(err: impl std::fmt::Display) {
    eprintln!("  ✗ {err}");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::Parts;
    use crate::auth::SessionStore;
    use crate::auth::mock::MockIdentity;
    use crate::config::Settings;
    use crate::generator::mock::MockGenerator;
    use crate::store::sqlite::SqliteStore;

    pub(crate) fn test_app() -> App {
        App::from_parts(Parts {
            settings: Settings::default(),
            db_path: ":memory:".to_string(),
            identity: Arc::new(MockIdentity::new()),
            store: Arc::new(SqliteStore::in_memory().unwrap()),
            sessions: SessionStore::open(":memory:").unwrap(),
            generator: Some(Arc::new(MockGenerator::png(4))),
        })
    }

    #[test]
    fn all_builtins_registered() {
        let reg = CommandRegistry::new();
        let names = reg.names();
        for name in [
            "/help",
            "/whoami",
            "/signup",
            "/login",
            "/google",
            "/logout",
            "/profile",
            "/avatar",
            "/gallery",
            "/save",
            "/again",
            "/visibility",
            "/quit",
        ] {
            assert!(names.contains(&name), "missing {name}");
        }
    }

    #[test]
    fn no_duplicate_triggers() {
        let reg = CommandRegistry::new();
        let triggers = reg.all_triggers();
        let mut seen = Vec::new();
        for t in &triggers {
            assert!(!seen.contains(t), "duplicate trigger: {t}");
            seen.push(t);
        }
    }

    #[test]
    fn help_text_includes_all_commands() {
        let reg = CommandRegistry::new();
        let text = reg.help_text();
        for name in reg.names() {
            assert!(text.contains(name), "help missing: {name}");
        }
        assert!(text.contains("/save <id> [dir]"));
    }

    #[tokio::test]
    async fn unknown_slash_command_is_handled() {
        let app = test_app();
        let mut ctx = ReplContext::new(&app);
        let reg = CommandRegistry::new();
        assert_eq!(
            reg.dispatch("/foobar", &mut ctx).await,
            CommandResult::Handled
        );
    }

    #[tokio::test]
    async fn every_quit_spelling_ends_the_repl() {
        let app = test_app();
        let mut ctx = ReplContext::new(&app);
        let reg = CommandRegistry::new();
        for input in ["/quit", "/exit", "quit", "exit"] {
            assert_eq!(reg.dispatch(input, &mut ctx).await, CommandResult::Quit, "{input}");
        }
        // only the bare word, not a prompt that starts with it
        assert_eq!(
            reg.dispatch("exit sign emoji", &mut ctx).await,
            CommandResult::NotACommand
        );
    }

    #[tokio::test]
    async fn plain_text_is_a_prompt() {
        let app = test_app();
        let mut ctx = ReplContext::new(&app);
        let reg = CommandRegistry::new();
        assert_eq!(
            reg.dispatch("a cat wearing sunglasses", &mut ctx).await,
            CommandResult::NotACommand
        );
    }

    #[tokio::test]
    async fn arguments_reach_the_command() {
        let app = test_app();
        let mut ctx = ReplContext::new(&app);
        let reg = CommandRegistry::new();
        reg.dispatch("/visibility   private", &mut ctx).await;
        assert_eq!(ctx.visibility, Visibility::Private);
    }

    #[tokio::test]
    async fn plugin_command_works() {
        struct PingCommand;

        #[async_trait]
        impl Command for PingCommand {
            fn name(&self) -> &str {
                "/ping"
            }
            fn description(&self) -> &str {
                "pong"
            }
            async fn execute(&self, args: &str, _ctx: &mut ReplContext<'_>) -> CommandResult {
                CommandResult::Generate(args.to_string())
            }
        }

        let app = test_app();
        let mut ctx = ReplContext::new(&app);
        let mut reg = CommandRegistry::new();
        reg.register(Arc::new(PingCommand));
        assert_eq!(
            reg.dispatch("/ping pong", &mut ctx).await,
            CommandResult::Generate("pong".to_string())
        );
    }

    #[test]
    fn labels() {
        assert_eq!(format_label("/whoami", "", &[]), "/whoami");
        assert_eq!(format_label("/help", "", &["/h", "/?"]), "/help (/h, /?)");
        assert_eq!(format_label("/save", "<id> [dir]", &[]), "/save <id> [dir]");
    }
}
