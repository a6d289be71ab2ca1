use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use emojify::app::App;
use emojify::banner::{BannerInfo, print_banner, print_session_summary};
use emojify::commands::{self, CommandRegistry, CommandResult, ReplContext};
use emojify::config::{Config, KEYS, Overrides};
use emojify::consts::default_db_path;
use emojify::emoji::Visibility;
use emojify::logging::init_tracing;
use emojify::profile::ProfileChanges;

#[derive(Parser)]
#[command(name = "emojify", version, about = "Describe an emoji. Get an emoji.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// SQLite database path (use :memory: for ephemeral)
    #[arg(short, long)]
    db: Option<String>,

    /// Inference endpoint for image generation
    #[arg(long)]
    model_url: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign in with Google in the browser
    Google,
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Generate an emoji from a description
    Generate {
        /// What the emoji should look like
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
        /// Keep it out of the community gallery
        #[arg(long, default_value_t = false)]
        private: bool,
        /// Also save the image into this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List your emojis, or the community's
    Gallery {
        #[arg(long, default_value_t = false)]
        community: bool,
    },
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Save an emoji as a PNG file
    Save {
        id: String,
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Read or write stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    /// Set name, city, country or bio
    Set {
        field: String,
        #[arg(required = true, trailing_var_arg = true)]
        value: Vec<String>,
    },
    /// Upload a profile picture
    Avatar { path: PathBuf },
}

#[derive(Subcommand)]
enum ConfigAction {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    /// List known keys and their environment variables
    Keys,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let db = match cli.db {
        Some(db) => db,
        None => {
            let path = default_db_path()?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            path.to_string_lossy().into_owned()
        }
    };

    let overrides = Overrides {
        model_url: cli.model_url,
    };
    let app = App::open(&db, &overrides)?;

    match cli.command {
        Some(command) => run_command(&app, command).await,
        None => repl(&app).await,
    }
}

async fn run_command(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Signup { email, name } => {
            commands::sign_up(app, email, None, name).await?;
        }
        Command::Login { email } => {
            commands::log_in(app, email, None).await?;
        }
        Command::Google => {
            commands::google_sign_in(app).await?;
        }
        Command::Logout => commands::log_out(app).await?,
        Command::Whoami => commands::print_whoami(app).await?,
        Command::Generate {
            prompt,
            private,
            out,
        } => {
            let visibility = if private {
                Visibility::Private
            } else {
                Visibility::Public
            };
            let prompt = prompt.join(" ");
            tokio::select! {
                result = commands::generate(app, &prompt, visibility, out.as_deref()) => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("\n\ninterrupted");
                }
            }
        }
        Command::Gallery { community } => commands::show_gallery(app, community).await?,
        Command::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => {
                commands::show_profile(app).await?;
            }
            ProfileAction::Set { field, value } => {
                let mut changes = ProfileChanges::default();
                changes.set(&field, &value.join(" "))?;
                commands::update_profile(app, &changes).await?;
            }
            ProfileAction::Avatar { path } => commands::set_avatar(app, &path).await?,
        },
        Command::Save { id, dir } => {
            commands::save_emoji(app, &id, &dir).await?;
        }
        Command::Config { action } => handle_config(&app.db_path, &action)?,
    }
    Ok(())
}

fn handle_config(db: &str, action: &ConfigAction) -> anyhow::Result<()> {
    let config = Config::open(db)?;
    match action {
        ConfigAction::Get { key } => match config.get(key)? {
            Some(value) => println!("{value}"),
            None => println!("(not set)"),
        },
        ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            println!("✓ {key} saved");
        }
        ConfigAction::Unset { key } => {
            config.remove(key)?;
            println!("✓ {key} removed");
        }
        ConfigAction::Keys => {
            for (key, env) in KEYS {
                println!("  {key:<22} {env}");
            }
        }
    }
    Ok(())
}

async fn repl(app: &App) -> anyhow::Result<()> {
    let user = app.auth.current_user().await.unwrap_or_else(|e| {
        eprintln!("warning: {e}");
        None
    });
    print_banner(&BannerInfo {
        user: user.as_ref().map(|u| u.label()),
        model: app.emojis.model(),
        google: app.google.is_some(),
        database: app.db_label(),
    });

    let registry = CommandRegistry::new();
    let mut ctx = ReplContext::new(app);

    // async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nemojify> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let prompt = match registry.dispatch(input, &mut ctx).await {
            CommandResult::Handled => continue,
            CommandResult::Quit => break,
            CommandResult::Generate(prompt) => prompt,
            CommandResult::NotACommand => input.to_string(),
        };

        // Ctrl+C during generation cancels it, not the REPL
        tokio::select! {
            _ = ctx.run_prompt(&prompt) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\n\ninterrupted");
            }
        }
    }

    print_session_summary(ctx.generated);
    Ok(())
}
