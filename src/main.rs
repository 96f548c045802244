use amplifier::app::App;
use amplifier::catalog::Catalog;
use amplifier::config::Config;
use amplifier::model::{Origin, ShareTarget};
use amplifier::share::{BrowserLauncher, Launcher, PrintLauncher};
use amplifier::state::AppState;
use amplifier::store::FileStore;
use amplifier::ui;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "amplifier")]
#[command(about = "Compose and share categorized posts with saved hashtags and mentions", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive terminal UI (default)
    Tui,
    /// List categories with posting progress
    Categories,
    /// List the messages of a category
    List {
        /// Category name, defaults to the first one
        category: Option<String>,
    },
    /// Print the final text of a message, selected tags included
    Compose { category: String, id: String },
    /// Open the tweet intent for a message and mark it tweeted
    Tweet {
        category: String,
        id: String,
        /// Print the URL instead of opening a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Open the Truth Social share for a message and mark it shared
    Truth {
        category: String,
        id: String,
        /// Print the URL instead of opening a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Show available hashtags and mentions and what is selected
    Tags,
    /// Toggle a hashtag or mention in the selection
    Select { token: String },
    /// Manage custom hashtags
    Hashtag {
        #[command(subcommand)]
        action: HashtagAction,
    },
    /// Manage custom mentions
    Mention {
        #[command(subcommand)]
        action: MentionAction,
    },
    /// Manage custom messages
    Message {
        #[command(subcommand)]
        action: MessageAction,
    },
    /// Hide a built-in message
    Hide { category: String, id: String },
    /// Show a hidden built-in message again
    Unhide { category: String, id: String },
    /// Forget which messages were already shared
    ClearHistory,
    /// Forget the selection and all custom hashtags and mentions
    ClearPreferences,
}

#[derive(Subcommand)]
enum HashtagAction {
    Add { tag: String },
    Remove { tag: String },
}

#[derive(Subcommand)]
enum MentionAction {
    Add {
        handle: String,
        /// Group to add the mention to; created if missing
        #[arg(short, long)]
        group: String,
    },
    Remove { handle: String },
}

#[derive(Subcommand)]
enum MessageAction {
    Add { category: String, text: String },
    Remove { category: String, id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config.log_file())?;

    let catalog = Catalog::load(config.catalog_file.as_deref())?;
    let store = FileStore::open(config.data_file());
    let mut state = AppState::load(catalog, store, config.max_message_len());

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let mut app = App::new(state, BrowserLauncher);
            ui::run(&mut app)?;
        }
        Commands::Categories => {
            for category in state.catalog().categories() {
                let progress = state.progress(category);
                println!("{:<24} {}/{}", category, progress.done, progress.total);
            }
        }
        Commands::List { category } => {
            let category = category.unwrap_or_else(|| state.catalog().default_category().to_string());
            if !state.catalog().has_category(&category) {
                anyhow::bail!("unknown category: {category}");
            }
            for entry in state.entries(&category) {
                let id = &entry.message.id;
                println!(
                    "{} {}{}{} {}",
                    id,
                    if state.is_done(ShareTarget::Tweet, &category, id) { "T" } else { "-" },
                    if state.is_done(ShareTarget::Truth, &category, id) { "R" } else { "-" },
                    if entry.origin == Origin::Custom { "*" } else { " " },
                    entry.message.text
                );
            }
        }
        Commands::Compose { category, id } => {
            println!("{}", state.compose(&category, &id)?);
        }
        Commands::Tweet { category, id, no_open } => {
            share(&mut state, ShareTarget::Tweet, &category, &id, no_open)?;
        }
        Commands::Truth { category, id, no_open } => {
            share(&mut state, ShareTarget::Truth, &category, &id, no_open)?;
        }
        Commands::Tags => {
            let mark = |token: &str| if state.selection().contains(token) { "[x]" } else { "[ ]" };
            println!("Hashtags");
            for item in state.hashtag_items() {
                println!("  {} {}", mark(&item.token), item.token);
            }
            for view in state.mention_views() {
                println!("{}", view.label);
                for item in view.items {
                    println!("  {} {}", mark(&item.token), item.token);
                }
            }
        }
        Commands::Select { token } => {
            let selected = state.select(&token)?;
            println!("{} {}", token, if selected { "selected" } else { "deselected" });
        }
        Commands::Hashtag { action } => match action {
            HashtagAction::Add { tag } => println!("added {}", state.add_custom_hashtag(&tag)?),
            HashtagAction::Remove { tag } => {
                if !state.remove_custom_hashtag(&tag) {
                    println!("{tag} is not a custom hashtag");
                }
            }
        },
        Commands::Mention { action } => match action {
            MentionAction::Add { handle, group } => {
                println!("added {}", state.add_custom_mention(&handle, &group)?)
            }
            MentionAction::Remove { handle } => {
                if !state.remove_custom_mention(&handle) {
                    println!("{handle} is not a custom mention");
                }
            }
        },
        Commands::Message { action } => match action {
            MessageAction::Add { category, text } => {
                println!("added {}", state.add_custom_message(&category, &text)?)
            }
            MessageAction::Remove { category, id } => state.remove_custom_message(&category, &id)?,
        },
        Commands::Hide { category, id } => state.hide(&category, &id)?,
        Commands::Unhide { category, id } => {
            if !state.unhide(&category, &id) {
                println!("{category}-{id} was not hidden");
            }
        }
        Commands::ClearHistory => state.clear_history(),
        Commands::ClearPreferences => state.clear_preferences(),
    }

    Ok(())
}

fn share(
    state: &mut AppState<FileStore>,
    target: ShareTarget,
    category: &str,
    id: &str,
    no_open: bool,
) -> Result<()> {
    let url = state.dispatch(target, category, id)?;
    if no_open {
        PrintLauncher.launch(&url)
    } else {
        BrowserLauncher.launch(&url)
    }
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("amplifier=info"));
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init();
    Ok(())
}
