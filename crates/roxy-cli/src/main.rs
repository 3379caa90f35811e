use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use roxy_cli::{AppContext, OutputFormat, PathOverrides, commands};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roxy-manager")]
#[command(author, version)]
#[command(
    about = "Switch RoxyBrowser between saved account profiles",
    long_about = "RoxyBrowser Manager keeps a snapshot of each RoxyBrowser login and swaps \
                  them in and out of the browser's data directory, restarting the browser as needed."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Manager data directory (default: ~/.roxy_manager)
    #[arg(long, global = true, env = "ROXY_MANAGER_HOME", value_name = "DIR")]
    home: Option<PathBuf>,

    /// RoxyBrowser data directory (default: platform location)
    #[arg(long, global = true, env = "ROXY_BROWSER_DATA", value_name = "DIR")]
    browser_data: Option<PathBuf>,

    /// Settings file (default: <config dir>/roxybrowser-manager/settings.json)
    #[arg(long = "settings", global = true, env = "ROXY_MANAGER_SETTINGS", value_name = "FILE")]
    settings_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved profiles
    List,

    /// Show whether RoxyBrowser is running and which profile is active
    Status,

    /// Switch RoxyBrowser to a saved profile
    Switch {
        /// E-mail of the profile to activate
        email: String,
    },

    /// Delete a saved profile
    Delete {
        /// E-mail of the profile to delete
        email: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Set or clear the note attached to a profile
    Note {
        /// E-mail of the profile
        email: String,

        /// Note text (empty to clear)
        text: String,
    },

    /// Start RoxyBrowser
    Start,

    /// Stop RoxyBrowser
    Stop,

    /// Add a new profile by logging in to RoxyBrowser
    Add {
        /// Start preparing immediately without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Export all profiles to a directory
    Export {
        /// Target directory
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Import profiles from an export directory
    Import {
        /// Export directory to merge from
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Watch RoxyBrowser's status until interrupted
    Watch,

    /// Manage manager settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,

    /// Set the RoxyBrowser executable path
    SetPath {
        /// Path to the RoxyBrowser executable
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Clear the configured executable path
    ClearPath,

    /// Search default install locations for RoxyBrowser
    Detect {
        /// Save the detected path
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Commands::Completion { shell } = cli.command {
        return commands::completion::execute(shell, Cli::command());
    }

    let ctx = AppContext::new(&PathOverrides {
        home: cli.home,
        browser_data: cli.browser_data,
        settings: cli.settings_file,
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(&ctx, cli.command, cli.format))
}

async fn run(ctx: &AppContext, command: Commands, format: OutputFormat) -> Result<()> {
    tracing::debug!("Output format: {}", format.as_str());

    match command {
        Commands::List => commands::profile::list(ctx, format).await,
        Commands::Status => commands::process::status(ctx, format).await,
        Commands::Switch { email } => commands::profile::switch(ctx, &email).await,
        Commands::Delete { email, force } => commands::profile::delete(ctx, &email, force).await,
        Commands::Note { email, text } => commands::profile::note(ctx, &email, &text).await,
        Commands::Start => commands::process::start(ctx).await,
        Commands::Stop => commands::process::stop(ctx).await,
        Commands::Add { yes } => commands::wizard::add(ctx, yes).await,
        Commands::Export { dir } => commands::transfer::export(ctx, &dir).await,
        Commands::Import { dir } => commands::transfer::import(ctx, &dir).await,
        Commands::Watch => commands::process::watch(ctx).await,
        Commands::Settings { command } => match command {
            SettingsCommands::Show => commands::settings::show(ctx, format),
            SettingsCommands::SetPath { path } => commands::settings::set_path(ctx, &path),
            SettingsCommands::ClearPath => commands::settings::clear_path(ctx),
            SettingsCommands::Detect { save } => commands::settings::detect(ctx, save),
        },
        Commands::Completion { shell } => commands::completion::execute(shell, Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("roxy_manager=debug,roxy_cli=debug,roxy_core=debug,roxy_browser=debug")
    } else {
        EnvFilter::new("roxy_manager=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
