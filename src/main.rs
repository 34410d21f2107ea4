//! Session Manager - terminal UI for saved database connection sessions
//!
//! Run with `session-manager` or `session-manager --help` for usage.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use session_manager::{
    config::Config,
    error::StoreError,
    session::{ManagerOutcome, SessionId},
    store::{MemorySessionStore, SessionStore, SqliteSessionStore},
    tui::App,
    APP_NAME, VERSION,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Manage saved database connection sessions")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the session database (overrides the configuration)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Keep sessions in memory only; nothing is written to disk
    #[arg(long, conflicts_with = "database")]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive TUI (default)
    Tui,

    /// List saved sessions
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one saved session
    Show {
        /// Session ID
        id: i64,
    },

    /// Delete a saved session
    Delete {
        /// Session ID
        id: i64,
    },

    /// Show configuration
    Config {
        /// Initialize config file with defaults
        #[arg(long)]
        init: bool,
    },
}

fn setup_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        // Use info level for our crate, warn for dependencies
        EnvFilter::new("info").add_directive("tokio=warn".parse()?)
    };

    if let Some(path) = log_file {
        // Log to file when running TUI (so logs don't interfere with display)
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_target(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    }

    Ok(())
}

/// Open the store selected by the command line and configuration
fn open_store(cli: &Cli, config: &Config) -> Result<Box<dyn SessionStore>> {
    if cli.ephemeral {
        info!("Using in-memory session store");
        return Ok(Box::new(MemorySessionStore::new()));
    }

    let path = match cli.database {
        Some(ref path) => path.clone(),
        None => config.database_path()?,
    };
    let store = SqliteSessionStore::open(&path)?;
    info!("Using session database {}", store.path().display());
    Ok(Box::new(store))
}

/// Run the TUI and report which session the user chose
async fn run_tui(config: Config, store: Box<dyn SessionStore>) -> Result<ManagerOutcome> {
    let app = App::new(config, store);
    Ok(app.run().await?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Install color-eyre error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load configuration
    let loaded = match cli.config {
        Some(ref path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config, using defaults: {}", e);
        Config::default()
    });
    let debug = cli.debug || config.debug;

    // Ensure required directories exist
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Failed to create directories: {}", e);
    }

    match cli.command {
        None | Some(Commands::Tui) => {
            // Setup logging to file for TUI mode
            let log_file = config.log_file_path()?;
            setup_logging(debug, Some(&log_file))?;

            info!("Starting session manager TUI v{}", VERSION);

            let store = open_store(&cli, &config)?;
            match run_tui(config, store).await? {
                ManagerOutcome::Open(record) => {
                    info!("Opening session {}", record.name);
                    println!(
                        "Opening session \"{}\": {}@{}:{} ({})",
                        record.name,
                        record.username,
                        record.hostname,
                        record.port,
                        record.network_type
                    );
                }
                ManagerOutcome::Cancelled => {
                    info!("No session opened");
                }
            }
        }

        Some(Commands::List { json }) => {
            setup_logging(debug, None)?;

            let mut store = open_store(&cli, &config)?;
            let summaries = match store.list_summaries() {
                Ok(summaries) => summaries,
                Err(StoreError::SchemaMissing) => Vec::new(),
                Err(e) => return Err(e.into()),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("No saved sessions. Use '{}' to create one.", APP_NAME);
            } else {
                println!("Sessions:");
                println!();
                for summary in &summaries {
                    println!("  {:>4}  {}", summary.id.get(), summary.name);
                }
            }

            store.close()?;
        }

        Some(Commands::Show { id }) => {
            setup_logging(debug, None)?;

            let mut store = open_store(&cli, &config)?;
            let record = store.fetch(SessionId::new(id))?;
            store.close()?;

            let Some(record) = record else {
                bail!("Session not found: {}", id);
            };

            println!("Session {}: {}", id, record.name);
            println!("  Network type:  {}", record.network_type);
            println!("  Hostname / IP: {}", record.hostname);
            println!("  User:          {}", record.username);
            println!("  Password:      {}", "*".repeat(record.password.chars().count()));
            println!("  Port:          {}", record.port);
        }

        Some(Commands::Delete { id }) => {
            setup_logging(debug, None)?;

            let mut store = open_store(&cli, &config)?;
            let deleted = store.delete(SessionId::new(id))?;
            store.close()?;

            if deleted {
                println!("Deleted session {}", id);
            } else {
                bail!("Session not found: {}", id);
            }
        }

        Some(Commands::Config { init }) => {
            setup_logging(debug, None)?;

            let config_path = match cli.config {
                Some(ref path) => path.clone(),
                None => Config::config_file_path()?,
            };

            if init {
                config.save_to(&config_path)?;
                println!("Configuration initialized at {:?}", config_path);
            } else {
                println!("Configuration:");
                println!("{}", toml::to_string_pretty(&config)?);
                println!("\nConfig file: {:?}", config_path);
                println!("Data dir: {:?}", Config::data_dir()?);
                println!("Database: {:?}", config.database_path()?);
            }
        }
    }

    Ok(())
}
