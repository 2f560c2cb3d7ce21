//! WaterWatch - community water quality dashboard
//!
//! A CLI tool for collecting citizen reports about local water sources,
//! browsing them, following weekly trends per zip code and summarizing
//! them with an AI model.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (bad arguments, unreadable config, failed operation)

mod cli;
mod config;
mod dashboard;
mod error;
mod files;
mod ingest;
mod models;
mod render;
mod store;
mod summarize;
mod views;

use anyhow::{Context, Result};
use cli::{validate_command, Args, Command, SessionLine};
use config::{Config, CONFIG_FILE};
use dashboard::Dashboard;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if args.command == Command::InitConfig {
        return handle_init_config();
    }

    // Load configuration before logging so `[general] verbose` applies
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("WaterWatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    if let Err(e) = run(args, config).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .waterwatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize storage, summarizer model, and views.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so rendered views and CSV exports on stdout stay clean.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Open the dashboard and run the requested command or session.
async fn run(args: Args, config: Config) -> Result<()> {
    let mut dashboard =
        Dashboard::open(config, !args.quiet).context("Failed to open report store")?;
    info!("Loaded {} reports", dashboard.store().len());

    match args.command {
        Command::Session => run_session(&mut dashboard).await,
        command => {
            let output = dashboard.run(command).await?;
            print!("{}", output);
            Ok(())
        }
    }
}

/// Read commands from stdin until EOF or `exit`.
///
/// A failing command prints its error and the session carries on with the
/// store as it was.
async fn run_session(dashboard: &mut Dashboard) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    eprintln!("💧 WaterWatch session. Type a command (e.g. `trends`), `help`, or `exit`.");

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let trimmed = line.trim();

        if trimmed == "exit" || trimmed == "quit" {
            break;
        }

        let command = match SessionLine::parse_line(trimmed) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        if let Err(message) = validate_command(&command) {
            eprintln!("❌ Error: {}", message);
            continue;
        }

        match dashboard.run(command).await {
            Ok(output) => {
                write!(stdout, "{}", output).context("Failed to write output")?;
                stdout.flush().context("Failed to write output")?;
            }
            Err(e) => {
                warn!("Command failed: {}", e);
                eprintln!("❌ Error: {}", e);
            }
        }
    }

    info!("Session ended with {} reports", dashboard.store().len());
    Ok(())
}

/// Where the configuration came from, reported once logging is installed.
enum ConfigOrigin {
    File(PathBuf),
    Defaults,
    Fallback(String),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Fallback(reason) => warn!("Failed to load config: {}", reason),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::File(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::File(PathBuf::from(CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Fallback(format!("{:#}", e)))),
    }
}
