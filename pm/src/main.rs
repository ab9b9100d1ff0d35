//! PrintMaster - daily briefing for receipt printers
//!
//! CLI entry point: loads configuration, opens the output device and prints
//! today's briefing.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use eyre::{Context, Result, eyre};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use printmaster::briefing::BriefingComposer;
use printmaster::cli::{Cli, Command};
use printmaster::config::Config;
use printmaster::device;
use printmaster::sources::HttpTransport;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    // stdout is reserved for the dry-run briefing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!("Failed to install tracing subscriber: {e}"))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command.unwrap_or_default() {
        Command::Print { dry_run, device, seed } => cmd_print(cli.config.as_ref(), dry_run, device, seed).await,
        Command::Init { force } => cmd_init(cli.config.as_ref(), force),
    }
}

async fn cmd_print(
    config_path: Option<&PathBuf>,
    dry_run: bool,
    device_path: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    debug!(dry_run, ?device_path, ?seed, "cmd_print: called");
    let mut config = Config::load(config_path).context("Failed to load configuration")?;

    // An explicit device means real printing unless --dry-run is also given
    if let Some(path) = device_path {
        config.printer.device_path = path;
        config.general.dry_run = false;
    }
    if dry_run {
        config.general.dry_run = true;
    }
    config.validate().context("Invalid configuration")?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // Open the device first so a missing printer fails before any network work
    let mut output = device::open(&config).context("Failed to open output device")?;
    let transport = Arc::new(HttpTransport::from_config(&config.http).context("Failed to create HTTP client")?);

    let dry_run = config.general.dry_run;
    let composer = BriefingComposer::new(config, transport);
    let today = Local::now().date_naive();
    composer
        .run(output.as_mut(), today, &mut rng)
        .await
        .context("Failed to print briefing")?;

    if !dry_run {
        info!("Printing finished");
    }
    Ok(())
}

fn cmd_init(config_path: Option<&PathBuf>, force: bool) -> Result<()> {
    debug!(?config_path, force, "cmd_init: called");
    let path = config_path
        .cloned()
        .or_else(Config::user_config_path)
        .ok_or_else(|| eyre!("Could not determine the user config directory, pass --config"))?;

    if path.exists() && !force {
        return Err(eyre!("{} already exists, use --force to overwrite", path.display()));
    }

    Config::default().save(&path)?;
    info!("Wrote default configuration to {}", path.display());
    println!("Wrote {}", path.display());
    Ok(())
}
