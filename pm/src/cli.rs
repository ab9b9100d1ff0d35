//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PrintMaster - daily briefing for receipt printers
#[derive(Debug, Parser)]
#[command(name = "pm", version, about = "Print a daily briefing: weather, agenda, news, horoscope")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `print`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print today's briefing
    Print {
        /// Print to the console instead of the printer
        #[arg(long)]
        dry_run: bool,

        /// Printer device path (overrides printer.device-path)
        #[arg(short, long, value_name = "PATH")]
        device: Option<PathBuf>,

        /// Seed for reproducible random choices
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Print {
            dry_run: false,
            device: None,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["pm"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.command.unwrap_or_default(), Command::Print { dry_run: false, .. }));
    }

    #[test]
    fn test_print_flags() {
        let cli = Cli::try_parse_from(["pm", "print", "--dry-run", "--device", "/dev/usb/lp1", "--seed", "7"]).unwrap();
        match cli.command {
            Some(Command::Print { dry_run, device, seed }) => {
                assert!(dry_run);
                assert_eq!(device, Some(PathBuf::from("/dev/usb/lp1")));
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pm", "init", "--force", "--config", "pm.yml", "-l", "debug"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("pm.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Some(Command::Init { force: true })));
    }

    #[test]
    fn test_invalid_seed_rejected() {
        assert!(Cli::try_parse_from(["pm", "print", "--seed", "tomorrow"]).is_err());
    }
}
