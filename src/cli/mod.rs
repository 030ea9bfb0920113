//! CLI command definitions and handlers.

use clap::{Parser, Subcommand, ValueEnum};

pub mod config;
pub mod devices;
pub mod doctor;
pub mod select;

/// AudioSwitch - tray agent for switching the active audio output device.
#[derive(Parser, Debug)]
#[command(name = "audioswitch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level
    #[arg(long, default_value = "info", env = "AUDIOSWITCH_LOG_LEVEL")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the tray agent (Windows only)
    Tray {
        /// Signal that this launch came from the login registration
        #[arg(long)]
        autorun: bool,
    },

    /// List the current audio output devices
    Devices,

    /// Switch to a device by name and remember it as preferred
    Select {
        /// Exact device name as shown by `devices`
        name: String,
    },

    /// Check system health and dependencies
    Doctor,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate configuration file
    Validate,

    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
