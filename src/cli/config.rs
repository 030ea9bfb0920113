//! Config command - configuration utilities.

use anyhow::Result;

use crate::cli::ConfigAction;
use crate::config::{self, Config};

/// Run the config command.
pub async fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Validate => validate_config().await,
        ConfigAction::Show => show_config().await,
        ConfigAction::Path => show_path().await,
    }
}

async fn validate_config() -> Result<()> {
    let config_path = config::paths::config_file();

    println!();
    println!("Validating configuration...");
    println!("Path: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("Configuration file not present; built-in defaults apply.");
        println!();
        return Ok(());
    }

    match Config::load() {
        Ok(config) => {
            println!("Configuration is valid.");
            println!();
            println!("Summary:");
            println!("  Log level: {}", config.agent.log_level);
            println!(
                "  Toast notifications: {}",
                if config.agent.enable_toast_notifications {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!(
                "  Controller path: {}",
                config
                    .controller
                    .path
                    .as_deref()
                    .unwrap_or("(auto-discover)")
            );
        }
        Err(e) => {
            println!("ERROR: Configuration is invalid");
            println!();
            println!("Details: {}", e);
            println!();
            println!("Fix the configuration and run 'audioswitch config validate' again.");
        }
    }

    println!();
    Ok(())
}

async fn show_config() -> Result<()> {
    let config_path = config::paths::config_file();

    if !config_path.exists() {
        println!("Configuration file not found at: {}", config_path.display());
        return Ok(());
    }

    let content = std::fs::read_to_string(&config_path)?;
    println!("{}", content);

    Ok(())
}

async fn show_path() -> Result<()> {
    let config_path = config::paths::config_file();
    println!("{}", config_path.display());
    Ok(())
}
