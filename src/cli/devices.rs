//! Devices command - print the current device listing.

use anyhow::Result;

use crate::config::Config;
use crate::controller::{DeviceController, EndpointController};

/// Run the devices command.
pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let controller = EndpointController::from_config(&config.controller);

    let devices = controller.list_devices()?;

    if devices.is_empty() {
        println!("No audio output devices reported.");
        return Ok(());
    }

    println!();
    println!("Audio output devices");
    println!("--------------------");
    for device in &devices {
        let marker = if device.active { "*" } else { " " };
        println!("{} [{}] {}", marker, device.id, device.name);
    }
    println!();
    println!("* = currently active output");

    Ok(())
}
