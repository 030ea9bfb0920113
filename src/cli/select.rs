//! Select command - one-shot device switch by name.

use anyhow::Result;

use crate::config::Config;
use crate::controller::{DeviceController, EndpointController};
use crate::prefs::PreferenceStore;
use crate::selector::{DeviceSelector, Selection};

/// Run the select command.
pub async fn run(name: &str) -> Result<()> {
    let config = Config::load()?;
    let controller = EndpointController::from_config(&config.controller);
    let mut store = PreferenceStore::load()?;

    let mut selector = DeviceSelector::new(&controller, &mut store);
    match selector.select_by_name(name)? {
        Selection::Applied(device) => {
            println!("Switched to: {}", device.name);
            println!("Saved as preferred device.");
        }
        Selection::NotFound => {
            println!("Device not found: {}", name);
            println!();
            println!("Available devices (names are case-sensitive):");
            for device in controller.list_devices()? {
                println!("  {}", device.name);
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
