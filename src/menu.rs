//! Menu state projection.
//!
//! Derives the renderable tray menu content from a fresh device
//! enumeration plus the current preference flags. Called every time
//! the menu is about to be shown and never cached, since devices can
//! appear and disappear between openings.

use crate::controller::DeviceController;
use crate::error::ControllerError;
use crate::prefs::Preferences;
use crate::types::Device;

/// One checkable device entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub label: String,
    /// Mirrors the hardware-reported active flag from the fresh
    /// snapshot, NOT the persisted preference. The two can diverge
    /// (another application may have switched outputs) and that
    /// divergence is intentional.
    pub checked: bool,
    /// Snapshot-local device record; activation resolves against the
    /// snapshot this entry came from.
    pub device: Device,
}

/// Current preference flag states, rendered as checkable toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagStates {
    pub run_on_startup: bool,
    pub change_on_run: bool,
    pub quit_on_complete: bool,
}

/// Renderable menu content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuModel {
    pub entries: Vec<DeviceEntry>,
    pub flags: FlagStates,
}

impl MenuModel {
    /// The enumeration snapshot this model was built from.
    pub fn snapshot(&self) -> Vec<Device> {
        self.entries.iter().map(|e| e.device.clone()).collect()
    }
}

/// Build the menu model from a fresh enumeration.
///
/// Controller failures are surfaced to the caller; the menu layer
/// renders a stale/empty view and notifies instead of crashing.
pub fn project(
    controller: &dyn DeviceController,
    prefs: &Preferences,
) -> Result<MenuModel, ControllerError> {
    let devices = controller.list_devices()?;

    let entries = devices
        .into_iter()
        .map(|device| DeviceEntry {
            label: device.name.clone(),
            checked: device.active,
            device,
        })
        .collect();

    Ok(MenuModel {
        entries,
        flags: FlagStates {
            run_on_startup: prefs.run_on_startup,
            change_on_run: prefs.change_on_run,
            quit_on_complete: prefs.quit_on_complete,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MockDeviceController;

    fn prefs_preferring(name: &str) -> Preferences {
        Preferences {
            preferred_device: Some(name.to_string()),
            change_on_run: true,
            quit_on_complete: false,
            run_on_startup: true,
            updated_at: None,
        }
    }

    #[test]
    fn test_entries_follow_enumeration_order() {
        let mut controller = MockDeviceController::new();
        controller.expect_list_devices().times(1).returning(|| {
            Ok(vec![
                Device {
                    id: 1,
                    name: "Speakers".to_string(),
                    active: false,
                },
                Device {
                    id: 2,
                    name: "Headset".to_string(),
                    active: true,
                },
            ])
        });

        let model = project(&controller, &Preferences::default()).unwrap();
        let labels: Vec<&str> = model.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Speakers", "Headset"]);
    }

    #[test]
    fn test_checked_reflects_live_state_not_preference() {
        // Preferred device is Speakers, but some other application has
        // made Headset active; the checkmark follows the hardware.
        let mut controller = MockDeviceController::new();
        controller.expect_list_devices().times(1).returning(|| {
            Ok(vec![
                Device {
                    id: 1,
                    name: "Speakers".to_string(),
                    active: false,
                },
                Device {
                    id: 2,
                    name: "Headset".to_string(),
                    active: true,
                },
            ])
        });

        let model = project(&controller, &prefs_preferring("Speakers")).unwrap();
        assert!(!model.entries[0].checked);
        assert!(model.entries[1].checked);
    }

    #[test]
    fn test_flags_mirror_preferences() {
        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(Vec::new()));

        let model = project(&controller, &prefs_preferring("Speakers")).unwrap();
        assert!(model.flags.run_on_startup);
        assert!(model.flags.change_on_run);
        assert!(!model.flags.quit_on_complete);
    }

    #[test]
    fn test_snapshot_round_trips_devices() {
        let devices = vec![Device {
            id: 3,
            name: "USB DAC".to_string(),
            active: true,
        }];
        let expected = devices.clone();

        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(move || Ok(devices.clone()));

        let model = project(&controller, &Preferences::default()).unwrap();
        assert_eq!(model.snapshot(), expected);
    }

    #[test]
    fn test_controller_failure_is_surfaced() {
        let mut controller = MockDeviceController::new();
        controller.expect_list_devices().times(1).returning(|| {
            Err(ControllerError::MalformedOutput {
                line: "garbage".to_string(),
                reason: "expected 4 fields, got 1".to_string(),
            })
        });

        assert!(project(&controller, &Preferences::default()).is_err());
    }
}
