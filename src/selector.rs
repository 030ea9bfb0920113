//! Device selection.
//!
//! Resolves a selection target against a device snapshot, applies it
//! through the controller, and couples a successful switch with the
//! persisted preference. A target that is absent from the snapshot is
//! an expected condition (`Selection::NotFound`), never an error.

use tracing::{debug, info};

use crate::controller::DeviceController;
use crate::error::AgentResult;
use crate::prefs::PreferenceStore;
use crate::types::Device;

/// Outcome of a selection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The device was switched to and persisted as preferred.
    Applied(Device),
    /// The target is absent from the current snapshot; nothing was
    /// done. The caller should re-enumerate before retrying.
    NotFound,
}

/// Applies device selections against a controller and records them in
/// the preference store.
pub struct DeviceSelector<'a> {
    controller: &'a dyn DeviceController,
    store: &'a mut PreferenceStore,
}

impl<'a> DeviceSelector<'a> {
    pub fn new(controller: &'a dyn DeviceController, store: &'a mut PreferenceStore) -> Self {
        Self { controller, store }
    }

    /// Select the first device whose name matches exactly
    /// (case-sensitive), against a fresh enumeration.
    pub fn select_by_name(&mut self, name: &str) -> AgentResult<Selection> {
        let devices = self.controller.list_devices()?;

        match devices.into_iter().find(|d| d.name == name) {
            Some(device) => self.select_by_device(&device).map(Selection::Applied),
            None => {
                debug!(name, "Device not present in current listing");
                Ok(Selection::NotFound)
            }
        }
    }

    /// Resolve an ordinal id against the snapshot it came from and
    /// apply it. A stale or unknown id is `NotFound`; ids are never
    /// silently coerced to some other device.
    pub fn select_by_id(&mut self, id: u32, snapshot: &[Device]) -> AgentResult<Selection> {
        match snapshot.iter().find(|d| d.id == id) {
            Some(device) => {
                let device = device.clone();
                self.select_by_device(&device).map(Selection::Applied)
            }
            None => {
                debug!(id, "Id not in the enumeration snapshot, re-enumerate first");
                Ok(Selection::NotFound)
            }
        }
    }

    /// Switch to a known device and persist its name as preferred.
    ///
    /// The two effects are coupled: if the controller call fails, the
    /// stored preference is left unchanged.
    pub fn select_by_device(&mut self, device: &Device) -> AgentResult<Device> {
        self.controller.select_device(device.id)?;
        self.store.set_preferred_device(&device.name)?;
        info!(device = %device.name, id = device.id, "Output device selected");
        Ok(device.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MockDeviceController;
    use tempfile::tempdir;

    fn snapshot() -> Vec<Device> {
        vec![
            Device {
                id: 1,
                name: "Speakers".to_string(),
                active: true,
            },
            Device {
                id: 2,
                name: "Headset".to_string(),
                active: false,
            },
        ]
    }

    fn store_in(dir: &tempfile::TempDir) -> PreferenceStore {
        PreferenceStore::load_from(dir.path().join("preferences.json")).unwrap()
    }

    #[test]
    fn test_select_by_name_applies_and_persists() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(snapshot()));
        controller
            .expect_select_device()
            .withf(|&id| id == 2)
            .times(1)
            .returning(|_| Ok(()));

        let mut selector = DeviceSelector::new(&controller, &mut store);
        let outcome = selector.select_by_name("Headset").unwrap();

        match outcome {
            Selection::Applied(d) => assert_eq!(d.name, "Headset"),
            Selection::NotFound => panic!("expected Applied"),
        }
        assert_eq!(store.preferences().preferred_device.as_deref(), Some("Headset"));
    }

    #[test]
    fn test_select_by_name_absent_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(snapshot()));
        // No select subprocess call may happen for an absent name.
        controller.expect_select_device().times(0);

        let mut selector = DeviceSelector::new(&controller, &mut store);
        let outcome = selector.select_by_name("Unplugged Monitor").unwrap();

        assert_eq!(outcome, Selection::NotFound);
        assert_eq!(store.preferences().preferred_device, None);
    }

    #[test]
    fn test_name_match_is_case_sensitive() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(snapshot()));
        controller.expect_select_device().times(0);

        let mut selector = DeviceSelector::new(&controller, &mut store);
        assert_eq!(selector.select_by_name("headset").unwrap(), Selection::NotFound);
    }

    #[test]
    fn test_controller_failure_leaves_preference_unchanged() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set_preferred_device("Speakers").unwrap();

        let mut controller = MockDeviceController::new();
        controller.expect_select_device().times(1).returning(|_| {
            Err(crate::error::ControllerError::Unavailable {
                program: "EndPointController.exe".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        });

        let mut selector = DeviceSelector::new(&controller, &mut store);
        let device = Device {
            id: 2,
            name: "Headset".to_string(),
            active: false,
        };
        assert!(selector.select_by_device(&device).is_err());
        assert_eq!(store.preferences().preferred_device.as_deref(), Some("Speakers"));
    }

    #[test]
    fn test_select_by_id_rejects_stale_ids() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        let mut controller = MockDeviceController::new();
        controller.expect_select_device().times(0);

        let mut selector = DeviceSelector::new(&controller, &mut store);
        let outcome = selector.select_by_id(7, &snapshot()).unwrap();
        assert_eq!(outcome, Selection::NotFound);
    }

    #[test]
    fn test_select_by_id_resolves_within_snapshot() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        let mut controller = MockDeviceController::new();
        controller
            .expect_select_device()
            .withf(|&id| id == 1)
            .times(1)
            .returning(|_| Ok(()));

        let mut selector = DeviceSelector::new(&controller, &mut store);
        let outcome = selector.select_by_id(1, &snapshot()).unwrap();
        assert!(matches!(outcome, Selection::Applied(d) if d.name == "Speakers"));
        assert_eq!(store.preferences().preferred_device.as_deref(), Some("Speakers"));
    }
}
