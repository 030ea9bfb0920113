//! Launch-time reconciliation.
//!
//! Runs once per process lifetime, before the tray UI exists: decides
//! whether to auto-apply the preferred device and whether the process
//! should terminate afterwards. Absence of the preferred device (for
//! example unplugged hardware) is an expected condition here, never a
//! fatal one; controller failures are logged and the agent proceeds
//! to normal interactive operation.

use tracing::{info, warn};

use crate::autostart;
use crate::controller::DeviceController;
use crate::prefs::{PreferenceStore, Preferences};
use crate::selector::{DeviceSelector, Selection};

/// Ephemeral launch information, derived from process arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchContext {
    /// True when the agent was started by an automated trigger (login
    /// registration) rather than direct user action.
    pub autorun_requested: bool,
}

impl LaunchContext {
    /// Detect the `autorun` token among launch arguments. Matching is
    /// case-insensitive and tolerates flag-style leading dashes, so
    /// `autorun`, `AUTORUN` and `--autorun` all count.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let autorun_requested = args
            .into_iter()
            .any(|arg| arg.as_ref().trim_start_matches('-').eq_ignore_ascii_case("autorun"));
        Self { autorun_requested }
    }
}

/// What the process should do once reconciliation finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupDecision {
    /// Proceed to normal interactive operation.
    Continue,
    /// The autorun switch completed and the user asked the agent to
    /// quit afterwards; terminate with a success status.
    QuitAfterAutorun,
}

/// Apply the launch-time auto-select policy.
///
/// The quit path requires all three of: the selection succeeded, the
/// launch was an autorun, and `quit_on_complete` is set. Quitting a
/// user-initiated launch would silently discard the tray the user
/// asked for.
pub fn reconcile(
    controller: &dyn DeviceController,
    store: &mut PreferenceStore,
    ctx: LaunchContext,
) -> StartupDecision {
    let prefs = store.preferences();

    if !prefs.change_on_run {
        return StartupDecision::Continue;
    }

    let preferred = match prefs.preferred_device.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return StartupDecision::Continue,
    };

    let quit_on_complete = prefs.quit_on_complete;

    let mut selector = DeviceSelector::new(controller, store);
    match selector.select_by_name(&preferred) {
        Ok(Selection::Applied(device)) => {
            info!(device = %device.name, "Auto-selected preferred device");
            if ctx.autorun_requested && quit_on_complete {
                info!("Autorun complete, quitting as configured");
                StartupDecision::QuitAfterAutorun
            } else {
                StartupDecision::Continue
            }
        }
        Ok(Selection::NotFound) => {
            info!(device = %preferred, "Preferred device not present, leaving output unchanged");
            StartupDecision::Continue
        }
        Err(e) => {
            warn!(error = %e, "Auto-select failed, continuing with current output");
            StartupDecision::Continue
        }
    }
}

/// Remove a stale login registration left behind from a previous run.
///
/// Mirrors the toggle handler: registration exists iff the flag is
/// set, even when the flag was changed by editing the file directly.
pub fn sync_login_registration(prefs: &Preferences) {
    if !prefs.run_on_startup {
        if let Err(e) = autostart::deregister() {
            warn!(error = %e, "Failed to clear login registration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MockDeviceController;
    use crate::types::Device;
    use tempfile::tempdir;

    fn listing() -> Vec<Device> {
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

    fn store_with(
        dir: &tempfile::TempDir,
        preferred: Option<&str>,
        change_on_run: bool,
        quit_on_complete: bool,
    ) -> PreferenceStore {
        let mut store = PreferenceStore::load_from(dir.path().join("preferences.json")).unwrap();
        if let Some(name) = preferred {
            store.set_preferred_device(name).unwrap();
        }
        if change_on_run {
            store.toggle_change_on_run().unwrap();
        }
        if quit_on_complete {
            store.toggle_quit_on_complete().unwrap();
        }
        store
    }

    #[test]
    fn test_autorun_token_is_case_insensitive() {
        assert!(LaunchContext::from_args(["autorun"]).autorun_requested);
        assert!(LaunchContext::from_args(["AutoRun"]).autorun_requested);
        assert!(LaunchContext::from_args(["--autorun"]).autorun_requested);
        assert!(LaunchContext::from_args(["tray", "AUTORUN"]).autorun_requested);
        assert!(!LaunchContext::from_args(["tray"]).autorun_requested);
        assert!(!LaunchContext::from_args(Vec::<String>::new()).autorun_requested);
    }

    #[test]
    fn test_no_auto_select_when_change_on_run_is_off() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&dir, Some("Headset"), false, true);

        let mut controller = MockDeviceController::new();
        // The controller must not be touched at all.
        controller.expect_list_devices().times(0);
        controller.expect_select_device().times(0);

        let decision = reconcile(
            &controller,
            &mut store,
            LaunchContext {
                autorun_requested: true,
            },
        );
        assert_eq!(decision, StartupDecision::Continue);
    }

    #[test]
    fn test_no_auto_select_without_preferred_device() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&dir, None, true, true);

        let mut controller = MockDeviceController::new();
        controller.expect_list_devices().times(0);

        let decision = reconcile(
            &controller,
            &mut store,
            LaunchContext {
                autorun_requested: true,
            },
        );
        assert_eq!(decision, StartupDecision::Continue);
    }

    #[test]
    fn test_quit_requires_selection_autorun_and_flag() {
        // Spec example: preferred Headset, change_on_run, quit_on_complete,
        // autorun launch, listing contains Headset at id 2 -> select and quit.
        let dir = tempdir().unwrap();
        let mut store = store_with(&dir, Some("Headset"), true, true);

        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(listing()));
        controller
            .expect_select_device()
            .withf(|&id| id == 2)
            .times(1)
            .returning(|_| Ok(()));

        let decision = reconcile(
            &controller,
            &mut store,
            LaunchContext {
                autorun_requested: true,
            },
        );
        assert_eq!(decision, StartupDecision::QuitAfterAutorun);
        assert_eq!(store.preferences().preferred_device.as_deref(), Some("Headset"));
    }

    #[test]
    fn test_no_quit_on_user_initiated_launch() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&dir, Some("Headset"), true, true);

        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(listing()));
        controller
            .expect_select_device()
            .times(1)
            .returning(|_| Ok(()));

        let decision = reconcile(
            &controller,
            &mut store,
            LaunchContext {
                autorun_requested: false,
            },
        );
        assert_eq!(decision, StartupDecision::Continue);
    }

    #[test]
    fn test_no_quit_without_quit_on_complete() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&dir, Some("Headset"), true, false);

        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(listing()));
        controller
            .expect_select_device()
            .times(1)
            .returning(|_| Ok(()));

        let decision = reconcile(
            &controller,
            &mut store,
            LaunchContext {
                autorun_requested: true,
            },
        );
        assert_eq!(decision, StartupDecision::Continue);
    }

    #[test]
    fn test_missing_preferred_device_is_not_fatal() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&dir, Some("Unplugged Dock"), true, true);

        let mut controller = MockDeviceController::new();
        controller
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(listing()));
        controller.expect_select_device().times(0);

        let decision = reconcile(
            &controller,
            &mut store,
            LaunchContext {
                autorun_requested: true,
            },
        );
        assert_eq!(decision, StartupDecision::Continue);
        // Preference must not be cleared by a no-op reconciliation.
        assert_eq!(
            store.preferences().preferred_device.as_deref(),
            Some("Unplugged Dock")
        );
    }

    #[test]
    fn test_controller_failure_continues_interactive() {
        let dir = tempdir().unwrap();
        let mut store = store_with(&dir, Some("Headset"), true, true);

        let mut controller = MockDeviceController::new();
        controller.expect_list_devices().times(1).returning(|| {
            Err(crate::error::ControllerError::Unavailable {
                program: "EndPointController.exe".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        });

        let decision = reconcile(
            &controller,
            &mut store,
            LaunchContext {
                autorun_requested: true,
            },
        );
        assert_eq!(decision, StartupDecision::Continue);
    }
}
