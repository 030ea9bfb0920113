//! Client for the external endpoint controller executable.
//!
//! All actual audio endpoint enumeration and switching is delegated to
//! `EndPointController.exe`, invoked as a blocking subprocess per call.
//! No state is retained between calls.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use crate::config::{paths, ControllerConfig};
use crate::error::ControllerError;
use crate::types::Device;

/// Default executable name, resolved through the working directory or
/// PATH when discovery finds nothing better.
pub const CONTROLLER_EXE: &str = "EndPointController.exe";

/// Format string handed to the controller in list mode. Produces one
/// line per device: `index|name|<unused>|activeFlag`.
const LIST_FORMAT: &str = "%d|%ws|%d|%d";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Seam over the controller subprocess, mockable in tests.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceController {
    /// Enumerate the current audio output devices, in controller order.
    ///
    /// Blocks until the subprocess exits. The returned ids are ordinal
    /// positions valid only within this snapshot.
    fn list_devices(&self) -> Result<Vec<Device>, ControllerError>;

    /// Make the device at `id` (from the most recent listing) the
    /// active output. Blocks until the subprocess exits; the child's
    /// exit status is not inspected, callers confirm by re-listing.
    fn select_device(&self, id: u32) -> Result<(), ControllerError>;
}

/// Production controller client backed by `EndPointController.exe`.
#[derive(Debug, Clone)]
pub struct EndpointController {
    program: PathBuf,
}

impl EndpointController {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build a client from configuration, discovering the executable
    /// when no path is configured.
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(discover_controller(config))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
        cmd
    }

    fn unavailable(&self, source: std::io::Error) -> ControllerError {
        ControllerError::Unavailable {
            program: self.program.display().to_string(),
            source,
        }
    }
}

impl DeviceController for EndpointController {
    fn list_devices(&self) -> Result<Vec<Device>, ControllerError> {
        debug!(program = ?self.program, "Enumerating audio devices");

        let output = self
            .command()
            .arg("-f")
            .arg(LIST_FORMAT)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.unavailable(e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let devices = parse_device_list(&stdout)?;
        debug!(count = devices.len(), "Device enumeration complete");
        Ok(devices)
    }

    fn select_device(&self, id: u32) -> Result<(), ControllerError> {
        debug!(id, program = ?self.program, "Selecting audio device");

        let status = self
            .command()
            .arg(id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|e| self.unavailable(e))?;

        if !status.success() {
            // Selection is fire-and-confirm-by-relisting; a nonzero
            // exit is worth a log line but not a failed call.
            warn!(id, ?status, "Controller exited with nonzero status");
        }
        Ok(())
    }
}

/// Parse the controller's list-mode stdout.
///
/// Strict by design: a malformed line fails the whole call, since a
/// partially parsed list could route a selection to the wrong device.
pub fn parse_device_list(stdout: &str) -> Result<Vec<Device>, ControllerError> {
    let mut devices = Vec::new();

    for line in stdout.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != 4 {
            return Err(ControllerError::MalformedOutput {
                line: line.to_string(),
                reason: format!("expected 4 fields, got {}", fields.len()),
            });
        }

        let id: u32 = fields[0]
            .parse()
            .map_err(|_| ControllerError::MalformedOutput {
                line: line.to_string(),
                reason: format!("device index is not an integer: {:?}", fields[0]),
            })?;

        devices.push(Device {
            id,
            name: fields[1].to_string(),
            active: fields[3] == "1",
        });
    }

    Ok(devices)
}

/// Locate the controller executable.
///
/// Order: configured path, next to the agent executable, the agent
/// data directory, then PATH. Falls back to the bare executable name
/// so the spawn itself reports `Unavailable` with a useful path.
pub fn discover_controller(config: &ControllerConfig) -> PathBuf {
    if let Some(configured) = &config.path {
        return PathBuf::from(configured);
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join(CONTROLLER_EXE);
            if sibling.exists() {
                return sibling;
            }
        }
    }

    let in_data_dir = paths::data_dir().join(CONTROLLER_EXE);
    if in_data_dir.exists() {
        return in_data_dir;
    }

    if let Ok(found) = which::which("EndPointController") {
        return found;
    }

    PathBuf::from(CONTROLLER_EXE)
}
