//! Doctor command - system health checks.

use anyhow::Result;

use crate::autostart;
use crate::config::{self, Config};
use crate::controller::{self, DeviceController, EndpointController};
use crate::prefs::PreferenceStore;
use crate::types::Device;

/// ANSI color codes for terminal output.
mod color {
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
}

struct CheckResult {
    status: CheckStatus,
    label: String,
    detail: Option<String>,
}

enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(label: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            label: label.into(),
            detail: None,
        }
    }

    fn ok_with_detail(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            label: label.into(),
            detail: Some(detail.into()),
        }
    }

    fn warning(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warning,
            label: label.into(),
            detail: Some(detail.into()),
        }
    }

    fn error(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            label: label.into(),
            detail: Some(detail.into()),
        }
    }

    fn print(&self) {
        let (icon, color) = match self.status {
            CheckStatus::Ok => ("[OK]", color::GREEN),
            CheckStatus::Warning => ("[!!]", color::YELLOW),
            CheckStatus::Error => ("[XX]", color::RED),
        };

        print!("{}{}{} {}", color, icon, color::RESET, self.label);
        if let Some(ref detail) = self.detail {
            print!(": {}", detail);
        }
        println!();
    }

    fn is_error(&self) -> bool {
        matches!(self.status, CheckStatus::Error)
    }
}

/// Run the doctor command.
pub async fn run() -> Result<()> {
    println!();
    println!(
        "{}AudioSwitch - System Health Check{}",
        color::BOLD,
        color::RESET
    );
    println!("{}", "=".repeat(40));
    println!();

    let mut has_errors = false;

    CheckResult::ok_with_detail("Agent version", env!("CARGO_PKG_VERSION")).print();

    println!();
    println!("{}Configuration{}", color::BOLD, color::RESET);
    println!("{}", "-".repeat(20));

    let config = match check_config() {
        Ok((result, config)) => {
            result.print();
            Some(config)
        }
        Err(result) => {
            has_errors = result.is_error();
            result.print();
            None
        }
    };

    println!();
    println!("{}Endpoint Controller{}", color::BOLD, color::RESET);
    println!("{}", "-".repeat(20));

    let mut devices = None;
    for check in check_controller(config.as_ref(), &mut devices) {
        if check.is_error() {
            has_errors = true;
        }
        check.print();
    }

    println!();
    println!("{}Preferences{}", color::BOLD, color::RESET);
    println!("{}", "-".repeat(20));

    for check in check_preferences(devices.as_deref()) {
        if check.is_error() {
            has_errors = true;
        }
        check.print();
    }

    println!();
    println!("{}Startup Registration{}", color::BOLD, color::RESET);
    println!("{}", "-".repeat(20));

    for check in check_startup_registration() {
        if check.is_error() {
            has_errors = true;
        }
        check.print();
    }

    println!();
    if has_errors {
        println!(
            "{}Overall: {}UNHEALTHY{} - Some checks failed",
            color::BOLD,
            color::RED,
            color::RESET
        );
    } else {
        println!(
            "{}Overall: {}HEALTHY{}",
            color::BOLD,
            color::GREEN,
            color::RESET
        );
    }
    println!();

    Ok(())
}

fn check_config() -> Result<(CheckResult, Config), CheckResult> {
    let config_path = config::paths::config_file();

    if !config_path.exists() {
        // Optional file; defaults apply.
        return match Config::load() {
            Ok(config) => Ok((
                CheckResult::ok_with_detail("Config file", "not present, using defaults"),
                config,
            )),
            Err(e) => Err(CheckResult::error("Config file", format!("invalid: {}", e))),
        };
    }

    match Config::load() {
        Ok(config) => Ok((
            CheckResult::ok_with_detail("Config file", config_path.display().to_string()),
            config,
        )),
        Err(e) => Err(CheckResult::error("Config file", format!("invalid: {}", e))),
    }
}

fn check_controller(config: Option<&Config>, devices: &mut Option<Vec<Device>>) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let controller_config = config.map(|c| c.controller.clone()).unwrap_or_default();
    let program = controller::discover_controller(&controller_config);

    if program.is_absolute() && !program.exists() {
        results.push(CheckResult::error(
            "EndPointController.exe",
            format!("not found at {}", program.display()),
        ));
        return results;
    }

    results.push(CheckResult::ok_with_detail(
        "EndPointController.exe",
        program.display().to_string(),
    ));

    let client = EndpointController::new(program);
    match client.list_devices() {
        Ok(listed) => {
            results.push(CheckResult::ok_with_detail(
                "Device enumeration",
                format!("{} device(s)", listed.len()),
            ));

            match listed.iter().find(|d| d.active) {
                Some(active) => {
                    results.push(CheckResult::ok_with_detail("Active output", &active.name));
                }
                None => {
                    results.push(CheckResult::warning(
                        "Active output",
                        "controller reports no active device",
                    ));
                }
            }

            *devices = Some(listed);
        }
        Err(e) => {
            results.push(CheckResult::error("Device enumeration", e.to_string()));
        }
    }

    results
}

fn check_preferences(devices: Option<&[Device]>) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let store = match PreferenceStore::load() {
        Ok(s) => s,
        Err(e) => {
            results.push(CheckResult::error("Preferences file", e.to_string()));
            return results;
        }
    };

    let prefs = store.preferences();
    if store.path().exists() {
        results.push(CheckResult::ok_with_detail(
            "Preferences file",
            store.path().display().to_string(),
        ));
    } else {
        results.push(CheckResult::ok_with_detail(
            "Preferences file",
            "not present, using defaults",
        ));
    }

    match (&prefs.preferred_device, devices) {
        (Some(name), Some(devices)) => {
            if devices.iter().any(|d| &d.name == name) {
                results.push(CheckResult::ok_with_detail("Preferred device", name));
            } else {
                // Expected when hardware is unplugged; startup treats
                // this as a no-op, not an error.
                results.push(CheckResult::warning(
                    "Preferred device",
                    format!("{} (not currently present)", name),
                ));
            }
        }
        (Some(name), None) => {
            results.push(CheckResult::ok_with_detail("Preferred device", name));
        }
        (None, _) => {
            results.push(CheckResult::ok_with_detail("Preferred device", "(none)"));
        }
    }

    results.push(CheckResult::ok_with_detail(
        "Change on run",
        if prefs.change_on_run { "enabled" } else { "disabled" },
    ));

    results
}

fn check_startup_registration() -> Vec<CheckResult> {
    let mut results = Vec::new();

    let flag = PreferenceStore::load()
        .map(|s| s.preferences().run_on_startup)
        .unwrap_or(false);
    let registered = autostart::is_registered();

    match (flag, registered) {
        (true, true) => results.push(CheckResult::ok("Login registration present")),
        (false, false) => results.push(CheckResult::ok("Login registration absent")),
        (true, false) => results.push(CheckResult::warning(
            "Login registration",
            "run_on_startup is set but no registry entry exists; toggle the setting again",
        )),
        (false, true) => results.push(CheckResult::warning(
            "Login registration",
            "registry entry exists but run_on_startup is off; it will be removed at next launch",
        )),
    }

    results
}
