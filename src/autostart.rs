//! Login-time startup registration.
//!
//! Registers the agent under the per-user Run key so it launches at
//! login with the `--autorun` marker. Treated as an opaque external
//! effect by the rest of the agent.

use anyhow::Result;

/// Registry value name under the Run key.
pub const RUN_VALUE_NAME: &str = "AudioSwitch";

#[cfg(windows)]
const RUN_KEY: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Run";

/// Register the agent to start at user login.
#[cfg(windows)]
pub fn register() -> Result<()> {
    use winreg::enums::*;
    use winreg::RegKey;

    let exe = std::env::current_exe()?;
    let command = format!("\"{}\" tray --autorun", exe.display());

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey(RUN_KEY)?;
    key.set_value(RUN_VALUE_NAME, &command)?;

    tracing::info!(command = %command, "Registered login autostart");
    Ok(())
}

/// Remove the login registration. Missing values are not an error.
#[cfg(windows)]
pub fn deregister() -> Result<()> {
    use winreg::enums::*;
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = match hkcu.open_subkey_with_flags(RUN_KEY, KEY_SET_VALUE) {
        Ok(key) => key,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    match key.delete_value(RUN_VALUE_NAME) {
        Ok(()) => {
            tracing::info!("Removed login autostart registration");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Whether a login registration currently exists.
#[cfg(windows)]
pub fn is_registered() -> bool {
    use winreg::enums::*;
    use winreg::RegKey;

    RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey(RUN_KEY)
        .and_then(|key| key.get_value::<String, _>(RUN_VALUE_NAME))
        .is_ok()
}

#[cfg(not(windows))]
pub fn register() -> Result<()> {
    tracing::debug!("Login autostart registration not supported on this platform");
    Ok(())
}

#[cfg(not(windows))]
pub fn deregister() -> Result<()> {
    tracing::debug!("Login autostart registration not supported on this platform");
    Ok(())
}

#[cfg(not(windows))]
pub fn is_registered() -> bool {
    false
}

/// Apply a toggled `run_on_startup` flag to the registry.
pub fn apply(run_on_startup: bool) -> Result<()> {
    if run_on_startup {
        register()
    } else {
        deregister()
    }
}
