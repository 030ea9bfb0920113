//! System tray icon for Windows.
//!
//! Hosts the device menu. The menu content is re-projected from a
//! fresh device enumeration on every open.

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::run_tray;

#[cfg(not(windows))]
pub async fn run_tray(_ctx: crate::startup::LaunchContext) -> anyhow::Result<()> {
    anyhow::bail!("System tray is only supported on Windows")
}
