//! AudioSwitch
//!
//! A tray agent for choosing the active audio output device. Device
//! enumeration and switching are delegated to an external endpoint
//! controller executable; this agent tracks state, persists the
//! preferred device, and re-applies it on launch when asked to.

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod autostart;
mod cli;
mod config;
mod controller;
mod crash;
mod error;
mod menu;
mod notifications;
mod prefs;
mod selector;
mod startup;
mod tray;
mod types;

use cli::{Cli, Command};
use startup::LaunchContext;

fn main() {
    // Wrap everything to catch early errors
    if let Err(e) = real_main() {
        // Try to show error - this catches errors before tokio/logging are initialized
        show_startup_error(&format!("{:?}", e));
        std::process::exit(1);
    }
}

#[cfg(windows)]
fn show_startup_error(message: &str) {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    let title = "AudioSwitch - Startup Error";
    let full_message = format!(
        "Failed to start AudioSwitch:\n\n{}\n\nPlease run 'audioswitch doctor' for diagnostics.",
        message
    );

    let title_wide: Vec<u16> = OsStr::new(title).encode_wide().chain(Some(0)).collect();
    let message_wide: Vec<u16> = OsStr::new(&full_message)
        .encode_wide()
        .chain(Some(0))
        .collect();

    // MB_ICONERROR = 0x10, MB_SETFOREGROUND = 0x10000, MB_TOPMOST = 0x40000
    let flags: u32 = 0x10 | 0x10000 | 0x40000;

    unsafe {
        windows_sys::Win32::UI::WindowsAndMessaging::MessageBoxW(
            0,
            message_wide.as_ptr(),
            title_wide.as_ptr(),
            flags,
        );
    }
}

#[cfg(not(windows))]
fn show_startup_error(message: &str) {
    eprintln!("AudioSwitch startup error: {}", message);
}

#[tokio::main]
async fn real_main() -> Result<()> {
    // Install crash handler first thing
    crash::install_panic_hook();

    let cli = Cli::parse();

    // Hide console window for the tray command (it doesn't need one)
    #[cfg(windows)]
    if matches!(cli.command, Command::Tray { .. }) {
        unsafe {
            windows_sys::Win32::System::Console::FreeConsole();
        }
    }

    // Initialize logging based on command: the tray agent logs to
    // rotating files, everything else to the console.
    let _guard = match &cli.command {
        Command::Tray { .. } => init_file_logging(&cli)?,
        _ => init_console_logging(&cli)?,
    };

    info!(version = env!("CARGO_PKG_VERSION"), "AudioSwitch starting");

    match cli.command {
        Command::Tray { autorun } => {
            // The login registration passes --autorun, but the token is
            // also accepted bare and in any case for older entries.
            let mut ctx = LaunchContext::from_args(std::env::args().skip(1));
            ctx.autorun_requested |= autorun;
            tray::run_tray(ctx).await
        }
        Command::Devices => cli::devices::run().await,
        Command::Select { name } => cli::select::run(&name).await,
        Command::Doctor => cli::doctor::run().await,
        Command::Config { action } => cli::config::run(action).await,
        Command::Version => {
            println!("audioswitch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_console_logging(cli: &Cli) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();

    Ok(None)
}

fn init_file_logging(cli: &Cli) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = config::paths::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("audioswitch")
        .filename_suffix("log")
        .max_log_files(10)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_writer(non_blocking),
        )
        .init();

    Ok(Some(guard))
}
