//! Windows system tray implementation.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder, TrayIconEvent,
};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::autostart;
use crate::config::Config;
use crate::controller::EndpointController;
use crate::menu::{self, MenuModel};
use crate::notifications;
use crate::prefs::PreferenceStore;
use crate::selector::{DeviceSelector, Selection};
use crate::startup::{self, LaunchContext, StartupDecision};
use crate::types::Device;

/// Menu item IDs. Device entries use the `device:` prefix followed by
/// the snapshot-local ordinal id.
mod menu_ids {
    pub const DEVICE_PREFIX: &str = "device:";
    pub const NO_DEVICES: &str = "no_devices";
    pub const RUN_ON_STARTUP: &str = "run_on_startup";
    pub const CHANGE_ON_RUN: &str = "change_on_run";
    pub const QUIT_ON_COMPLETE: &str = "quit_on_complete";
    pub const EXIT: &str = "exit";
}

/// Application state for the tray icon.
///
/// Owns the preference store and the most recent enumeration snapshot;
/// all menu and click handling happens on this one thread.
struct TrayApp {
    tray_icon: Option<TrayIcon>,
    running: Arc<AtomicBool>,
    controller: EndpointController,
    store: PreferenceStore,
    enable_notifications: bool,
    /// Devices backing the currently shown menu. Replaced wholesale on
    /// every projection; ids are resolved only against this snapshot.
    snapshot: Vec<Device>,
}

impl TrayApp {
    fn new(controller: EndpointController, store: PreferenceStore, enable_notifications: bool) -> Self {
        Self {
            tray_icon: None,
            running: Arc::new(AtomicBool::new(true)),
            controller,
            store,
            enable_notifications,
            snapshot: Vec::new(),
        }
    }

    /// Re-project the menu from a fresh enumeration and install it.
    fn refresh_menu(&mut self) {
        let menu = match menu::project(&self.controller, self.store.preferences()) {
            Ok(model) => {
                self.snapshot = model.snapshot();
                self.build_menu(&model)
            }
            Err(e) => {
                warn!(error = %e, "Device enumeration failed, showing degraded menu");
                if self.enable_notifications {
                    notifications::notify_controller_error(
                        "Could not list audio devices",
                        &e.to_string(),
                    );
                }
                self.snapshot.clear();
                self.build_degraded_menu()
            }
        };

        match menu {
            Ok(menu) => {
                if let Some(tray_icon) = &self.tray_icon {
                    tray_icon.set_menu(Some(Box::new(menu)));
                }
            }
            Err(e) => error!(error = %e, "Failed to build tray menu"),
        }
    }

    fn build_menu(&self, model: &MenuModel) -> Result<Menu> {
        let menu = Menu::new();

        if model.entries.is_empty() {
            let empty =
                MenuItem::with_id(menu_ids::NO_DEVICES, "No audio devices found", false, None);
            menu.append(&empty)?;
        }

        for entry in &model.entries {
            let id = format!("{}{}", menu_ids::DEVICE_PREFIX, entry.device.id);
            let item = CheckMenuItem::with_id(&id, &entry.label, true, entry.checked, None);
            menu.append(&item)?;
        }

        menu.append(&PredefinedMenuItem::separator())?;
        self.append_flag_items(
            &menu,
            model.flags.run_on_startup,
            model.flags.change_on_run,
            model.flags.quit_on_complete,
        )?;

        Ok(menu)
    }

    /// Menu shown when the controller is unavailable: no device
    /// entries, but settings and exit stay reachable.
    fn build_degraded_menu(&self) -> Result<Menu> {
        let menu = Menu::new();

        let unavailable =
            MenuItem::with_id(menu_ids::NO_DEVICES, "Audio controller unavailable", false, None);
        menu.append(&unavailable)?;
        menu.append(&PredefinedMenuItem::separator())?;

        let prefs = self.store.preferences();
        self.append_flag_items(
            &menu,
            prefs.run_on_startup,
            prefs.change_on_run,
            prefs.quit_on_complete,
        )?;

        Ok(menu)
    }

    fn append_flag_items(
        &self,
        menu: &Menu,
        run_on_startup: bool,
        change_on_run: bool,
        quit_on_complete: bool,
    ) -> Result<()> {
        let startup_item = CheckMenuItem::with_id(
            menu_ids::RUN_ON_STARTUP,
            "Run On Startup",
            true,
            run_on_startup,
            None,
        );
        menu.append(&startup_item)?;

        let change_item = CheckMenuItem::with_id(
            menu_ids::CHANGE_ON_RUN,
            "Change to Preferred Device on Run",
            true,
            change_on_run,
            None,
        );
        menu.append(&change_item)?;

        let quit_item = CheckMenuItem::with_id(
            menu_ids::QUIT_ON_COMPLETE,
            "Quit On Autorun Complete",
            true,
            quit_on_complete,
            None,
        );
        menu.append(&quit_item)?;

        menu.append(&PredefinedMenuItem::separator())?;

        let exit_item = MenuItem::with_id(menu_ids::EXIT, "Exit", true, None);
        menu.append(&exit_item)?;

        Ok(())
    }

    fn create_icon(&self) -> Result<tray_icon::Icon> {
        const ICON_PNG: &[u8] = include_bytes!("../../assets/icon.png");

        let img = image::load_from_memory(ICON_PNG)
            .map_err(|e| anyhow::anyhow!("Failed to decode icon: {}", e))?;
        let img = img.resize_exact(32, 32, image::imageops::FilterType::Lanczos3);

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let raw_data = rgba.into_raw();

        tray_icon::Icon::from_rgba(raw_data, width, height)
            .map_err(|e| anyhow::anyhow!("Failed to create icon: {}", e))
    }

    fn handle_menu_event(&mut self, event: MenuEvent) {
        let id = event.id.0.as_str();

        if let Some(raw) = id.strip_prefix(menu_ids::DEVICE_PREFIX) {
            match raw.parse::<u32>() {
                Ok(device_id) => self.activate_device(device_id),
                Err(_) => warn!(id, "Unparseable device menu id"),
            }
            return;
        }

        match id {
            menu_ids::RUN_ON_STARTUP => match self.store.toggle_run_on_startup() {
                Ok(enabled) => {
                    if let Err(e) = autostart::apply(enabled) {
                        error!(error = %e, "Failed to update login registration");
                    }
                }
                Err(e) => error!(error = %e, "Failed to save preferences"),
            },
            menu_ids::CHANGE_ON_RUN => {
                if let Err(e) = self.store.toggle_change_on_run() {
                    error!(error = %e, "Failed to save preferences");
                }
            }
            menu_ids::QUIT_ON_COMPLETE => {
                if let Err(e) = self.store.toggle_quit_on_complete() {
                    error!(error = %e, "Failed to save preferences");
                }
            }
            menu_ids::EXIT => {
                info!("Exit requested from tray menu");
                self.running.store(false, Ordering::SeqCst);
            }
            _ => {}
        }
    }

    fn activate_device(&mut self, device_id: u32) {
        let snapshot = self.snapshot.clone();
        let mut selector = DeviceSelector::new(&self.controller, &mut self.store);

        match selector.select_by_id(device_id, &snapshot) {
            Ok(Selection::Applied(device)) => {
                if self.enable_notifications {
                    notifications::notify_switch_applied(&device.name);
                }
            }
            Ok(Selection::NotFound) => {
                // Device list changed since the menu was built; the
                // next open re-enumerates.
                warn!(device_id, "Clicked device no longer present");
            }
            Err(e) => {
                error!(error = %e, "Device selection failed");
                if self.enable_notifications {
                    notifications::notify_controller_error(
                        "Could not switch audio device",
                        &e.to_string(),
                    );
                }
            }
        }
    }
}

impl ApplicationHandler for TrayApp {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // Create tray icon on first resume
        if self.tray_icon.is_none() {
            let icon = match self.create_icon() {
                Ok(i) => i,
                Err(e) => {
                    error!(error = %e, "Failed to create tray icon image");
                    return;
                }
            };

            let tray_icon = TrayIconBuilder::new()
                .with_tooltip("AudioSwitch")
                .with_icon(icon)
                .with_menu_on_left_click(true)
                .build();

            match tray_icon {
                Ok(ti) => {
                    self.tray_icon = Some(ti);
                    self.refresh_menu();
                    info!("System tray icon created");
                }
                Err(e) => {
                    error!(error = %e, "Failed to create tray icon");
                }
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
        // We don't have any windows, just the tray icon
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Any click on the icon (left or right both open the menu)
        // triggers a fresh projection, since devices come and go.
        while let Ok(event) = TrayIconEvent::receiver().try_recv() {
            if matches!(event, TrayIconEvent::Click { .. }) {
                self.refresh_menu();
            }
        }

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            self.handle_menu_event(event);
            // Reflect toggled flags and the new active device.
            self.refresh_menu();
        }

        if !self.running.load(Ordering::SeqCst) {
            event_loop.exit();
        }

        event_loop.set_control_flow(ControlFlow::Wait);
    }
}

/// Run the tray agent: startup reconciliation, then the menu loop.
pub async fn run_tray(ctx: LaunchContext) -> Result<()> {
    crate::config::paths::ensure_directories()?;

    let config = Config::load()?;
    let mut store = PreferenceStore::load()?;
    let controller = EndpointController::from_config(&config.controller);
    info!(controller = ?controller.program(), "Using endpoint controller");

    startup::sync_login_registration(store.preferences());

    if startup::reconcile(&controller, &mut store, ctx) == StartupDecision::QuitAfterAutorun {
        // No UI resources exist yet; terminate with success.
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = TrayApp::new(controller, store, config.agent.enable_toast_notifications);

    event_loop.run_app(&mut app)?;

    Ok(())
}
