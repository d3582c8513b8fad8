// Keylatch Tray App - tray icon with lock status and lock/settings/exit menu

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use global_hotkey::GlobalHotKeyEvent;
use log::{error, info, warn};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::TrayIconBuilder;

use keylatch::config::Settings;
use keylatch::constants::MAIN_POLL_INTERVAL_MS;
use keylatch::hooks::hotkeys::{parse_hotkey, HotkeyManager};
use keylatch::matcher::parse_combo;
use keylatch::state::AppState;
use keylatch::ui::{dialogs, icon, notifications};
use keylatch::KeylatchCore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Keylatch Tray App v{VERSION}");

    let settings = Settings::load_or_default();
    let lock_combo = settings.lock_shortcut.clone();

    let mut core = KeylatchCore::new(settings);
    let state = core.state();
    core.start().context("Failed to start core components")?;

    // A failed hotkey registration is degraded-but-running: locking stays
    // available through the menu and the idle trigger.
    let mut hotkeys = match HotkeyManager::new() {
        Ok(manager) => Some(manager),
        Err(e) => {
            warn!("Global hotkeys unavailable: {e:#}");
            None
        }
    };
    if let Some(manager) = hotkeys.as_mut() {
        if let Err(e) = manager.arm(&lock_combo) {
            warn!("Lock hotkey inactive: {e:#}");
        }
    }

    // Create event loop for tray app
    let event_loop = EventLoopBuilder::new().build();

    // Build tray menu: disabled status label, lock/settings while unlocked,
    // exit always
    let status_item = MenuItem::new("Status: Unlocked", false, None);
    let lock_item = MenuItem::new(lock_now_label(&lock_combo), true, None);
    let settings_item = MenuItem::new("Settings…", true, None);
    let quit_item = MenuItem::new("Exit", true, None);

    let menu = Menu::new();
    menu.append(&status_item)
        .context("Failed to add status menu item")?;
    menu.append(&PredefinedMenuItem::separator())
        .context("Failed to add separator")?;
    menu.append(&lock_item)
        .context("Failed to add lock menu item")?;
    menu.append(&settings_item)
        .context("Failed to add settings menu item")?;
    menu.append(&PredefinedMenuItem::separator())
        .context("Failed to add separator")?;
    menu.append(&quit_item)
        .context("Failed to add exit menu item")?;

    // Create tray icon
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip("Keylatch - Input Locker")
        .with_icon(icon::tray_icon(false))
        .build()
        .context("Failed to create tray icon")?;

    info!("Tray icon created, running event loop");

    // Clone IDs for event handling
    let lock_id = lock_item.id().clone();
    let settings_id = settings_item.id().clone();
    let quit_id = quit_item.id().clone();

    let mut was_locked = state.is_locked();

    // Run event loop; woken by menu events and the poll interval
    event_loop.run(move |_event, _, control_flow| {
        *control_flow =
            ControlFlow::WaitUntil(Instant::now() + Duration::from_millis(MAIN_POLL_INTERVAL_MS));

        // Handle menu events
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            if event.id == lock_id {
                if !state.is_locked() {
                    info!("Lock requested via menu");
                    core.lock_now();
                }
            } else if event.id == settings_id {
                if !state.is_locked() {
                    run_settings_flow(&state, &lock_item);
                }
            } else if event.id == quit_id {
                info!("Exit requested via menu");
                core.shutdown();
                *control_flow = ControlFlow::Exit;
            }
        }

        // Handle global hotkey events
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            let matched = hotkeys
                .as_ref()
                .is_some_and(|manager| manager.is_lock_hotkey(event.id));
            if matched && !state.is_locked() {
                info!("Lock hotkey triggered");
                core.lock_now();
            }
        }

        let is_locked = state.is_locked();

        // The lock hotkey must not stay registered while locked; this
        // thread owns the manager, so registration follows the state here.
        if let Some(manager) = hotkeys.as_mut() {
            let rearm = state.take_hotkey_rearm();
            if is_locked != was_locked {
                let result = if is_locked {
                    manager.disarm()
                } else {
                    manager.arm(&state.settings().lock_shortcut)
                };
                if let Err(e) = result {
                    warn!("Failed to update lock hotkey registration: {e:#}");
                }
            } else if rearm && !is_locked {
                if let Err(e) = manager.arm(&state.settings().lock_shortcut) {
                    warn!("Failed to re-arm lock hotkey: {e:#}");
                }
            }
        }

        // Tray visuals track the lock state
        if is_locked != was_locked {
            if let Err(e) = tray.set_icon(Some(icon::tray_icon(is_locked))) {
                error!("Failed to update tray icon: {e}");
            }
            status_item.set_text(if is_locked {
                "Status: Locked"
            } else {
                "Status: Unlocked"
            });
            lock_item.set_enabled(!is_locked);
            settings_item.set_enabled(!is_locked);
            notifications::show_lock_state_notification(is_locked);
        }
        was_locked = is_locked;
    });
}

/// Settings dialog flow: prompt for both shortcuts and the idle threshold,
/// validate, persist, and flag the lock hotkey for re-arming. Any validation
/// failure shows an error dialog and leaves settings untouched.
fn run_settings_flow(state: &AppState, lock_item: &MenuItem) {
    let current = state.settings();

    let Some(lock_shortcut) =
        dialogs::prompt_text("Keylatch Settings", "Lock shortcut:", &current.lock_shortcut)
    else {
        return;
    };
    let Some(unlock_shortcut) = dialogs::prompt_text(
        "Keylatch Settings",
        "Unlock shortcut:",
        &current.unlock_shortcut,
    ) else {
        return;
    };
    let Some(minutes_raw) = dialogs::prompt_text(
        "Keylatch Settings",
        "Auto-lock after minutes of inactivity (0 disables):",
        &current.inactivity_minutes.to_string(),
    ) else {
        return;
    };

    let inactivity_minutes = match minutes_raw.trim().parse::<u64>() {
        Ok(minutes) => minutes,
        Err(_) => {
            dialogs::show_alert("Invalid Setting", "Inactivity time must be a number.");
            return;
        }
    };
    if let Err(e) = parse_hotkey(&lock_shortcut) {
        dialogs::show_alert("Invalid Setting", &format!("Lock shortcut is not usable: {e:#}"));
        return;
    }
    if parse_combo(&unlock_shortcut).is_empty() {
        dialogs::show_alert(
            "Invalid Setting",
            "Unlock shortcut must contain at least one key.",
        );
        return;
    }

    let settings = Settings {
        unlock_shortcut: unlock_shortcut.trim().to_lowercase(),
        lock_shortcut: lock_shortcut.trim().to_lowercase(),
        inactivity_minutes,
    };
    if let Err(e) = settings.save() {
        dialogs::show_alert("Error", &format!("Could not save settings: {e:#}"));
        return;
    }

    lock_item.set_text(lock_now_label(&settings.lock_shortcut));
    state.apply_settings(settings);
    dialogs::show_alert("Keylatch", "Settings saved.");
}

fn lock_now_label(combo: &str) -> String {
    format!("Lock Now ({})", combo.to_uppercase())
}
