// Keylatch CLI - run the input locker headless, plus setup and log tooling

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use global_hotkey::GlobalHotKeyEvent;
use log::{info, warn};

use keylatch::config::Settings;
use keylatch::constants::MAIN_POLL_INTERVAL_MS;
use keylatch::hooks::hotkeys::{parse_hotkey, HotkeyManager};
use keylatch::journal::EventLog;
use keylatch::matcher::parse_combo;
use keylatch::KeylatchCore;

/// Lock keyboard and mouse input behind a hotkey and an idle timer
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Lock keyboard and mouse input behind a hotkey and an idle timer",
    long_about = "Lock keyboard and mouse input behind a global hotkey and an idle timer.

While locked, all keyboard and mouse input is intercepted system-wide and
recorded to the event log; holding the configured unlock combination
releases it. Locking is triggered by the lock hotkey, the tray menu, or the
inactivity timer.

SETUP:
  Run the setup command to configure shortcuts and the idle threshold:
    keylatch --setup

  Configuration is stored at the platform config directory, e.g.
    ~/.config/keylatch/config.toml

DEFAULTS:
  Lock:   ctrl+alt+l       (single hotkey chord)
  Unlock: ctrl+alt+p       (hold all keys of the combination at once)
  Idle:   5 minutes        (0 disables idle locking)

The unlock match is a subset test: extra held keys never prevent it."
)]
struct Args {
    /// Start with input locked immediately
    #[arg(short, long)]
    locked: bool,

    /// Override the idle threshold in minutes for this run (0 disables)
    #[arg(long, value_name = "MINUTES")]
    idle_minutes: Option<u64>,

    /// Run interactive setup to configure shortcuts and the idle threshold
    #[arg(long)]
    setup: bool,

    /// Print the active settings and file locations, then exit
    #[arg(long)]
    show_config: bool,

    /// Print the last N lines of the event log, then exit
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "200")]
    log_tail: Option<usize>,

    /// Delete the event log after confirmation, then exit
    #[arg(long)]
    clear_log: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.setup {
        return run_setup();
    }
    if args.show_config {
        return show_config();
    }
    if let Some(lines) = args.log_tail {
        return print_log_tail(lines);
    }
    if args.clear_log {
        return clear_log();
    }

    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Keylatch v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load_or_default();
    if let Some(minutes) = args.idle_minutes {
        info!("Idle threshold overridden for this run: {minutes} minutes");
        settings.inactivity_minutes = minutes;
    }
    let lock_combo = settings.lock_shortcut.clone();

    let mut core = KeylatchCore::new(settings);
    let state = core.state();
    core.start().context("Failed to start core components")?;

    // Hotkey registration failure leaves the feature inactive but the
    // locker running: the idle trigger and --locked still work.
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

    if args.locked {
        core.lock_now();
        info!("Starting in LOCKED mode (--locked flag)");
        info!("Hold {} to unlock", state.settings().unlock_shortcut.to_uppercase());
    } else {
        info!(
            "Starting UNLOCKED - press {} to lock",
            lock_combo.to_uppercase()
        );
    }

    info!("Keylatch is running - press Ctrl+C to quit");

    let hotkey_events = GlobalHotKeyEvent::receiver();
    let mut was_locked = state.is_locked();
    loop {
        if let Ok(event) = hotkey_events.recv_timeout(Duration::from_millis(MAIN_POLL_INTERVAL_MS))
        {
            let matched = hotkeys
                .as_ref()
                .is_some_and(|manager| manager.is_lock_hotkey(event.id));
            if matched && !state.is_locked() {
                info!("Lock hotkey triggered");
                core.lock_now();
            }
        }

        // The lock hotkey must not stay registered while locked; this
        // thread owns the manager, so registration follows the state here.
        let is_locked = state.is_locked();
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
        was_locked = is_locked;

        if state.should_exit() {
            break;
        }
    }

    info!("CLI shutdown complete");
    Ok(())
}

/// Helper to prompt for a line of input with a default value
fn prompt_line(prompt: &str, default: &str) -> Result<String> {
    print!("{prompt} [{default}]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    })
}

/// Run interactive setup to configure shortcuts and the idle threshold
fn run_setup() -> Result<()> {
    println!("Keylatch Setup");
    println!("==============\n");

    let current = Settings::load_or_default();

    let lock_shortcut = prompt_line("Lock shortcut", &current.lock_shortcut)?;
    parse_hotkey(&lock_shortcut).context("Invalid lock shortcut")?;

    let unlock_shortcut = prompt_line("Unlock shortcut", &current.unlock_shortcut)?;
    if parse_combo(&unlock_shortcut).is_empty() {
        anyhow::bail!("Error: Unlock shortcut must contain at least one key");
    }

    let minutes_raw = prompt_line(
        "Auto-lock after minutes of inactivity (0 disables)",
        &current.inactivity_minutes.to_string(),
    )?;
    let inactivity_minutes = minutes_raw
        .parse::<u64>()
        .with_context(|| format!("Inactivity time must be a number, got '{minutes_raw}'"))?;

    let settings = Settings {
        unlock_shortcut: unlock_shortcut.to_lowercase(),
        lock_shortcut: lock_shortcut.to_lowercase(),
        inactivity_minutes,
    };
    settings.save().context("Failed to save settings")?;

    println!("\nSettings saved to: {}", Settings::config_path().display());
    println!("Setup complete! Run 'keylatch' to start the locker.");
    Ok(())
}

/// Print the active settings and file locations
fn show_config() -> Result<()> {
    let settings = Settings::load_or_default();
    println!("Config file:      {}", Settings::config_path().display());
    println!("Event log:        {}", EventLog::default_path().display());
    println!("Lock shortcut:    {}", settings.lock_shortcut);
    println!("Unlock shortcut:  {}", settings.unlock_shortcut);
    println!(
        "Auto-lock after:  {} minutes (0 = disabled)",
        settings.inactivity_minutes
    );
    Ok(())
}

/// Print the last `lines` lines of the event log
fn print_log_tail(lines: usize) -> Result<()> {
    let journal = EventLog::new(EventLog::default_path());
    let tail = journal.tail(lines)?;
    if tail.is_empty() {
        println!("Event log is empty.");
        return Ok(());
    }
    for line in tail {
        println!("{line}");
    }
    Ok(())
}

/// Delete the event log after confirmation
fn clear_log() -> Result<()> {
    let journal = EventLog::new(EventLog::default_path());
    let answer = prompt_line("Permanently delete the event log? (y/N)", "n")?;
    if !answer.eq_ignore_ascii_case("y") {
        println!("Aborted.");
        return Ok(());
    }
    journal.clear().context("Could not delete event log")?;
    println!("Event log cleared.");
    Ok(())
}
