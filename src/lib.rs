// Library interface for Keylatch
// Shared wiring between the CLI and tray binaries, and the test surface

pub mod config;
pub mod constants;
pub mod controller;
pub mod events;
pub mod hooks;
pub mod idle;
pub mod journal;
pub mod matcher;
pub mod state;
pub mod ui;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::info;
use std::thread;

use config::Settings;
use controller::Controller;
use events::ControlEvent;
use idle::IdleMonitor;
use journal::EventLog;
use state::AppState;

/// Core wiring shared between the CLI and the tray app: owns the shared
/// state, the event journal and the control-event queue, and starts the
/// input hook, idle monitor and control loop.
///
/// The lock hotkey is not owned here: its OS registration is bound to the
/// thread that creates it, so each binary keeps a
/// [`hooks::hotkeys::HotkeyManager`] on its main thread and follows the lock
/// state from there.
pub struct KeylatchCore {
    state: AppState,
    journal: EventLog,
    tx: Sender<ControlEvent>,
    rx: Option<Receiver<ControlEvent>>,
}

impl KeylatchCore {
    pub fn new(settings: Settings) -> Self {
        let (tx, rx) = bounded(constants::EVENT_QUEUE_CAPACITY);
        Self {
            state: AppState::new(settings),
            journal: EventLog::new(EventLog::default_path()),
            tx,
            rx: Some(rx),
        }
    }

    /// Replace the journal destination. Must be called before [`start`].
    ///
    /// [`start`]: KeylatchCore::start
    pub fn with_journal(mut self, journal: EventLog) -> Self {
        self.journal = journal;
        self
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn journal(&self) -> EventLog {
        self.journal.clone()
    }

    pub fn sender(&self) -> Sender<ControlEvent> {
        self.tx.clone()
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Start the control loop, the global input hook and the idle monitor.
    pub fn start(&mut self) -> Result<()> {
        let rx = self.rx.take().context("Core components already started")?;

        let mut controller = Controller::new(self.state.clone(), self.journal.clone());
        thread::Builder::new()
            .name("control-loop".to_string())
            .spawn(move || controller.run(rx))
            .context("Failed to spawn control loop thread")?;

        hooks::grab::spawn_input_hook(self.state.clone(), self.tx.clone());
        IdleMonitor::new(self.state.clone(), self.tx.clone()).spawn();

        info!("Core components started");
        Ok(())
    }

    /// Ask the controller to lock now, on the same path as the global hotkey.
    pub fn lock_now(&self) {
        let _ = self.tx.send(ControlEvent::HotkeyFired);
    }

    /// Flag every thread to stand down. Safe to call more than once, and
    /// before `start`.
    pub fn shutdown(&self) {
        self.state.request_exit();
        info!("Shutdown requested");
    }
}
