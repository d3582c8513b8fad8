//! Polling-based idle detection.

use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::debug;

use crate::constants::IDLE_POLL_INTERVAL_SECS;
use crate::events::ControlEvent;
use crate::state::AppState;

/// Periodically checks elapsed idle time and posts [`ControlEvent::IdleTimeout`]
/// when the configured threshold is exceeded. Does nothing while locked; a
/// threshold of zero minutes disables the trigger entirely. The threshold is
/// re-read from live settings on every tick, so a settings change takes
/// effect without a restart.
pub struct IdleMonitor {
    state: AppState,
    tx: Sender<ControlEvent>,
    poll_interval: Duration,
}

impl IdleMonitor {
    pub fn new(state: AppState, tx: Sender<ControlEvent>) -> Self {
        Self {
            state,
            tx,
            poll_interval: Duration::from_secs(IDLE_POLL_INTERVAL_SECS),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn spawn(self) {
        thread::Builder::new()
            .name("idle-monitor".to_string())
            .spawn(move || {
                debug!("Idle monitor started (poll interval {:?})", self.poll_interval);
                loop {
                    thread::sleep(self.poll_interval);
                    if self.state.should_exit() {
                        break;
                    }
                    if self.state.should_idle_lock() {
                        debug!("Idle threshold exceeded");
                        let _ = self.tx.try_send(ControlEvent::IdleTimeout);
                    }
                }
                debug!("Idle monitor stopped");
            })
            .expect("failed to spawn idle monitor thread");
    }
}
