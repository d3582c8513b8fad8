use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::Settings;

/// The lock/unlock state machine has exactly two states and no intermediate
/// ones. Redundant transitions are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockState::Unlocked => write!(f, "Unlocked"),
            LockState::Locked => write!(f, "Locked"),
        }
    }
}

/// Application state shared across threads.
///
/// Hook, hotkey and idle threads read it; the control loop is the only
/// writer of the lock state. Settings mutate only through
/// [`AppState::apply_settings`], which also flags the lock hotkey for
/// re-registration on its owning thread.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    lock_state: LockState,
    /// Last time any input activity was observed while unlocked.
    last_activity: Instant,
    settings: Settings,
    /// Set when settings changed and the lock hotkey needs re-registering.
    hotkey_rearm: bool,
    should_exit: bool,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                lock_state: LockState::Unlocked,
                last_activity: Instant::now(),
                settings,
                hotkey_rearm: false,
                should_exit: false,
            })),
        }
    }

    pub fn lock_state(&self) -> LockState {
        self.inner.lock().lock_state
    }

    pub fn is_locked(&self) -> bool {
        self.inner.lock().lock_state == LockState::Locked
    }

    pub fn set_lock_state(&self, lock_state: LockState) {
        let mut inner = self.inner.lock();
        if inner.lock_state != lock_state {
            log::debug!("Lock state: {} -> {}", inner.lock_state, lock_state);
            inner.lock_state = lock_state;
        }
    }

    /// Reset the idle clock to now. Called for every input event observed
    /// while unlocked; intercepted input while locked must not reach this.
    pub fn touch_activity(&self) {
        self.inner.lock().last_activity = Instant::now();
    }

    pub fn idle_elapsed(&self) -> Duration {
        self.inner.lock().last_activity.elapsed()
    }

    /// True when the idle trigger should fire: unlocked, threshold
    /// configured (non-zero), and elapsed idle time at or past it.
    pub fn should_idle_lock(&self) -> bool {
        let inner = self.inner.lock();
        if inner.lock_state == LockState::Locked {
            return false;
        }
        match inner.settings.idle_timeout() {
            Some(threshold) => inner.last_activity.elapsed() >= threshold,
            None => false,
        }
    }

    pub fn settings(&self) -> Settings {
        self.inner.lock().settings.clone()
    }

    /// Install new settings and flag the lock hotkey for re-arming.
    pub fn apply_settings(&self, settings: Settings) {
        let mut inner = self.inner.lock();
        inner.settings = settings;
        inner.hotkey_rearm = true;
        log::info!("Settings applied");
    }

    /// Check whether the hotkey needs re-arming and clear the flag.
    pub fn take_hotkey_rearm(&self) -> bool {
        let mut inner = self.inner.lock();
        let rearm = inner.hotkey_rearm;
        inner.hotkey_rearm = false;
        rearm
    }

    /// Flag every thread to stand down. Idempotent.
    pub fn request_exit(&self) {
        self.inner.lock().should_exit = true;
    }

    pub fn should_exit(&self) -> bool {
        self.inner.lock().should_exit
    }
}
