//! The control loop: single consumer of the event queue, sole owner of
//! lock/unlock transitions and the held-key set.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info};
use rdev::Button;

use crate::constants::MOUSE_MOVE_LOG_INTERVAL_SECS;
use crate::events::{ControlEvent, KeyInput};
use crate::journal::EventLog;
use crate::matcher::{self, UnlockMatcher};
use crate::state::{AppState, LockState};

pub struct Controller {
    state: AppState,
    journal: EventLog,
    matcher: UnlockMatcher,
    /// Last pointer position seen, used to annotate blocked-click lines
    /// (button events carry no coordinates of their own).
    last_pointer: Option<(f64, f64)>,
    last_mouse_log: Option<Instant>,
}

impl Controller {
    pub fn new(state: AppState, journal: EventLog) -> Self {
        Self {
            state,
            journal,
            matcher: UnlockMatcher::default(),
            last_pointer: None,
            last_mouse_log: None,
        }
    }

    /// Consume the queue until it disconnects or shutdown is requested.
    pub fn run(&mut self, rx: Receiver<ControlEvent>) {
        loop {
            match rx.recv_timeout(Duration::from_millis(500)) {
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if self.state.should_exit() {
                break;
            }
        }
        debug!("Control loop stopped");
    }

    pub fn handle_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::HotkeyFired => self.lock("lock hotkey"),
            ControlEvent::IdleTimeout => self.lock("inactivity timeout"),
            ControlEvent::KeyPress(input) => self.on_key_press(input),
            ControlEvent::KeyRelease(input) => self.on_key_release(input),
            ControlEvent::ButtonPress(button) => self.on_button_press(button),
            ControlEvent::MouseMove { x, y } => self.on_mouse_move(x, y),
            ControlEvent::Wheel => {
                if !self.state.is_locked() {
                    self.state.touch_activity();
                }
            }
        }
    }

    /// Enter the locked state. No-op if already locked.
    fn lock(&mut self, trigger: &str) {
        if self.state.is_locked() {
            return;
        }
        // Snapshot the unlock combination now; settings cannot change while
        // locked, so the snapshot stays valid for the whole locked period.
        self.matcher.arm(&self.state.settings().unlock_shortcut);
        self.last_mouse_log = None;
        self.state.set_lock_state(LockState::Locked);
        self.journal.append("Input locked");
        info!("Input locked ({trigger})");
    }

    /// Leave the locked state. No-op if already unlocked.
    fn unlock(&mut self) {
        if !self.state.is_locked() {
            return;
        }
        self.matcher.clear_held();
        self.state.set_lock_state(LockState::Unlocked);
        // Fresh idle countdown, or the idle trigger would re-lock at once.
        self.state.touch_activity();
        self.journal.append("Input unlocked");
        info!("Input unlocked");
    }

    fn on_key_press(&mut self, input: KeyInput) {
        if !self.state.is_locked() {
            self.state.touch_activity();
            return;
        }

        // Journaling and matching are independent: every intercepted press
        // is recorded, whether or not it yields a token.
        self.journal.append(&format!(
            "Blocked keyboard input: {}",
            matcher::describe_key(&input)
        ));

        if let Some(token) = matcher::normalize(&input) {
            self.matcher.on_press(&token);
            if self.matcher.is_satisfied() {
                info!("Unlock combination matched");
                self.unlock();
            }
        }
    }

    fn on_key_release(&mut self, input: KeyInput) {
        if !self.state.is_locked() {
            self.state.touch_activity();
            return;
        }
        if let Some(token) = matcher::normalize(&input) {
            self.matcher.on_release(&token);
        }
    }

    fn on_button_press(&mut self, button: Button) {
        if !self.state.is_locked() {
            self.state.touch_activity();
            return;
        }
        let position = match self.last_pointer {
            Some((x, y)) => format!(" at ({x:.0}, {y:.0})"),
            None => String::new(),
        };
        self.journal.append(&format!(
            "Blocked mouse click: {}{}",
            describe_button(button),
            position
        ));
    }

    fn on_mouse_move(&mut self, x: f64, y: f64) {
        self.last_pointer = Some((x, y));
        if !self.state.is_locked() {
            self.state.touch_activity();
            return;
        }
        let due = self
            .last_mouse_log
            .map_or(true, |at| {
                at.elapsed() >= Duration::from_secs(MOUSE_MOVE_LOG_INTERVAL_SECS)
            });
        if due {
            self.journal
                .append(&format!("Blocked mouse move at ({x:.0}, {y:.0})"));
            self.last_mouse_log = Some(Instant::now());
        }
    }
}

fn describe_button(button: Button) -> String {
    match button {
        Button::Left => "left".to_string(),
        Button::Right => "right".to_string(),
        Button::Middle => "middle".to_string(),
        Button::Unknown(code) => format!("button{code}"),
    }
}
