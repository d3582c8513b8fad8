//! Typed events flowing from the hook, hotkey and idle threads into the
//! single control loop.
//!
//! Every thread that observes the outside world posts one of these variants
//! onto the bounded queue; only the control loop mutates lock state or the
//! held-key set in response.

use rdev::{Button, Key};

/// A raw keyboard event as delivered by the global hook.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInput {
    /// Platform-independent key identity.
    pub key: Key,
    /// Printable text the platform reported for this event, if any.
    pub text: Option<String>,
}

impl KeyInput {
    /// A key event with no character text attached.
    pub fn named(key: Key) -> Self {
        Self { key, text: None }
    }

    /// A key event carrying the text the platform produced for it.
    pub fn with_text(key: Key, text: &str) -> Self {
        Self {
            key,
            text: Some(text.to_string()),
        }
    }
}

/// One unit of work for the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    KeyPress(KeyInput),
    KeyRelease(KeyInput),
    ButtonPress(Button),
    MouseMove { x: f64, y: f64 },
    Wheel,
    /// The lock hotkey fired, or an equivalent explicit lock request
    /// (tray "Lock Now", `--locked` startup).
    HotkeyFired,
    /// The idle monitor observed the inactivity threshold being exceeded.
    IdleTimeout,
}
