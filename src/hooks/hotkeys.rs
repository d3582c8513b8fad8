//! Lock hotkey registration.
//!
//! The lock trigger is a real OS-level hotkey (an atomic chord), unlike the
//! unlock combination which is matched key-by-key from the intercepted
//! stream. Registration must happen on the thread that created the manager,
//! so each binary keeps its `HotkeyManager` on its main/event-loop thread
//! and arms/disarms there in response to lock-state changes: the hotkey is
//! registered only while input is unlocked.

use anyhow::{anyhow, bail, Context, Result};
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::GlobalHotKeyManager;
use log::info;

use crate::matcher::{canonical_token, COMBO_DELIMITER};

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    lock_hotkey: Option<HotKey>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self> {
        let manager =
            GlobalHotKeyManager::new().context("Failed to create global hotkey manager")?;
        Ok(Self {
            manager,
            lock_hotkey: None,
        })
    }

    /// Register the lock hotkey from a combo string such as `ctrl+alt+l`.
    /// Any previously armed hotkey is unregistered first.
    pub fn arm(&mut self, combo: &str) -> Result<()> {
        self.disarm()?;
        let hotkey = parse_hotkey(combo)?;
        self.manager
            .register(hotkey)
            .with_context(|| format!("Failed to register lock hotkey '{combo}'"))?;
        self.lock_hotkey = Some(hotkey);
        info!("Lock hotkey armed: {combo}");
        Ok(())
    }

    /// Unregister the lock hotkey if armed.
    pub fn disarm(&mut self) -> Result<()> {
        if let Some(hotkey) = self.lock_hotkey.take() {
            self.manager
                .unregister(hotkey)
                .context("Failed to unregister lock hotkey")?;
            info!("Lock hotkey disarmed");
        }
        Ok(())
    }

    pub fn is_armed(&self) -> bool {
        self.lock_hotkey.is_some()
    }

    /// Check whether a received hotkey event is the armed lock hotkey.
    pub fn is_lock_hotkey(&self, event_id: u32) -> bool {
        self.lock_hotkey.is_some_and(|hotkey| hotkey.id() == event_id)
    }
}

/// Parse a `+`-delimited combo string into a registrable hotkey: any number
/// of modifier tokens plus exactly one non-modifier key.
pub fn parse_hotkey(combo: &str) -> Result<HotKey> {
    let mut modifiers = Modifiers::empty();
    let mut code = None;

    for raw in combo.split(COMBO_DELIMITER) {
        let token = canonical_token(raw);
        if token.is_empty() {
            continue;
        }
        match token.as_str() {
            "ctrl" => modifiers |= Modifiers::CONTROL,
            "alt" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "meta" => modifiers |= Modifiers::SUPER,
            key => {
                if code.is_some() {
                    bail!("Combo '{combo}' has more than one non-modifier key");
                }
                code = Some(
                    code_from_token(key)
                        .ok_or_else(|| anyhow!("Unsupported key '{key}' in combo '{combo}'"))?,
                );
            }
        }
    }

    let code = code.ok_or_else(|| anyhow!("Combo '{combo}' has no non-modifier key"))?;
    let modifiers = if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    };
    Ok(HotKey::new(modifiers, code))
}

fn code_from_token(token: &str) -> Option<Code> {
    let code = match token {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "space" => Code::Space,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "backspace" => Code::Backspace,
        "delete" => Code::Delete,
        "esc" => Code::Escape,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "insert" => Code::Insert,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        _ => return None,
    };
    Some(code)
}
