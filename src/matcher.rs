//! Unlock combination matching.
//!
//! Raw key events are normalized to lowercase canonical tokens ("ctrl",
//! "shift", "p", ...); the matcher tracks which tokens are currently held
//! and reports the moment every token of the configured combination is held
//! at once. The test is subset membership, not exact equality: extra held
//! keys (a stuck modifier, an accidental second finger) never prevent a
//! match.

use std::collections::{BTreeSet, HashSet};

use rdev::Key;

use crate::events::KeyInput;

/// Delimiter between tokens in a configured combination string.
pub const COMBO_DELIMITER: char = '+';

/// Canonicalize a single combination token: trimmed, lowercased, with the
/// common spelling variants folded onto one name.
pub fn canonical_token(raw: &str) -> String {
    let token = raw.trim().to_lowercase();
    match token.as_str() {
        "control" => "ctrl".to_string(),
        "cmd" | "command" | "win" | "super" => "meta".to_string(),
        "option" => "alt".to_string(),
        "return" => "enter".to_string(),
        "escape" => "esc".to_string(),
        _ => token,
    }
}

/// Split a combination string on [`COMBO_DELIMITER`] into canonical tokens.
/// Empty fragments are dropped, so `"ctrl++p"` and `" ctrl + p "` both parse.
pub fn parse_combo(combo: &str) -> BTreeSet<String> {
    combo
        .split(COMBO_DELIMITER)
        .map(canonical_token)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Map a raw key event to its canonical token, if it has one.
///
/// Resolution order: named keys (left/right variants collapsed), then the
/// character text the platform reported, then the layout-independent key
/// identity, then a raw-code range check for keys the platform could not
/// classify. Keys that survive none of these yield no token and are ignored
/// for matching (they are still journaled).
pub fn normalize(input: &KeyInput) -> Option<String> {
    if let Some(token) = named_token(input.key) {
        return Some(token.to_string());
    }

    if let Some(text) = input.text.as_deref() {
        let mut chars = text.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if !ch.is_control() && !ch.is_whitespace() {
                return Some(ch.to_lowercase().collect());
            }
        }
    }

    if let Some(token) = key_identity_token(input.key) {
        return Some(token.to_string());
    }

    if let Key::Unknown(code) = input.key {
        return raw_code_token(code);
    }

    None
}

/// Human-readable rendering of a raw key event for the journal. Unlike
/// [`normalize`], every event gets a description.
pub fn describe_key(input: &KeyInput) -> String {
    if let Some(token) = normalize(input) {
        if token.chars().count() == 1 {
            format!("'{token}'")
        } else {
            token
        }
    } else if let Key::Unknown(code) = input.key {
        format!("vk_{code}")
    } else {
        format!("{:?}", input.key).to_lowercase()
    }
}

/// Named and functional keys. Left/right variants of the same modifier
/// collapse to one token so a combination never cares which shift was used.
fn named_token(key: Key) -> Option<&'static str> {
    let token = match key {
        Key::ShiftLeft | Key::ShiftRight => "shift",
        Key::ControlLeft | Key::ControlRight => "ctrl",
        Key::Alt | Key::AltGr => "alt",
        Key::MetaLeft | Key::MetaRight => "meta",
        Key::Return | Key::KpReturn => "enter",
        Key::Escape => "esc",
        Key::Space => "space",
        Key::Tab => "tab",
        Key::Backspace => "backspace",
        Key::Delete | Key::KpDelete => "delete",
        Key::Insert => "insert",
        Key::Home => "home",
        Key::End => "end",
        Key::PageUp => "pageup",
        Key::PageDown => "pagedown",
        Key::UpArrow => "up",
        Key::DownArrow => "down",
        Key::LeftArrow => "left",
        Key::RightArrow => "right",
        Key::CapsLock => "capslock",
        Key::NumLock => "numlock",
        Key::ScrollLock => "scrolllock",
        Key::PrintScreen => "printscreen",
        Key::Pause => "pause",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        _ => return None,
    };
    Some(token)
}

/// Layout-independent identity for printable keys, used when the platform
/// reported no character text.
fn key_identity_token(key: Key) -> Option<&'static str> {
    let token = match key {
        Key::KeyA => "a",
        Key::KeyB => "b",
        Key::KeyC => "c",
        Key::KeyD => "d",
        Key::KeyE => "e",
        Key::KeyF => "f",
        Key::KeyG => "g",
        Key::KeyH => "h",
        Key::KeyI => "i",
        Key::KeyJ => "j",
        Key::KeyK => "k",
        Key::KeyL => "l",
        Key::KeyM => "m",
        Key::KeyN => "n",
        Key::KeyO => "o",
        Key::KeyP => "p",
        Key::KeyQ => "q",
        Key::KeyR => "r",
        Key::KeyS => "s",
        Key::KeyT => "t",
        Key::KeyU => "u",
        Key::KeyV => "v",
        Key::KeyW => "w",
        Key::KeyX => "x",
        Key::KeyY => "y",
        Key::KeyZ => "z",
        Key::Num0 | Key::Kp0 => "0",
        Key::Num1 | Key::Kp1 => "1",
        Key::Num2 | Key::Kp2 => "2",
        Key::Num3 | Key::Kp3 => "3",
        Key::Num4 | Key::Kp4 => "4",
        Key::Num5 | Key::Kp5 => "5",
        Key::Num6 | Key::Kp6 => "6",
        Key::Num7 | Key::Kp7 => "7",
        Key::Num8 | Key::Kp8 => "8",
        Key::Num9 | Key::Kp9 => "9",
        Key::Minus | Key::KpMinus => "-",
        Key::Equal => "=",
        Key::LeftBracket => "[",
        Key::RightBracket => "]",
        Key::SemiColon => ";",
        Key::Quote => "'",
        Key::BackSlash | Key::IntlBackslash => "\\",
        Key::Comma => ",",
        Key::Dot => ".",
        Key::Slash | Key::KpDivide => "/",
        Key::BackQuote => "`",
        Key::KpPlus => "+",
        Key::KpMultiply => "*",
        _ => return None,
    };
    Some(token)
}

/// Raw platform code fallback: lowercase letters, uppercase letters folded
/// to lowercase, and digits. Everything else is unclassifiable.
fn raw_code_token(code: u32) -> Option<String> {
    let ch = match code {
        97..=122 | 48..=57 => char::from_u32(code)?,
        65..=90 => char::from_u32(code + 32)?,
        _ => return None,
    };
    Some(ch.to_string())
}

/// Tracks the configured unlock combination and the set of currently-held
/// canonical tokens. Only meaningful while input is locked; the controller
/// re-arms it on every lock transition.
#[derive(Debug, Clone, Default)]
pub struct UnlockMatcher {
    combo: BTreeSet<String>,
    held: HashSet<String>,
}

impl UnlockMatcher {
    pub fn new(combo: &str) -> Self {
        Self {
            combo: parse_combo(combo),
            held: HashSet::new(),
        }
    }

    /// Re-arm with a new combination string and forget all held keys.
    pub fn arm(&mut self, combo: &str) {
        self.combo = parse_combo(combo);
        self.held.clear();
    }

    /// Record a token as held. Empty tokens are ignored.
    pub fn on_press(&mut self, token: &str) {
        if !token.is_empty() {
            self.held.insert(token.to_string());
        }
    }

    /// Record a token as released. A release for a token that was never
    /// held is a no-op.
    pub fn on_release(&mut self, token: &str) {
        self.held.remove(token);
    }

    pub fn clear_held(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, token: &str) -> bool {
        self.held.contains(token)
    }

    /// True once every token of the combination is held. Extra held tokens
    /// are irrelevant. An empty combination never matches: without this
    /// guard a blank configured shortcut would unlock on the first event.
    pub fn is_satisfied(&self) -> bool {
        !self.combo.is_empty() && self.combo.iter().all(|token| self.held.contains(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_token_folds_aliases() {
        assert_eq!(canonical_token("Control"), "ctrl");
        assert_eq!(canonical_token("CMD"), "meta");
        assert_eq!(canonical_token("win"), "meta");
        assert_eq!(canonical_token("super"), "meta");
        assert_eq!(canonical_token("option"), "alt");
        assert_eq!(canonical_token("Return"), "enter");
        assert_eq!(canonical_token("escape"), "esc");
        assert_eq!(canonical_token("  P "), "p");
    }

    #[test]
    fn parse_combo_drops_empty_fragments() {
        let combo = parse_combo("ctrl++p+");
        assert_eq!(combo.len(), 2);
        assert!(combo.contains("ctrl"));
        assert!(combo.contains("p"));

        assert!(parse_combo("").is_empty());
        assert!(parse_combo("+++").is_empty());
    }

    #[test]
    fn normalize_collapses_left_right_variants() {
        let left = normalize(&KeyInput::named(Key::ShiftLeft));
        let right = normalize(&KeyInput::named(Key::ShiftRight));
        assert_eq!(left, Some("shift".to_string()));
        assert_eq!(left, right);
    }

    #[test]
    fn normalize_prefers_character_text() {
        // A layout where the physical Q key produces 'a' should match on 'a'.
        let input = KeyInput::with_text(Key::KeyQ, "a");
        assert_eq!(normalize(&input), Some("a".to_string()));
    }

    #[test]
    fn normalize_lowercases_text() {
        let input = KeyInput::with_text(Key::KeyP, "P");
        assert_eq!(normalize(&input), Some("p".to_string()));
    }

    #[test]
    fn normalize_falls_back_to_key_identity() {
        assert_eq!(normalize(&KeyInput::named(Key::KeyP)), Some("p".to_string()));
        assert_eq!(normalize(&KeyInput::named(Key::Num7)), Some("7".to_string()));
    }

    #[test]
    fn normalize_raw_code_ranges() {
        assert_eq!(
            normalize(&KeyInput::named(Key::Unknown(112))),
            Some("p".to_string())
        ); // 'p'
        assert_eq!(
            normalize(&KeyInput::named(Key::Unknown(80))),
            Some("p".to_string())
        ); // 'P' folds to lowercase
        assert_eq!(
            normalize(&KeyInput::named(Key::Unknown(53))),
            Some("5".to_string())
        );
        assert_eq!(normalize(&KeyInput::named(Key::Unknown(33))), None);
        assert_eq!(normalize(&KeyInput::named(Key::Unknown(200))), None);
    }

    #[test]
    fn normalize_unclassifiable_yields_none() {
        assert_eq!(normalize(&KeyInput::named(Key::Function)), None);
    }

    #[test]
    fn describe_key_always_produces_something() {
        assert_eq!(describe_key(&KeyInput::with_text(Key::KeyP, "p")), "'p'");
        assert_eq!(describe_key(&KeyInput::named(Key::ShiftLeft)), "shift");
        assert_eq!(describe_key(&KeyInput::named(Key::Unknown(999))), "vk_999");
        assert_eq!(describe_key(&KeyInput::named(Key::Function)), "function");
    }

    #[test]
    fn empty_combo_never_matches() {
        let mut matcher = UnlockMatcher::new("");
        matcher.on_press("ctrl");
        assert!(!matcher.is_satisfied());
    }

    #[test]
    fn subset_match_tolerates_extra_keys() {
        let mut matcher = UnlockMatcher::new("ctrl+alt+p");
        matcher.on_press("shift"); // incidental
        matcher.on_press("ctrl");
        matcher.on_press("alt");
        assert!(!matcher.is_satisfied());
        matcher.on_press("p");
        assert!(matcher.is_satisfied());
    }

    #[test]
    fn release_retracts_a_match() {
        let mut matcher = UnlockMatcher::new("ctrl+p");
        matcher.on_press("ctrl");
        matcher.on_press("p");
        assert!(matcher.is_satisfied());
        matcher.on_release("p");
        assert!(!matcher.is_satisfied());
        // Releasing something never held is a no-op.
        matcher.on_release("x");
        assert!(!matcher.is_satisfied());
    }

    #[test]
    fn arm_clears_held_state() {
        let mut matcher = UnlockMatcher::new("ctrl+p");
        matcher.on_press("ctrl");
        matcher.arm("ctrl+p");
        matcher.on_press("p");
        assert!(!matcher.is_satisfied(), "ctrl should have been forgotten");
    }
}
