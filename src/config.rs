//! Settings persistence.
//!
//! Settings live in a flat TOML record under the platform config directory.
//! A missing file is created with defaults; a malformed file falls back to
//! defaults in memory without touching the file on disk. Only an explicit
//! save overwrites it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INACTIVITY_MINUTES, DEFAULT_LOCK_SHORTCUT, DEFAULT_UNLOCK_SHORTCUT,
};

fn default_unlock_shortcut() -> String {
    DEFAULT_UNLOCK_SHORTCUT.to_string()
}

fn default_lock_shortcut() -> String {
    DEFAULT_LOCK_SHORTCUT.to_string()
}

fn default_inactivity_minutes() -> u64 {
    DEFAULT_INACTIVITY_MINUTES
}

/// User-configurable settings. Per-field serde defaults mean a file missing
/// any field still loads, with defaults filling the gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Combination that unlocks input, tokens joined by `+`.
    #[serde(default = "default_unlock_shortcut")]
    pub unlock_shortcut: String,
    /// Hotkey that locks input, tokens joined by `+`.
    #[serde(default = "default_lock_shortcut")]
    pub lock_shortcut: String,
    /// Minutes of inactivity before auto-lock. 0 disables the trigger.
    #[serde(default = "default_inactivity_minutes")]
    pub inactivity_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unlock_shortcut: default_unlock_shortcut(),
            lock_shortcut: default_lock_shortcut(),
            inactivity_minutes: default_inactivity_minutes(),
        }
    }
}

impl Settings {
    /// Standard config file path:
    ///
    /// - macOS: `~/Library/Application Support/keylatch/config.toml`
    /// - Linux: `~/.config/keylatch/config.toml`
    /// - Windows: `%APPDATA%\keylatch\config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .expect("Failed to determine config directory")
            .join("keylatch")
            .join("config.toml")
    }

    /// Load settings from the standard location, never failing: a missing
    /// file is created with defaults, anything unreadable falls back to
    /// defaults in memory.
    pub fn load_or_default() -> Self {
        Self::load_from_path(&Self::config_path())
    }

    /// Same as [`Settings::load_or_default`] against an explicit path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            let settings = Self::default();
            if let Err(e) = settings.save_to_path(path) {
                warn!(
                    "Failed to create default settings file {}: {e:#}",
                    path.display()
                );
            }
            return settings;
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    "Failed to read settings file {} ({e}); using defaults",
                    path.display()
                );
                return Self::default();
            }
        };

        match toml::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                // The bad file stays in place; only an explicit save
                // replaces it.
                warn!(
                    "Malformed settings file {} ({e}); using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Save settings to the standard location, creating the directory if
    /// needed.
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path())
    }

    /// Same as [`Settings::save`] against an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        info!("Settings saved to: {}", path.display());
        Ok(())
    }

    /// Idle threshold as a duration, `None` when the trigger is disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.inactivity_minutes == 0 {
            None
        } else {
            Some(Duration::from_secs(self.inactivity_minutes * 60))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_load_roundtrip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");

        let original = Settings {
            unlock_shortcut: "ctrl+shift+u".to_string(),
            lock_shortcut: "meta+l".to_string(),
            inactivity_minutes: 12,
        };
        original.save_to_path(&path).expect("save");

        let loaded = Settings::load_from_path(&path);
        assert_eq!(original, loaded);
    }

    #[test]
    fn missing_file_creates_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists(), "defaults should have been written out");
    }

    #[test]
    fn malformed_file_yields_defaults_without_overwrite() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        let garbage = "inactivity_minutes = \"not a number\"\nunlock_shortcut = [";
        fs::write(&path, garbage).expect("write garbage");

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings, Settings::default());

        let after = fs::read_to_string(&path).expect("reread");
        assert_eq!(after, garbage, "malformed file must be left untouched");
    }

    #[test]
    fn missing_fields_get_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "inactivity_minutes = 9\n").expect("write partial");

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings.inactivity_minutes, 9);
        assert_eq!(settings.unlock_shortcut, DEFAULT_UNLOCK_SHORTCUT);
        assert_eq!(settings.lock_shortcut, DEFAULT_LOCK_SHORTCUT);
    }

    #[test]
    fn idle_timeout_zero_is_disabled() {
        let mut settings = Settings::default();
        settings.inactivity_minutes = 0;
        assert_eq!(settings.idle_timeout(), None);

        settings.inactivity_minutes = 5;
        assert_eq!(settings.idle_timeout(), Some(Duration::from_secs(300)));
    }
}
