//! The append-only event journal.
//!
//! Separate from the `log`-based diagnostics: this is the user-visible
//! record of lock/unlock transitions and blocked input, one timestamped line
//! per event. The core only ever appends; truncation is a user action.
//! Append failures go to the diagnostic log and are never raised, retried,
//! or allowed to interfere with locking.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Standard journal path under the platform data directory, e.g.
    /// `~/.local/share/keylatch/events.log` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .expect("Failed to determine data directory")
            .join("keylatch")
            .join("events.log")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line. Infallible from the caller's point of
    /// view; failures are reported to the diagnostic log only.
    pub fn append(&self, message: &str) {
        if let Err(e) = self.try_append(message) {
            error!("Failed to write event log entry: {e:#}");
        }
    }

    fn try_append(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create event log directory")?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open event log: {}", self.path.display()))?;
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        writeln!(file, "{timestamp} - {message}").context("Failed to append event log entry")
    }

    /// Last `lines` journal lines, oldest first. A journal that does not
    /// exist yet reads as empty.
    pub fn tail(&self, lines: usize) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read event log: {}", self.path.display()))?;
        let all: Vec<&str> = contents.lines().collect();
        let start = all.len().saturating_sub(lines);
        Ok(all[start..].iter().map(|line| line.to_string()).collect())
    }

    /// Delete the journal file. Deleting a journal that does not exist is
    /// fine; any other failure is returned for the caller to surface.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to delete event log: {}", self.path.display())),
        }
    }
}
