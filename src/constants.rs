//! Centralized constants for the Keylatch application
//!
//! This module contains all configurable numerical values used throughout
//! the application. Each constant includes documentation on its purpose,
//! unit, and recommended value range.

// ============================================================================
// DEFAULT SETTINGS
// ============================================================================

/// Default unlock combination when no config exists.
/// Format: `+`-delimited canonical tokens
pub const DEFAULT_UNLOCK_SHORTCUT: &str = "ctrl+alt+p";

/// Default lock hotkey when no config exists.
/// Format: `+`-delimited canonical tokens, exactly one non-modifier key
pub const DEFAULT_LOCK_SHORTCUT: &str = "ctrl+alt+l";

/// Default idle threshold before auto-lock (0 disables the trigger).
/// Unit: minutes
/// Recommended range: 1-30
pub const DEFAULT_INACTIVITY_MINUTES: u64 = 5;

// ============================================================================
// POLLING & THREAD INTERVALS
// ============================================================================

/// Idle monitor poll interval.
/// Unit: seconds
/// Recommended range: 1-10 (balance between responsiveness and CPU usage)
pub const IDLE_POLL_INTERVAL_SECS: u64 = 5;

/// Tray/CLI main loop poll interval for state-change observation.
/// Unit: milliseconds
/// Recommended range: 100-1000 (lower = more responsive, higher = less CPU)
pub const MAIN_POLL_INTERVAL_MS: u64 = 500;

// ============================================================================
// EVENT QUEUE
// ============================================================================

/// Capacity of the bounded control-event queue. Key events block when the
/// queue is full; pointer traffic is dropped instead.
/// Unit: events
/// Recommended range: 64-1024
pub const EVENT_QUEUE_CAPACITY: usize = 256;

// ============================================================================
// EVENT JOURNAL
// ============================================================================

/// Minimum spacing between journal lines for blocked mouse movement.
/// Unit: seconds
/// Recommended range: 1-10 (mouse moves arrive far faster than is readable)
pub const MOUSE_MOVE_LOG_INTERVAL_SECS: u64 = 2;

// ============================================================================
// TRAY & NOTIFICATIONS
// ============================================================================

/// Tray icon edge length.
/// Unit: pixels
/// Range: Fixed, matches common tray raster sizes
pub const TRAY_ICON_SIZE: u32 = 32;

/// Lock/unlock notification display duration.
/// Unit: milliseconds
/// Recommended range: 2000-5000 (long enough to read, short enough to not annoy)
pub const NOTIFICATION_TIMEOUT_MS: u32 = 3000;
