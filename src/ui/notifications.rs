use log::debug;

use crate::constants::NOTIFICATION_TIMEOUT_MS;

/// Show a desktop notification for a lock-state change. Notification
/// failures are diagnostic-only.
pub fn show_lock_state_notification(locked: bool) {
    let (summary, body) = if locked {
        ("Input Locked", "Keyboard and mouse input is now blocked")
    } else {
        ("Input Unlocked", "Keyboard and mouse input is now active")
    };

    let result = notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .timeout(notify_rust::Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
        .show();

    if let Err(e) = result {
        debug!("Failed to show notification: {e}");
    }
}
