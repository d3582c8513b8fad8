//! Native dialogs via `osascript`.
//!
//! Dialog failures degrade to "user cancelled": a missing `osascript` (or a
//! dismissed dialog) simply aborts the flow that asked for it.

use std::process::Command;

/// Show an alert dialog with a single OK button.
pub fn show_alert(title: &str, message: &str) {
    let script = format!(
        r#"display dialog "{}" with title "{}" buttons {{"OK"}} default button "OK""#,
        escape(message),
        escape(title)
    );

    let _ = Command::new("osascript").arg("-e").arg(&script).output();
}

/// Prompt for a line of text with a pre-filled default. Returns `None` if
/// the user cancels or the dialog is unavailable.
pub fn prompt_text(title: &str, prompt: &str, default: &str) -> Option<String> {
    let script = format!(
        r#"display dialog "{}" with title "{}" default answer "{}" buttons {{"Cancel", "OK"}} default button "OK""#,
        escape(prompt),
        escape(title),
        escape(default)
    );

    let output = Command::new("osascript").arg("-e").arg(&script).output().ok()?;
    if !output.status.success() {
        return None;
    }

    // Parse "button returned:OK, text returned:value" format
    let result = String::from_utf8_lossy(&output.stdout);
    result
        .split("text returned:")
        .nth(1)
        .map(|text| text.trim().to_string())
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
