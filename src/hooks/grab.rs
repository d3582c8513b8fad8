//! Global input hook installation.
//!
//! One hook stays installed for the lifetime of the process; the callback
//! decides per event whether to suppress, so no listener is ever stopped and
//! restarted across lock transitions and stale delivery from a superseded
//! listener cannot occur.

use std::thread;

use crossbeam_channel::Sender;
use log::{error, info};

use super::route_event;
use crate::events::ControlEvent;
use crate::state::AppState;

/// Install the global keyboard/mouse hook on a dedicated thread.
///
/// `rdev::grab` parks the thread for the lifetime of the hook. Installation
/// failure (missing permissions, unsupported session type) leaves the
/// program running degraded: locking still works through the tray and the
/// idle trigger, but input cannot be intercepted.
pub fn spawn_input_hook(state: AppState, tx: Sender<ControlEvent>) {
    thread::Builder::new()
        .name("input-hook".to_string())
        .spawn(move || {
            info!("Installing global input hook");
            if let Err(e) = rdev::grab(move |event| route_event(&state, &tx, event)) {
                error!("Failed to install global input hook: {e:?}");
            }
        })
        .expect("failed to spawn input hook thread");
}
