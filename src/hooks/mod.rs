pub mod grab;
pub mod hotkeys;

use crossbeam_channel::Sender;
use rdev::{Event, EventType};

use crate::events::{ControlEvent, KeyInput};
use crate::state::AppState;

/// Decide what to do with one raw input event.
///
/// Returns `Some(event)` to let the event through to the rest of the
/// system, `None` to suppress it. While unlocked everything passes and is
/// posted as activity; while locked everything is suppressed and key/mouse
/// events are forwarded to the control loop for matching and journaling.
///
/// Key events use a blocking send (a dropped release would strand a held
/// token) while pointer traffic is lossy `try_send`.
pub fn route_event(state: &AppState, tx: &Sender<ControlEvent>, event: Event) -> Option<Event> {
    if state.should_exit() {
        // Shutting down: never withhold input.
        return Some(event);
    }

    let locked = state.is_locked();
    match event.event_type {
        EventType::KeyPress(key) => {
            let input = KeyInput {
                key,
                text: event.name.clone(),
            };
            if locked {
                let _ = tx.send(ControlEvent::KeyPress(input));
                None
            } else {
                let _ = tx.try_send(ControlEvent::KeyPress(input));
                Some(event)
            }
        }
        EventType::KeyRelease(key) => {
            let input = KeyInput {
                key,
                text: event.name.clone(),
            };
            if locked {
                let _ = tx.send(ControlEvent::KeyRelease(input));
                None
            } else {
                let _ = tx.try_send(ControlEvent::KeyRelease(input));
                Some(event)
            }
        }
        EventType::ButtonPress(button) => {
            let _ = tx.try_send(ControlEvent::ButtonPress(button));
            if locked {
                None
            } else {
                Some(event)
            }
        }
        EventType::ButtonRelease(_) => {
            if locked {
                None
            } else {
                Some(event)
            }
        }
        EventType::MouseMove { x, y } => {
            let _ = tx.try_send(ControlEvent::MouseMove { x, y });
            if locked {
                None
            } else {
                Some(event)
            }
        }
        EventType::Wheel { .. } => {
            let _ = tx.try_send(ControlEvent::Wheel);
            if locked {
                None
            } else {
                Some(event)
            }
        }
    }
}
