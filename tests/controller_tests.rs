use std::thread;
use std::time::Duration;

use keylatch::config::Settings;
use keylatch::controller::Controller;
use keylatch::events::{ControlEvent, KeyInput};
use keylatch::journal::EventLog;
use keylatch::state::AppState;
use rdev::Key;
use tempfile::TempDir;

struct Rig {
    controller: Controller,
    state: AppState,
    journal: EventLog,
    _dir: TempDir,
}

fn rig() -> Rig {
    rig_with_settings(Settings::default())
}

fn rig_with_settings(settings: Settings) -> Rig {
    let dir = tempfile::tempdir().expect("temp dir");
    let journal = EventLog::new(dir.path().join("events.log"));
    let state = AppState::new(settings);
    let controller = Controller::new(state.clone(), journal.clone());
    Rig {
        controller,
        state,
        journal,
        _dir: dir,
    }
}

fn press(key: Key) -> ControlEvent {
    ControlEvent::KeyPress(KeyInput::named(key))
}

fn release(key: Key) -> ControlEvent {
    ControlEvent::KeyRelease(KeyInput::named(key))
}

fn journal_lines(journal: &EventLog) -> Vec<String> {
    journal.tail(1000).expect("tail")
}

#[test]
fn hotkey_locks_and_relocking_is_a_noop() {
    let mut rig = rig();

    rig.controller.handle_event(ControlEvent::HotkeyFired);
    assert!(rig.state.is_locked());
    assert_eq!(journal_lines(&rig.journal).len(), 1);

    // Locking while locked changes nothing observable.
    rig.controller.handle_event(ControlEvent::HotkeyFired);
    rig.controller.handle_event(ControlEvent::IdleTimeout);
    assert!(rig.state.is_locked());
    assert_eq!(journal_lines(&rig.journal).len(), 1);
    assert!(journal_lines(&rig.journal)[0].ends_with(" - Input locked"));
}

#[test]
fn idle_timeout_locks() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::IdleTimeout);
    assert!(rig.state.is_locked());
}

#[test]
fn unlock_combo_releases_in_any_modifier_order() {
    let orders = [
        [Key::ControlLeft, Key::Alt, Key::KeyP],
        [Key::Alt, Key::ControlLeft, Key::KeyP],
        [Key::KeyP, Key::Alt, Key::ControlLeft],
    ];

    for order in orders {
        let mut rig = rig(); // default unlock combo is ctrl+alt+p
        rig.controller.handle_event(ControlEvent::HotkeyFired);
        assert!(rig.state.is_locked());

        for key in order {
            rig.controller.handle_event(press(key));
        }
        assert!(!rig.state.is_locked(), "order {order:?} must unlock");
    }
}

#[test]
fn extra_held_keys_do_not_block_unlocking() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);

    rig.controller.handle_event(press(Key::ShiftLeft)); // incidental
    rig.controller.handle_event(press(Key::ControlLeft));
    rig.controller.handle_event(press(Key::Alt));
    rig.controller.handle_event(press(Key::KeyP));

    assert!(!rig.state.is_locked());
}

#[test]
fn releasing_a_combo_key_before_completion_prevents_unlock() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);

    rig.controller.handle_event(press(Key::ControlLeft));
    rig.controller.handle_event(press(Key::Alt));
    rig.controller.handle_event(release(Key::ControlLeft));
    rig.controller.handle_event(press(Key::KeyP));

    assert!(rig.state.is_locked(), "ctrl was released before p");
}

#[test]
fn after_unlock_further_input_is_harmless() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);
    for key in [Key::ControlLeft, Key::Alt, Key::KeyP] {
        rig.controller.handle_event(press(key));
    }
    assert!(!rig.state.is_locked());

    // Releasing combo keys and typing more must not re-lock or disturb
    // anything.
    rig.controller.handle_event(release(Key::ControlLeft));
    rig.controller.handle_event(press(Key::KeyX));
    rig.controller.handle_event(release(Key::KeyX));
    assert!(!rig.state.is_locked());

    let lines = journal_lines(&rig.journal);
    assert_eq!(
        lines
            .iter()
            .filter(|line| line.ends_with(" - Input unlocked"))
            .count(),
        1
    );
}

#[test]
fn held_keys_are_cleared_on_each_lock_entry() {
    let mut rig = rig();

    // First locked period: hold ctrl+alt, then unlock with p.
    rig.controller.handle_event(ControlEvent::HotkeyFired);
    rig.controller.handle_event(press(Key::ControlLeft));
    rig.controller.handle_event(press(Key::Alt));
    rig.controller.handle_event(press(Key::KeyP));
    assert!(!rig.state.is_locked());

    // Second locked period starts from an empty held set: p alone is not
    // enough even though ctrl+alt were never released as events.
    rig.controller.handle_event(ControlEvent::HotkeyFired);
    rig.controller.handle_event(press(Key::KeyP));
    assert!(rig.state.is_locked());
}

#[test]
fn every_blocked_press_is_journaled_even_without_a_token() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);

    rig.controller.handle_event(press(Key::Function)); // no canonical token
    rig.controller.handle_event(press(Key::KeyA));

    let lines = journal_lines(&rig.journal);
    assert!(lines.iter().any(|l| l.ends_with(" - Blocked keyboard input: function")));
    assert!(lines.iter().any(|l| l.ends_with(" - Blocked keyboard input: 'a'")));
    assert!(rig.state.is_locked());
}

#[test]
fn unlocked_input_is_not_journaled() {
    let mut rig = rig();
    rig.controller.handle_event(press(Key::KeyA));
    rig.controller.handle_event(ControlEvent::MouseMove { x: 10.0, y: 10.0 });
    assert!(journal_lines(&rig.journal).is_empty());
}

#[test]
fn blocked_mouse_moves_are_throttled() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);

    for i in 0..20 {
        rig.controller.handle_event(ControlEvent::MouseMove {
            x: f64::from(i),
            y: 0.0,
        });
    }

    let move_lines = journal_lines(&rig.journal)
        .into_iter()
        .filter(|line| line.contains("Blocked mouse move"))
        .count();
    assert_eq!(move_lines, 1, "rapid moves collapse to one line");
}

#[test]
fn blocked_clicks_carry_the_last_pointer_position() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);

    rig.controller.handle_event(ControlEvent::MouseMove { x: 312.0, y: 540.0 });
    rig.controller.handle_event(ControlEvent::ButtonPress(rdev::Button::Left));

    let lines = journal_lines(&rig.journal);
    assert!(lines
        .iter()
        .any(|l| l.ends_with(" - Blocked mouse click: left at (312, 540)")));
}

#[test]
fn locked_input_does_not_reset_the_idle_clock() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);

    thread::sleep(Duration::from_millis(30));
    let before = rig.state.idle_elapsed();

    rig.controller.handle_event(press(Key::KeyA));
    rig.controller.handle_event(ControlEvent::MouseMove { x: 1.0, y: 1.0 });

    let after = rig.state.idle_elapsed();
    assert!(
        after >= before,
        "intercepted input must not count as activity"
    );
}

#[test]
fn unlocked_input_resets_the_idle_clock() {
    let mut rig = rig();
    thread::sleep(Duration::from_millis(30));
    let before = rig.state.idle_elapsed();

    rig.controller.handle_event(press(Key::KeyA));

    assert!(rig.state.idle_elapsed() < before);
}

#[test]
fn unlock_resets_the_idle_clock() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);
    thread::sleep(Duration::from_millis(30));

    for key in [Key::ControlLeft, Key::Alt, Key::KeyP] {
        rig.controller.handle_event(press(key));
    }
    assert!(!rig.state.is_locked());
    assert!(rig.state.idle_elapsed() < Duration::from_millis(25));
}

#[test]
fn custom_unlock_combo_is_snapshotted_at_lock_entry() {
    let mut settings = Settings::default();
    settings.unlock_shortcut = "ctrl+shift+u".to_string();
    let mut rig = rig_with_settings(settings);

    rig.controller.handle_event(ControlEvent::HotkeyFired);
    for key in [Key::ControlLeft, Key::Alt, Key::KeyP] {
        rig.controller.handle_event(press(key));
    }
    assert!(rig.state.is_locked(), "default combo must not unlock");

    for key in [Key::ShiftLeft, Key::KeyU] {
        rig.controller.handle_event(press(key));
    }
    // ctrl still held from above; ctrl+shift+u now complete.
    assert!(!rig.state.is_locked());
}

#[test]
fn journal_lines_are_timestamped() {
    let mut rig = rig();
    rig.controller.handle_event(ControlEvent::HotkeyFired);

    let lines = journal_lines(&rig.journal);
    let (stamp, message) = lines[0].split_once(" - ").expect("separator");
    assert_eq!(stamp.len(), "2026-01-01 00:00:00".len());
    assert_eq!(message, "Input locked");
}

#[test]
fn control_loop_drains_the_queue_until_disconnect() {
    let dir = tempfile::tempdir().expect("temp dir");
    let journal = EventLog::new(dir.path().join("events.log"));
    let state = AppState::new(Settings::default());
    let mut controller = Controller::new(state.clone(), journal);

    let (tx, rx) = crossbeam_channel::bounded::<ControlEvent>(16);
    let handle = thread::spawn(move || controller.run(rx));

    tx.send(ControlEvent::HotkeyFired).expect("send");
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while !state.is_locked() && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(state.is_locked(), "control loop should have processed the event");

    drop(tx); // disconnect ends the loop
    handle.join().expect("control loop thread");
}
