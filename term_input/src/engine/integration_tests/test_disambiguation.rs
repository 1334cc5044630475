// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A lone `ESC` is either the Escape key or the start of a longer sequence. The engine
//! waits for the configured timeout before deciding.

use super::{WAIT, engine_on_pipe, pump_until, send};
use crate::{InputConfig, KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::time::{Duration, Instant};

fn escape() -> KeyEvent { KeyEvent::press(KeyCode::Escape, KeyModifiers::NONE) }

#[test]
#[serial]
fn test_lone_escape_resolves_after_timeout() {
    let timeout = Duration::from_millis(20);
    let (mut engine, writer) =
        engine_on_pipe(InputConfig::default().with_esc_timeout(timeout));

    let start = Instant::now();
    send(&writer, b"\x1b");
    engine.run_once(WAIT).unwrap();
    assert!(engine.has_pending_prefix());
    assert_eq!(engine.next_event(), None);

    pump_until(&mut engine, |it| !it.has_pending_prefix());
    assert!(start.elapsed() >= timeout);
    assert_eq!(engine.drain_events(), vec![escape()]);
    assert!(engine.drain_discards().is_empty());
}

#[test]
#[serial]
fn test_sequence_completed_before_timeout_is_one_key() {
    let timeout = Duration::from_millis(300);
    let (mut engine, writer) =
        engine_on_pipe(InputConfig::default().with_esc_timeout(timeout));

    send(&writer, b"\x1b");
    engine.run_once(WAIT).unwrap();
    assert!(engine.has_pending_prefix());

    send(&writer, b"[A");
    engine.run_once(WAIT).unwrap();
    assert_eq!(
        engine.drain_events(),
        vec![KeyEvent::press(KeyCode::Up, KeyModifiers::NONE)]
    );

    // The timer was disarmed by the completing read; letting the old deadline pass
    // produces nothing.
    engine.run_once(Some(timeout * 2)).unwrap();
    assert_eq!(engine.drain_events(), vec![]);
    assert!(!engine.has_pending_prefix());
}

#[test]
#[serial]
fn test_escape_then_letter_is_alt() {
    let (mut engine, writer) = engine_on_pipe(InputConfig::default());
    send(&writer, b"\x1bx");
    engine.run_once(WAIT).unwrap();
    assert_eq!(
        engine.drain_events(),
        vec![KeyEvent::press(
            KeyCode::Char('x'),
            KeyModifiers::NONE.with_alt()
        )]
    );
}

#[test]
#[serial]
fn test_cancel_resolves_without_waiting() {
    let (mut engine, writer) =
        engine_on_pipe(InputConfig::default().with_esc_timeout(Duration::from_secs(60)));

    send(&writer, b"\x1b");
    engine.run_once(WAIT).unwrap();
    assert!(engine.has_pending_prefix());

    engine.cancel_pending_resolution();
    assert!(!engine.has_pending_prefix());
    assert_eq!(engine.drain_events(), vec![escape()]);

    // Nothing else is on its way.
    assert_eq!(engine.run_once(Some(Duration::from_millis(50))).unwrap(), 0);
}

#[test]
#[serial]
fn test_partial_csi_resolves_to_alt_bracket() {
    let (mut engine, writer) =
        engine_on_pipe(InputConfig::default().with_esc_timeout(Duration::from_millis(20)));

    send(&writer, b"\x1b[");
    engine.run_once(WAIT).unwrap();
    pump_until(&mut engine, |it| !it.has_pending_prefix());

    assert_eq!(
        engine.drain_events(),
        vec![KeyEvent::press(
            KeyCode::Char('['),
            KeyModifiers::NONE.with_alt()
        )]
    );
}
