// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminals don't promise that one key arrives in one read. Whatever the split, the
//! engine produces the same events as for the unsplit bytes.

use super::{WAIT, engine_on_pipe, send};
use crate::{DecodeDiscard, InputConfig, KeyCode, KeyEvent, KeyModifiers, MouseAction,
            MouseButton, MouseMode, MousePosition, MouseProtocol};
use pretty_assertions::assert_eq;
use serial_test::serial;
use test_case::test_case;

#[test_case(&["\x1b[", "1;5", "A"] ; "three chunks")]
#[test_case(&["\x1b", "[1;5A"] ; "escape alone first")]
#[test_case(&["\x1b[1;5", "A"] ; "final byte alone")]
fn test_chunked_ctrl_up(chunks: &[&str]) {
    let (mut engine, writer) = engine_on_pipe(InputConfig::default());

    for chunk in chunks {
        send(&writer, chunk.as_bytes());
        engine.run_once(WAIT).unwrap();
    }

    assert_eq!(
        engine.drain_events(),
        vec![KeyEvent::press(KeyCode::Up, KeyModifiers::NONE.with_ctrl())]
    );
    assert!(!engine.has_pending_prefix());
}

#[test]
#[serial]
fn test_split_three_byte_utf8() {
    let (mut engine, writer) = engine_on_pipe(InputConfig::default());
    let euro = "€".as_bytes();

    send(&writer, &euro[..1]);
    engine.run_once(WAIT).unwrap();
    assert_eq!(engine.next_event(), None);
    assert!(engine.has_pending_prefix());

    send(&writer, &euro[1..]);
    engine.run_once(WAIT).unwrap();
    assert_eq!(engine.drain_events(), vec![KeyEvent::char('€')]);
}

#[test]
#[serial]
fn test_invalid_byte_is_discarded_and_decoding_continues() {
    let (mut engine, writer) = engine_on_pipe(InputConfig::default());
    send(&writer, &[0xFF, b'a']);
    engine.run_once(WAIT).unwrap();

    assert_eq!(engine.drain_events(), vec![KeyEvent::char('a')]);
    assert_eq!(
        engine.drain_discards(),
        vec![DecodeDiscard::InvalidByte { byte: 0xFF }]
    );
}

#[test]
#[serial]
fn test_split_sgr_mouse_report() {
    let (mut engine, writer) = engine_on_pipe(InputConfig::default());

    send(&writer, b"\x1b[<0;1");
    engine.run_once(WAIT).unwrap();
    send(&writer, b"0;5M");
    engine.run_once(WAIT).unwrap();

    let events = engine.drain_events();
    assert_eq!(events.len(), 1);
    let mouse = events[0].as_mouse().copied().unwrap();
    assert_eq!(mouse.button, MouseButton::Left);
    assert_eq!(mouse.action, MouseAction::Press);
    assert_eq!(mouse.pos, MousePosition { col: 10, row: 5 });
    assert_eq!(mouse.protocol, MouseProtocol::Sgr);
}

#[test]
#[serial]
fn test_mouse_mode_can_be_switched_off_at_runtime() {
    let (mut engine, writer) = engine_on_pipe(InputConfig::default());
    engine.with_decoder_mut(|decoder| decoder.set_mouse_mode(MouseMode::Disabled));

    // X11 report bytes: `ESC [ M` then three bytes offset by 32.
    send(&writer, b"\x1b[M !!");
    engine.run_once(WAIT).unwrap();
    engine.cancel_pending_resolution();

    let events = engine.drain_events();
    assert!(events.iter().all(|it| !it.is_mouse()), "{events:?}");
    assert!(!events.is_empty());
}
