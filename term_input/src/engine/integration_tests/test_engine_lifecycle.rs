// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{WAIT, engine_on_pipe, send};
use crate::{Continuation, EventLoopError, FnMonitor, InputConfig, InputEngine,
            InputEngineError, KeyCode, KeyEvent, KeyMap, KeyModifiers};
use pretty_assertions::assert_eq;
use rustix::pipe::pipe;
use serial_test::serial;
use std::{cell::RefCell,
          fs::File,
          os::fd::AsRawFd,
          rc::Rc,
          thread,
          time::Duration};

#[test]
#[serial]
fn test_end_of_input_ends_run_and_flushes_prefix() {
    let (mut engine, writer) = engine_on_pipe(InputConfig::default());
    send(&writer, b"hi\x1b");
    drop(writer);

    engine.run().unwrap();

    assert!(engine.is_input_closed());
    assert_eq!(
        engine.drain_events(),
        vec![
            KeyEvent::char('h'),
            KeyEvent::char('i'),
            KeyEvent::press(KeyCode::Escape, KeyModifiers::NONE),
        ]
    );
    let keyboard_id = engine.keyboard_monitor_id();
    assert!(!engine.event_loop_mut().contains(keyboard_id));
}

#[test]
#[serial]
fn test_stop_handle_ends_run_from_another_thread() {
    let (mut engine, _writer) = engine_on_pipe(InputConfig::default());
    let stop_handle = engine.stop_handle();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        stop_handle.stop();
    });
    engine.run().unwrap();
    stopper.join().unwrap();

    assert!(!engine.is_input_closed());
    assert!(!engine.stop_handle().is_stop_requested());
}

#[test]
#[serial]
fn test_application_monitor_fires_after_keyboard() {
    let (mut engine, keyboard_writer) = engine_on_pipe(InputConfig::default());
    let (app_reader, app_writer) = pipe().unwrap();

    let order = Rc::new(RefCell::new(vec![]));
    let order_clone = Rc::clone(&order);
    let decoder = Rc::clone(engine.decoder());
    engine
        .event_loop_mut()
        .register(Box::new(FnMonitor::new(
            app_reader.as_raw_fd(),
            (),
            move |_context, _readiness, _control| {
                // The keyboard already ran this pass, so its bytes are decoded.
                let pending = decoder.borrow().has_unprocessed_input();
                order_clone.borrow_mut().push(pending);
                Continuation::Continue
            },
        )))
        .unwrap();

    send(&app_writer, b"!");
    send(&keyboard_writer, b"k");
    assert_eq!(engine.run_once(WAIT).unwrap(), 2);

    assert_eq!(*order.borrow(), vec![true]);
    assert_eq!(engine.drain_events(), vec![KeyEvent::char('k')]);
}

#[test]
fn test_unpollable_keyboard_descriptor_is_rejected() {
    let path = std::env::temp_dir().join(format!("r3bl_term_input_{}", std::process::id()));
    let file = File::create(&path).unwrap();

    // Regular files can't be waited on for readiness.
    let result = InputEngine::new(file.into(), KeyMap::xterm(), InputConfig::default());
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        result,
        Err(InputEngineError::EventLoop(EventLoopError::InvalidHandle { .. }))
    ));
}
