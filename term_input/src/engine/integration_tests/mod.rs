// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! End to end: bytes written into a pipe come out of an [`InputEngine`] as key events,
//! with the disambiguation timer running on its own thread.
//!
//! [`InputEngine`]: crate::InputEngine

mod test_disambiguation;
mod test_engine_lifecycle;
mod test_fragmented_input;

use crate::{InputConfig, InputEngine, KeyMap};
use rustix::pipe::pipe;
use std::{os::fd::OwnedFd,
          time::{Duration, Instant}};

/// Generous bound for a single pass where data is already waiting.
pub const WAIT: Option<Duration> = Some(Duration::from_millis(500));

/// Engine reading from a fresh pipe, plus the write end standing in for the terminal.
pub fn engine_on_pipe(config: InputConfig) -> (InputEngine, OwnedFd) {
    let (reader, writer) = pipe().unwrap();
    let engine = InputEngine::new(reader, KeyMap::xterm(), config).unwrap();
    (engine, writer)
}

pub fn send(writer: &OwnedFd, bytes: &[u8]) {
    assert_eq!(rustix::io::write(writer, bytes).unwrap(), bytes.len());
}

/// Run short passes until `done` holds or two seconds pass.
pub fn pump_until(engine: &mut InputEngine, mut done: impl FnMut(&InputEngine) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !done(engine) {
        assert!(Instant::now() < deadline, "timed out pumping the engine");
        engine.run_once(Some(Duration::from_millis(50))).unwrap();
    }
}
