// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Readiness is edge-triggered underneath. A monitor that reads only part of what is
//! available returns [`Continuation::MoreAvailable`] and is triggered again on the next
//! pass without any new data arriving.

use crate::{Continuation, EventLoop, FnMonitor};
use pretty_assertions::assert_eq;
use rustix::{io::{read, write},
             pipe::pipe};
use std::{os::fd::{AsRawFd, OwnedFd},
          time::Duration};

const WAIT: Option<Duration> = Some(Duration::from_millis(500));

/// Reads one byte per trigger and asks to come back until `total` bytes were seen.
fn one_byte_reader(reader: OwnedFd, total: usize) -> FnMonitor<(OwnedFd, Vec<u8>)> {
    FnMonitor::new(
        reader.as_raw_fd(),
        (reader, vec![]),
        move |(reader, seen), _readiness, _control| {
            let mut byte = [0_u8; 1];
            if let Ok(1) = read(&*reader, &mut byte) {
                seen.push(byte[0]);
            }
            if seen.len() < total {
                Continuation::MoreAvailable
            } else {
                Continuation::Continue
            }
        },
    )
}

#[test]
fn test_partial_reads_are_retriggered_until_drained() {
    let (reader, writer) = pipe().unwrap();
    write(&writer, b"abc").unwrap();

    let mut event_loop = EventLoop::new().unwrap();
    let id = event_loop
        .register(Box::new(one_byte_reader(reader, 3)))
        .unwrap();

    for _ in 0..3 {
        assert_eq!(event_loop.run_once(WAIT).unwrap(), 1);
    }

    // Everything consumed and the monitor said Continue: nothing left to report.
    assert_eq!(event_loop.run_once(Some(Duration::from_millis(20))).unwrap(), 0);

    let monitor = event_loop.unregister(id).unwrap();
    assert!(format!("{monitor:?}").contains("[97, 98, 99]"));
}

#[test]
fn test_continue_without_draining_waits_for_new_data() {
    let (reader, writer) = pipe().unwrap();
    write(&writer, b"ab").unwrap();

    let mut event_loop = EventLoop::new().unwrap();
    // Claims to be done after one byte even though a second one is buffered.
    event_loop
        .register(Box::new(one_byte_reader(reader, 1)))
        .unwrap();

    assert_eq!(event_loop.run_once(WAIT).unwrap(), 1);
    assert_eq!(event_loop.run_once(Some(Duration::from_millis(20))).unwrap(), 0);

    // A fresh write is a new edge.
    write(&writer, b"c").unwrap();
    assert_eq!(event_loop.run_once(WAIT).unwrap(), 1);
}
