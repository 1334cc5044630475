// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::MonitorId;
use miette::Diagnostic;
use std::{io, os::fd::RawFd};

/// Errors reported by [`EventLoop`] and its monitors.
///
/// Only [`EventLoopFault`] comes out of [`EventLoop::run`]; the rest are returned by
/// setup and registration calls. Interrupted waits (`EINTR`) are retried and never
/// show up here.
///
/// [`EventLoop::run`]: crate::EventLoop::run
/// [`EventLoop`]: crate::EventLoop
/// [`EventLoopFault`]: EventLoopError::EventLoopFault
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum EventLoopError {
    #[error("File descriptor {fd} is already registered as {existing}")]
    #[diagnostic(
        code(r3bl_term_input::event_loop::duplicate_handle),
        help("Unregister the existing monitor first, or dup() the descriptor")
    )]
    DuplicateHandle { fd: RawFd, existing: MonitorId },

    #[error("File descriptor {fd} can't be polled")]
    #[diagnostic(
        code(r3bl_term_input::event_loop::invalid_handle),
        help("The descriptor must be open and refer to a pipe, socket or tty")
    )]
    InvalidHandle {
        fd: RawFd,
        #[source]
        source: io::Error,
    },

    #[error("No monitor is registered as {id}")]
    #[diagnostic(code(r3bl_term_input::event_loop::unknown_monitor))]
    UnknownMonitor { id: MonitorId },

    #[error("Failed to create the OS readiness multiplexer")]
    #[diagnostic(
        code(r3bl_term_input::event_loop::poll_creation),
        help("The process may have run out of file descriptors")
    )]
    PollCreation(#[source] io::Error),

    #[error("Failed to create the loop waker")]
    #[diagnostic(code(r3bl_term_input::event_loop::waker_creation))]
    WakerCreation(#[source] io::Error),

    #[error("Readiness wait failed")]
    #[diagnostic(
        code(r3bl_term_input::event_loop::fault),
        help("The multiplexer is unusable; create a new EventLoop")
    )]
    EventLoopFault {
        #[source]
        source: io::Error,
    },

    #[error("Failed to install the signal hand-off")]
    #[diagnostic(code(r3bl_term_input::event_loop::signal_registration))]
    SignalRegistration(#[source] io::Error),
}
