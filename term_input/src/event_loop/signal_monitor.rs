// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGWINCH SIGTSTP sigaction

//! Signals delivered to the loop thread through a self-pipe.
//!
//! A signal handler runs in a restricted context where almost nothing is safe. The
//! handlers installed here do two things only, both async-signal-safe:
//!
//! 1. Set an [`AtomicBool`] flag for the signal ([`signal_hook::flag::register`]).
//! 2. Write one byte into a private non-blocking pipe
//!    ([`signal_hook::low_level::pipe::register_raw`]).
//!
//! The read end of the pipe is the [`SignalMonitor`]'s descriptor. Everything else
//! (finding out which signals arrived, calling the application's handler) happens on
//! the loop thread when the pipe becomes readable.

use crate::{Continuation, EventLoopError, LoopControl, Monitor, Readiness};
use mio::unix::pipe::{Receiver, Sender};
use signal_hook::SigId;
use smallvec::SmallVec;
use std::{ffi::c_int,
          fmt::{self, Debug},
          io::{self, ErrorKind, Read as _},
          os::fd::{AsRawFd as _, RawFd},
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}}};

/// Signals that arrived since the last trigger, in the order they were registered.
pub type PendingSignals = SmallVec<[c_int; 4]>;

type OnSignals = Box<dyn FnMut(&[c_int], &mut LoopControl) -> Continuation>;

const DRAIN_CHUNK_SIZE: usize = 64;

/// [`Monitor`] that reports POSIX signals such as `SIGWINCH` on the loop thread.
///
/// Any number of deliveries between two wakeups coalesce into one handler call listing
/// each signal once. Dropping the monitor removes its signal handlers.
pub struct SignalMonitor {
    receiver: Receiver,
    sender: Sender,
    flags: Vec<(c_int, Arc<AtomicBool>)>,
    sig_ids: Vec<SigId>,
    handler: OnSignals,
}

impl SignalMonitor {
    /// Install handlers for `signals`.
    ///
    /// # Errors
    ///
    /// [`EventLoopError::SignalRegistration`] if the pipe can't be created or a signal
    /// can't be handled (one of [`FORBIDDEN`], such as `SIGKILL`). Handlers installed
    /// before the failure are removed again.
    ///
    /// [`FORBIDDEN`]: signal_hook::consts::FORBIDDEN
    pub fn new(
        signals: &[c_int],
        handler: impl FnMut(&[c_int], &mut LoopControl) -> Continuation + 'static,
    ) -> Result<Self, EventLoopError> {
        let (sender, receiver) =
            mio::unix::pipe::new().map_err(EventLoopError::SignalRegistration)?;

        // Built before registering so that an early return drops it and runs the
        // cleanup in `Drop`.
        let mut it = Self {
            receiver,
            sender,
            flags: Vec::with_capacity(signals.len()),
            sig_ids: Vec::with_capacity(signals.len() * 2),
            handler: Box::new(handler),
        };

        for &signal in signals {
            if signal_hook::consts::FORBIDDEN.contains(&signal) {
                return Err(EventLoopError::SignalRegistration(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("signal {signal} can't be handled"),
                )));
            }
            let flag = Arc::new(AtomicBool::new(false));
            // Flag first: handlers run in registration order, so the flag is set before
            // the byte that wakes the loop is written.
            it.sig_ids.push(
                signal_hook::flag::register(signal, Arc::clone(&flag))
                    .map_err(EventLoopError::SignalRegistration)?,
            );
            it.sig_ids.push(
                signal_hook::low_level::pipe::register_raw(signal, it.sender.as_raw_fd())
                    .map_err(EventLoopError::SignalRegistration)?,
            );
            it.flags.push((signal, flag));
        }

        tracing::debug!(message = "signal monitor: installed", signals = ?signals);
        Ok(it)
    }

    fn drain_pipe(&mut self) {
        let mut scratch = [0_u8; DRAIN_CHUNK_SIZE];
        loop {
            match self.receiver.read(&mut scratch) {
                Ok(0) => break,
                Ok(_) => {}
                Err(error) if error.kind() == ErrorKind::Interrupted => {}
                Err(error) if error.kind() == ErrorKind::WouldBlock => break,
                Err(error) => {
                    tracing::warn!(message = "signal monitor: drain failed", error = ?error);
                    break;
                }
            }
        }
    }

    fn take_pending(&self) -> PendingSignals {
        self.flags
            .iter()
            .filter(|(_, flag)| flag.swap(false, Ordering::AcqRel))
            .map(|(signal, _)| *signal)
            .collect()
    }
}

impl Monitor for SignalMonitor {
    fn raw_fd(&self) -> RawFd { self.receiver.as_raw_fd() }

    fn trigger(&mut self, _readiness: Readiness, control: &mut LoopControl) -> Continuation {
        self.drain_pipe();
        let pending = self.take_pending();
        if pending.is_empty() {
            return Continuation::Continue;
        }
        tracing::debug!(message = "signal monitor: delivering", signals = ?pending);
        (self.handler)(&pending, control)
    }

    fn name(&self) -> &'static str { "SignalMonitor" }
}

impl Drop for SignalMonitor {
    fn drop(&mut self) {
        // Unregister before the pipe's write end closes.
        for id in self.sig_ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}

impl Debug for SignalMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signals: Vec<c_int> = self.flags.iter().map(|(signal, _)| *signal).collect();
        f.debug_struct("SignalMonitor")
            .field("fd", &self.receiver.as_raw_fd())
            .field("signals", &signals)
            .finish_non_exhaustive()
    }
}
