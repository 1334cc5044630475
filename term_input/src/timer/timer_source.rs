// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{DEBUG_TIMER_SOURCE, SharedTimerState, TimerError, TimerHandle, lock_state};
use crate::{Continuation, LoopControl, Monitor, Readiness};
use mio::unix::pipe::Receiver;
use std::{fmt::{self, Debug},
          io::{ErrorKind, Read as _},
          os::fd::{AsRawFd as _, RawFd}};

const DRAIN_CHUNK_SIZE: usize = 256;

/// What a [`TimerSource`] handler receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    /// Expirations coalesced into this call. Always at least `1`.
    pub expirations: u64,
    /// Expirations reported by this source since it was created.
    pub total_expirations: u64,
}

type OnTick = Box<dyn FnMut(TimerTick, &mut LoopControl) -> Continuation>;

/// [`Monitor`] that turns timer expirations into loop triggers.
///
/// ```text
///  worker thread                     loop thread
/// ┌──────────────────┐  1 byte per  ┌──────────────────────────────────────┐
/// │ deadline reached ├──expiration─►│ pipe readable → trigger()            │
/// │ write(gen) only  │    (pipe)    │   drain all bytes, count current gen │
/// └──────────────────┘              │   handler(TimerTick) once            │
///                                   └──────────────────────────────────────┘
/// ```
///
/// The worker never does anything but the single non-blocking write. Expirations that
/// pile up before the loop wakes are coalesced: the handler runs once per trigger with
/// the number of expirations it covers.
///
/// Create one with [`TimerSource::new`], register the source with an [`EventLoop`] and
/// keep the [`TimerHandle`] to arm and disarm it.
///
/// [`EventLoop`]: crate::EventLoop
pub struct TimerSource {
    receiver: Receiver,
    state: SharedTimerState,
    total_expirations: u64,
    handler: OnTick,
}

impl TimerSource {
    /// `name` labels the worker thread and log records.
    ///
    /// # Errors
    ///
    /// [`TimerError::PipeCreation`] if the notification pipe can't be created.
    pub fn new(
        name: impl Into<String>,
        handler: impl FnMut(TimerTick, &mut LoopControl) -> Continuation + 'static,
    ) -> Result<(Self, TimerHandle), TimerError> {
        let (pipe_writer, receiver) =
            mio::unix::pipe::new().map_err(TimerError::PipeCreation)?;
        let state = SharedTimerState::default();

        let source = Self {
            receiver,
            state: SharedTimerState::clone(&state),
            total_expirations: 0,
            handler: Box::new(handler),
        };
        let handle = TimerHandle::new(name.into(), state, pipe_writer);
        Ok((source, handle))
    }

    #[must_use]
    pub fn total_expirations(&self) -> u64 { self.total_expirations }

    /// Drain the pipe. Returns how many bytes were read for each generation.
    fn drain_sentinels(&mut self) -> [u64; 256] {
        let mut scratch = [0_u8; DRAIN_CHUNK_SIZE];
        let mut per_generation = [0_u64; 256];

        loop {
            match self.receiver.read(&mut scratch) {
                Ok(0) => break,
                Ok(count) => {
                    for &byte in &scratch[..count] {
                        per_generation[usize::from(byte)] += 1;
                    }
                }
                Err(error) if error.kind() == ErrorKind::Interrupted => {}
                Err(error) if error.kind() == ErrorKind::WouldBlock => break,
                Err(error) => {
                    tracing::warn!(message = "timer source: drain failed", error = ?error);
                    break;
                }
            }
        }
        per_generation
    }
}

impl Monitor for TimerSource {
    fn raw_fd(&self) -> RawFd { self.receiver.as_raw_fd() }

    fn trigger(&mut self, _readiness: Readiness, control: &mut LoopControl) -> Continuation {
        // The generation is read after the drain. A byte can only be written after the
        // state already holds its generation, so no current byte is counted as stale.
        let per_generation = self.drain_sentinels();
        let expirations = {
            let mut state = lock_state(&self.state);
            let generation = state.generation;
            let matching = per_generation[usize::from(generation)];

            DEBUG_TIMER_SOURCE.then(|| {
                tracing::debug!(
                    message = "timer source: drained",
                    generation,
                    matching,
                    stale = per_generation.iter().sum::<u64>() - matching
                );
            });

            if matching == 0 || !state.armed {
                return Continuation::Continue;
            }
            // One-shot timers disarm themselves once their expiration is observed.
            if state.one_shot {
                state.armed = false;
            }
            matching
        };

        self.total_expirations += expirations;
        (self.handler)(
            TimerTick {
                expirations,
                total_expirations: self.total_expirations,
            },
            control,
        )
    }

    fn name(&self) -> &'static str { "TimerSource" }
}

impl Debug for TimerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerSource")
            .field("fd", &self.receiver.as_raw_fd())
            .field("total_expirations", &self.total_expirations)
            .finish_non_exhaustive()
    }
}
