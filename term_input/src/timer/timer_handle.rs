// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{DEBUG_TIMER_SOURCE, TimerCommand, TimerError, run_timer_worker};
use mio::unix::pipe::Sender;
use std::{sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc},
          thread::{self, JoinHandle},
          time::Duration};

/// Arming state shared by a [`TimerHandle`] and its [`TimerSource`].
///
/// Every arm or disarm starts a new generation. Sentinel bytes carry the low 8 bits of
/// the generation they were written for, and the source only counts bytes that match
/// the current one.
///
/// [`TimerSource`]: crate::TimerSource
#[derive(Debug, Default)]
pub(crate) struct TimerState {
    pub generation: u8,
    pub armed: bool,
    pub one_shot: bool,
}

pub(crate) type SharedTimerState = Arc<Mutex<TimerState>>;

/// The state holds plain flags, so a panic elsewhere can't leave it inconsistent.
pub(crate) fn lock_state(state: &Mutex<TimerState>) -> MutexGuard<'_, TimerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct WorkerSlot {
    /// Moved into the worker when it is spawned.
    pipe_writer: Option<Sender>,
    commands: Option<mpsc::Sender<TimerCommand>>,
    join_handle: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct TimerHandleInner {
    name: String,
    state: SharedTimerState,
    slot: Mutex<WorkerSlot>,
}

/// Controls a [`TimerSource`]. Cheap to clone and safe to send to other threads.
///
/// The worker thread is spawned on the first [`arm`] and joined when the last clone of
/// the handle is dropped. Calls from several threads are ordered: the last [`arm`] or
/// [`disarm`] to return is the programming the worker runs.
///
/// [`TimerSource`]: crate::TimerSource
/// [`arm`]: TimerHandle::arm
/// [`disarm`]: TimerHandle::disarm
#[derive(Debug, Clone)]
pub struct TimerHandle {
    inner: Arc<TimerHandleInner>,
}

impl TimerHandle {
    pub(crate) fn new(name: String, state: SharedTimerState, pipe_writer: Sender) -> Self {
        Self {
            inner: Arc::new(TimerHandleInner {
                name,
                state,
                slot: Mutex::new(WorkerSlot {
                    pipe_writer: Some(pipe_writer),
                    commands: None,
                    join_handle: None,
                }),
            }),
        }
    }

    /// Program the timer to first expire after `initial_delay`, then every `interval`.
    /// With no interval the timer expires once and disarms itself. Replaces any
    /// previous programming; expirations of the old programming that the loop has not
    /// seen yet are discarded.
    ///
    /// # Errors
    ///
    /// [`TimerError::ThreadSpawn`] if the worker thread can't be started, or
    /// [`TimerError::WorkerGone`] if it is no longer running. The timer is left
    /// disarmed in both cases.
    pub fn arm(
        &self,
        initial_delay: Duration,
        interval: Option<Duration>,
    ) -> Result<(), TimerError> {
        // Commands reach the worker in generation order: the slot stays locked from
        // the bump until the send.
        let mut slot = self.lock_slot();
        if slot.commands.is_none() {
            self.spawn_worker(&mut slot)?;
        }

        let generation = {
            let mut state = lock_state(&self.inner.state);
            state.generation = state.generation.wrapping_add(1);
            state.armed = true;
            state.one_shot = interval.is_none();
            state.generation
        };

        DEBUG_TIMER_SOURCE.then(|| {
            tracing::debug!(
                message = "timer: arm",
                timer = %self.inner.name,
                generation,
                initial_delay = ?initial_delay,
                interval = ?interval
            );
        });

        let sent = slot.commands.as_ref().is_some_and(|commands| {
            commands
                .send(TimerCommand::Arm {
                    generation,
                    initial_delay,
                    interval,
                })
                .is_ok()
        });
        if sent {
            Ok(())
        } else {
            self.disarm_locked(&slot);
            Err(TimerError::WorkerGone)
        }
    }

    /// Shorthand for a one-shot [`arm`](Self::arm).
    ///
    /// # Errors
    ///
    /// See [`arm`](Self::arm).
    pub fn arm_once(&self, delay: Duration) -> Result<(), TimerError> {
        self.arm(delay, None)
    }

    /// Cancel the timer. Takes effect immediately: sentinel bytes already in flight
    /// are drained but not reported.
    pub fn disarm(&self) {
        let slot = self.lock_slot();
        self.disarm_locked(&slot);
    }

    #[must_use]
    pub fn is_armed(&self) -> bool { lock_state(&self.inner.state).armed }

    fn lock_slot(&self) -> MutexGuard<'_, WorkerSlot> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller holds the slot lock, so the `Disarm` can't overtake a newer `Arm`.
    fn disarm_locked(&self, slot: &WorkerSlot) {
        {
            let mut state = lock_state(&self.inner.state);
            if !state.armed {
                return;
            }
            state.generation = state.generation.wrapping_add(1);
            state.armed = false;
        }

        DEBUG_TIMER_SOURCE.then(|| {
            tracing::debug!(message = "timer: disarm", timer = %self.inner.name);
        });

        // A worker that never started has nothing to cancel.
        if let Some(commands) = slot.commands.as_ref() {
            let _unused = commands.send(TimerCommand::Disarm);
        }
    }

    fn spawn_worker(&self, slot: &mut WorkerSlot) -> Result<(), TimerError> {
        let pipe_writer = slot.pipe_writer.take().ok_or(TimerError::WorkerGone)?;
        let (tx, rx) = mpsc::channel();

        let join_handle = thread::Builder::new()
            .name(format!("timer-{}", self.inner.name))
            .spawn(move || run_timer_worker(&rx, &pipe_writer))
            .map_err(TimerError::ThreadSpawn)?;

        tracing::debug!(message = "timer: worker spawned", timer = %self.inner.name);
        slot.commands = Some(tx);
        slot.join_handle = Some(join_handle);
        Ok(())
    }
}

impl Drop for TimerHandleInner {
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(commands) = slot.commands.take() {
            let _unused = commands.send(TimerCommand::Shutdown);
        }
        if let Some(join_handle) = slot.join_handle.take()
            && join_handle.join().is_err()
        {
            tracing::warn!(message = "timer: worker panicked", timer = %self.name);
        }
    }
}
