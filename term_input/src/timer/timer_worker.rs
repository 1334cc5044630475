// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The thread that turns deadlines into sentinel bytes.
//!
//! This is the only code that runs outside the loop thread. On every expiration it
//! performs a single non-blocking write of one byte into the notification pipe and
//! nothing else: it never touches decoder state or calls user code.

use super::DEBUG_TIMER_SOURCE;
use mio::unix::pipe::Sender;
use std::{io::{ErrorKind, Write as _},
          sync::mpsc::{Receiver, RecvTimeoutError},
          time::{Duration, Instant}};

/// Periodic timers never tick faster than this.
pub const MIN_TIMER_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerCommand {
    Arm {
        generation: u8,
        initial_delay: Duration,
        interval: Option<Duration>,
    },
    Disarm,
    Shutdown,
}

#[derive(Debug, Clone, Copy)]
struct Schedule {
    generation: u8,
    deadline: Instant,
    interval: Option<Duration>,
}

impl Schedule {
    fn new(generation: u8, initial_delay: Duration, interval: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            generation,
            deadline: now.checked_add(initial_delay).unwrap_or(now),
            interval: interval.map(|it| it.max(MIN_TIMER_INTERVAL)),
        }
    }

    /// Advance to the next deadline. `None` for a one-shot schedule.
    fn next(self) -> Option<Self> {
        let interval = self.interval?;
        let deadline = self.deadline.checked_add(interval)?;
        Some(Self { deadline, ..self })
    }
}

/// Worker thread body. Returns when told to shut down or when every command sender is
/// gone.
pub(crate) fn run_timer_worker(commands: &Receiver<TimerCommand>, pipe: &Sender) {
    let mut schedule: Option<Schedule> = None;

    loop {
        let command = match schedule {
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some(it) => {
                commands.recv_timeout(it.deadline.saturating_duration_since(Instant::now()))
            }
        };

        match command {
            Ok(TimerCommand::Arm {
                generation,
                initial_delay,
                interval,
            }) => schedule = Some(Schedule::new(generation, initial_delay, interval)),
            Ok(TimerCommand::Disarm) => schedule = None,
            Ok(TimerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if let Some(it) = schedule {
                    write_sentinel(pipe, it.generation);
                    schedule = it.next();
                }
            }
        }
    }

    DEBUG_TIMER_SOURCE.then(|| {
        tracing::debug!(message = "timer worker: exiting");
    });
}

fn write_sentinel(pipe: &Sender, generation: u8) {
    let mut pipe = pipe;
    match pipe.write(&[generation]) {
        Ok(_) => {}
        // A full pipe already holds more undrained ticks than anyone will count.
        Err(error) if error.kind() == ErrorKind::WouldBlock => {}
        Err(error) => {
            DEBUG_TIMER_SOURCE.then(|| {
                tracing::debug!(message = "timer worker: sentinel write failed", error = ?error);
            });
        }
    }
}
