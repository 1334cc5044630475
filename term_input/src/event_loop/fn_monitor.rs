// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Continuation, LoopControl, Monitor, Readiness};
use mio::Interest;
use std::{fmt::{self, Debug},
          os::fd::RawFd};

type OnReady<C> = Box<dyn FnMut(&mut C, Readiness, &mut LoopControl) -> Continuation>;

/// [`Monitor`] built from a descriptor, a closure and a context value the closure gets
/// mutable access to on every trigger.
///
/// The descriptor is borrowed, not owned: the caller keeps it open for as long as the
/// monitor stays registered.
///
/// ```no_run
/// use miette::IntoDiagnostic;
/// use r3bl_term_input::{Continuation, EventLoop, FnMonitor};
/// use std::os::fd::AsRawFd;
///
/// # fn main() -> miette::Result<()> {
/// let (reader, _writer) = rustix::pipe::pipe().into_diagnostic()?;
/// let mut event_loop = EventLoop::new()?;
/// event_loop.register(Box::new(FnMonitor::new(
///     reader.as_raw_fd(),
///     0_u64,
///     |wakeups, _readiness, _control| {
///         *wakeups += 1;
///         Continuation::Continue
///     },
/// )))?;
/// # Ok(())
/// # }
/// ```
pub struct FnMonitor<C> {
    fd: RawFd,
    interest: Interest,
    context: C,
    on_ready: OnReady<C>,
}

impl<C> FnMonitor<C> {
    pub fn new(
        fd: RawFd,
        context: C,
        on_ready: impl FnMut(&mut C, Readiness, &mut LoopControl) -> Continuation + 'static,
    ) -> Self {
        Self {
            fd,
            interest: Interest::READABLE,
            context,
            on_ready: Box::new(on_ready),
        }
    }

    #[must_use]
    pub fn with_interest(mut self, interest: Interest) -> Self {
        self.interest = interest;
        self
    }

    pub fn context(&self) -> &C { &self.context }

    pub fn context_mut(&mut self) -> &mut C { &mut self.context }
}

impl<C: Debug> Debug for FnMonitor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMonitor")
            .field("fd", &self.fd)
            .field("interest", &self.interest)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<C: Debug> Monitor for FnMonitor<C> {
    fn raw_fd(&self) -> RawFd { self.fd }

    fn interest(&self) -> Interest { self.interest }

    fn trigger(&mut self, readiness: Readiness, control: &mut LoopControl) -> Continuation {
        (self.on_ready)(&mut self.context, readiness, control)
    }

    fn name(&self) -> &'static str { "FnMonitor" }
}
