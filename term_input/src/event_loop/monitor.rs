// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The [`Monitor`] trait and the small value types that flow through it.

use crate::{Continuation, LoopControl};
use bitflags::bitflags;
use mio::{Interest, Token, event::Event};
use std::{fmt::{self, Debug},
          os::fd::RawFd};

/// A pollable event source owned by the [`EventLoop`].
///
/// A monitor wraps exactly one file descriptor. When the OS multiplexer reports that
/// descriptor as ready, the loop calls [`trigger`] with the readiness it observed. The
/// monitor's own fields play the role of the opaque user context: whatever the trigger
/// needs lives on `self`.
///
/// # Contract
///
/// - [`raw_fd`] must stay valid and return the same descriptor for as long as the
///   monitor is registered.
/// - [`trigger`] must not block. Read or drain at most once per call, and return
///   [`Continuation::MoreAvailable`] if the source may hold more data. The loop re-arms
///   readiness for such monitors after the pass.
/// - Registration, removal and stopping go through the [`LoopControl`] handed to
///   [`trigger`]. Removal is deferred until the current pass completes.
///
/// [`EventLoop`]: crate::EventLoop
/// [`raw_fd`]: Monitor::raw_fd
/// [`trigger`]: Monitor::trigger
pub trait Monitor: Debug {
    /// The descriptor to poll.
    fn raw_fd(&self) -> RawFd;

    /// Readiness to wait for. Readable by default.
    fn interest(&self) -> Interest { Interest::READABLE }

    /// Called on the loop thread when [`raw_fd`] is ready.
    ///
    /// [`raw_fd`]: Monitor::raw_fd
    fn trigger(&mut self, readiness: Readiness, control: &mut LoopControl) -> Continuation;

    /// Short name used in log records.
    fn name(&self) -> &'static str { std::any::type_name::<Self>() }
}

/// Identifies a registered [`Monitor`]. Ids are handed out in increasing order, so
/// comparing two ids compares their registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonitorId(usize);

impl MonitorId {
    pub(crate) const fn new(raw: usize) -> Self { Self(raw) }

    pub(crate) const fn to_token(self) -> Token { Token(self.0) }

    pub(crate) const fn from_token(token: Token) -> Self { Self(token.0) }

    #[must_use]
    pub const fn as_usize(self) -> usize { self.0 }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monitor#{}", self.0)
    }
}

bitflags! {
    /// Bitmask of the readiness conditions observed for one descriptor in one wait.
    ///
    /// Several [`mio`] events for the same descriptor are merged into one value before
    /// the monitor is triggered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Readiness: u8 {
        const NONE = 0;
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        const READ_CLOSED = 1 << 2;
        const WRITE_CLOSED = 1 << 3;
        const ERROR = 1 << 4;
    }
}

impl Readiness {
    #[must_use]
    pub fn from_event(event: &Event) -> Self {
        let mut it = Self::empty();
        it.set(Self::READABLE, event.is_readable());
        it.set(Self::WRITABLE, event.is_writable());
        it.set(Self::READ_CLOSED, event.is_read_closed());
        it.set(Self::WRITE_CLOSED, event.is_write_closed());
        it.set(Self::ERROR, event.is_error());
        it
    }

    #[must_use]
    pub const fn is_readable(self) -> bool { self.contains(Self::READABLE) }

    #[must_use]
    pub const fn is_writable(self) -> bool { self.contains(Self::WRITABLE) }

    /// The peer closed its end, or the descriptor reported an error. A read will
    /// return end of input or the error instead of blocking.
    #[must_use]
    pub const fn is_hangup(self) -> bool {
        self.intersects(Self::READ_CLOSED.union(Self::ERROR))
    }
}
