// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR epoll

//! The readiness reactor. See [`EventLoop`].

use crate::{Continuation, EventLoopError, LoopControl, LoopStopHandle, Monitor,
            MonitorId, Readiness};
use mio::{Events, Interest, Poll, Token, Waker, unix::SourceFd};
use std::{collections::{BTreeMap, HashMap},
          io::ErrorKind,
          os::fd::RawFd,
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}},
          time::{Duration, Instant}};

/// Verbose dispatch logging.
pub const DEBUG_EVENT_LOOP: bool = false;

/// Capacity for the [`mio::Events`] buffer. A wait that reports more events than this
/// leaves the rest for the next wait.
const EVENTS_CAPACITY: usize = 64;

/// Token for the [`Waker`] used by [`LoopStopHandle`]. Monitor ids count up from `0` and
/// never reach it.
const WAKER_TOKEN: Token = Token(usize::MAX);

#[derive(Debug)]
struct Registration {
    monitor: Box<dyn Monitor>,
    fd: RawFd,
    interest: Interest,
    enabled: bool,
}

/// Single-threaded, readiness-driven dispatcher over a set of [`Monitor`]s.
///
/// Blocks on [`mio::Poll`] until at least one registered, enabled monitor is ready, then
/// triggers every ready monitor once.
///
/// # Dispatch order
///
/// Within one pass, monitors are triggered in ascending registration order
/// ([`MonitorId`] order). There is no other priority scheme. Each monitor is triggered
/// at most once per pass, with all the readiness the wait reported for it merged into
/// one [`Readiness`].
///
/// # Mutation during a pass
///
/// Triggers receive a [`LoopControl`]. Removals requested through it are deferred until
/// the pass completes: a monitor that removes itself (or a later one) does not disturb
/// the monitors that are still due in the pass. A monitor queued for removal is not
/// triggered again.
///
/// # EINTR handling
///
/// A wait interrupted by a signal is retried with whatever is left of the timeout. Any
/// other wait error is an [`EventLoopError::EventLoopFault`].
///
/// # Edge triggering
///
/// [`mio`] uses edge-triggered epoll on Linux. A monitor that reads a bounded amount
/// and may have left data behind returns [`Continuation::MoreAvailable`]; the loop then
/// re-registers it after the pass so the next wait reports it again.
#[derive(Debug)]
pub struct EventLoop {
    poll: Poll,
    events: Events,
    registry: BTreeMap<MonitorId, Registration>,
    fds: HashMap<RawFd, MonitorId>,
    next_id: usize,
    control: LoopControl,
    stop_flag: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl EventLoop {
    /// # Errors
    ///
    /// [`EventLoopError::PollCreation`] or [`EventLoopError::WakerCreation`] if the OS
    /// refuses to hand out the descriptors.
    pub fn new() -> Result<Self, EventLoopError> {
        let poll = Poll::new().map_err(EventLoopError::PollCreation)?;
        let waker = Waker::new(poll.registry(), WAKER_TOKEN)
            .map_err(EventLoopError::WakerCreation)?;
        let stop_flag = Arc::new(AtomicBool::new(false));

        Ok(Self {
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
            registry: BTreeMap::new(),
            fds: HashMap::new(),
            next_id: 0,
            control: LoopControl::new(Arc::clone(&stop_flag)),
            stop_flag,
            waker: Arc::new(waker),
        })
    }

    /// Take ownership of `monitor` and start polling its descriptor.
    ///
    /// # Errors
    ///
    /// - [`EventLoopError::DuplicateHandle`] if another monitor already polls the same
    ///   descriptor. This includes a monitor whose removal is still pending in the
    ///   current pass.
    /// - [`EventLoopError::InvalidHandle`] if the descriptor is negative or the OS
    ///   refuses to poll it (closed descriptor, regular file).
    pub fn register(&mut self, monitor: Box<dyn Monitor>) -> Result<MonitorId, EventLoopError> {
        let fd = monitor.raw_fd();
        if fd < 0 {
            return Err(EventLoopError::InvalidHandle {
                fd,
                source: ErrorKind::InvalidInput.into(),
            });
        }
        if let Some(&existing) = self.fds.get(&fd) {
            return Err(EventLoopError::DuplicateHandle { fd, existing });
        }

        let id = MonitorId::new(self.next_id);
        let interest = monitor.interest();
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), id.to_token(), interest)
            .map_err(|source| EventLoopError::InvalidHandle { fd, source })?;
        self.next_id += 1;

        tracing::debug!(
            message = "event_loop: registered monitor",
            id = %id,
            fd,
            monitor = monitor.name(),
            interest = ?interest
        );

        self.fds.insert(fd, id);
        self.registry.insert(
            id,
            Registration {
                monitor,
                fd,
                interest,
                enabled: true,
            },
        );
        Ok(id)
    }

    /// Remove a monitor immediately and hand it back. Use [`LoopControl::unregister`]
    /// from inside a trigger instead; it defers removal to the end of the pass.
    ///
    /// # Errors
    ///
    /// [`EventLoopError::UnknownMonitor`] if `id` is not registered.
    pub fn unregister(&mut self, id: MonitorId) -> Result<Box<dyn Monitor>, EventLoopError> {
        let registration = self
            .registry
            .remove(&id)
            .ok_or(EventLoopError::UnknownMonitor { id })?;
        self.fds.remove(&registration.fd);

        if registration.enabled {
            // The descriptor may already be closed, in which case the kernel dropped it
            // from the interest list on its own.
            if let Err(error) = self.poll.registry().deregister(&mut SourceFd(&registration.fd)) {
                DEBUG_EVENT_LOOP.then(|| {
                    tracing::debug!(
                        message = "event_loop: deregister failed",
                        id = %id,
                        error = ?error
                    );
                });
            }
        }

        tracing::debug!(
            message = "event_loop: unregistered monitor",
            id = %id,
            monitor = registration.monitor.name()
        );
        Ok(registration.monitor)
    }

    /// Pause or resume dispatch for a monitor without giving up its registration. A
    /// disabled monitor's descriptor is removed from the multiplexer, so its readiness
    /// does not wake the loop. Re-enabling re-arms readiness.
    ///
    /// # Errors
    ///
    /// - [`EventLoopError::UnknownMonitor`] if `id` is not registered.
    /// - [`EventLoopError::InvalidHandle`] if re-enabling fails because the descriptor
    ///   was closed while the monitor was disabled.
    pub fn set_enabled(&mut self, id: MonitorId, enabled: bool) -> Result<(), EventLoopError> {
        let registration = self
            .registry
            .get_mut(&id)
            .ok_or(EventLoopError::UnknownMonitor { id })?;
        if registration.enabled == enabled {
            return Ok(());
        }

        let fd = registration.fd;
        let source_registry = self.poll.registry();
        let result = if enabled {
            source_registry.register(&mut SourceFd(&fd), id.to_token(), registration.interest)
        } else {
            source_registry.deregister(&mut SourceFd(&fd))
        };
        result.map_err(|source| EventLoopError::InvalidHandle { fd, source })?;
        registration.enabled = enabled;

        DEBUG_EVENT_LOOP.then(|| {
            tracing::debug!(message = "event_loop: set enabled", id = %id, enabled);
        });
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, id: MonitorId) -> bool { self.registry.contains_key(&id) }

    /// `None` if `id` is not registered.
    #[must_use]
    pub fn is_enabled(&self, id: MonitorId) -> Option<bool> {
        self.registry.get(&id).map(|it| it.enabled)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.registry.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.registry.is_empty() }

    /// Request that [`run`] return after the current pass. Same as
    /// [`LoopControl::stop`], for callers that hold the loop itself.
    ///
    /// [`run`]: Self::run
    pub fn stop(&self) { self.stop_flag.store(true, Ordering::Release); }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool { self.stop_flag.load(Ordering::Acquire) }

    /// Clear the stop flag, returning whether it was set. For owners that drive
    /// [`run_once`] in their own loop.
    ///
    /// [`run_once`]: Self::run_once
    pub fn take_stop_request(&self) -> bool { self.stop_flag.swap(false, Ordering::AcqRel) }

    /// A handle that can stop this loop from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> LoopStopHandle {
        LoopStopHandle::new(Arc::clone(&self.stop_flag), Arc::clone(&self.waker))
    }

    /// Wait for readiness (at most `timeout`, forever if `None`), then trigger every
    /// ready monitor once in registration order.
    ///
    /// Returns the number of triggers invoked, which is `0` when the wait timed out or
    /// was woken by a [`LoopStopHandle`].
    ///
    /// # Errors
    ///
    /// [`EventLoopError::EventLoopFault`] if the wait fails for any reason other than
    /// an interrupting signal.
    pub fn run_once(&mut self, timeout: Option<Duration>) -> Result<usize, EventLoopError> {
        self.wait(timeout)?;

        let ready = self.collect_ready();
        let mut dispatched = 0;
        let mut rearm = Vec::new();

        for (id, readiness) in ready {
            if self.control.is_removal_pending(id) {
                continue;
            }
            let Some(registration) = self.registry.get_mut(&id) else {
                continue;
            };
            if !registration.enabled {
                continue;
            }

            DEBUG_EVENT_LOOP.then(|| {
                tracing::trace!(
                    message = "event_loop: trigger",
                    id = %id,
                    monitor = registration.monitor.name(),
                    readiness = ?readiness
                );
            });

            self.control.set_current(Some(id));
            let continuation = registration.monitor.trigger(readiness, &mut self.control);
            self.control.set_current(None);
            dispatched += 1;

            match continuation {
                Continuation::Continue => {}
                Continuation::Stop => self.control.stop(),
                Continuation::MoreAvailable => rearm.push(id),
            }
        }

        for id in rearm {
            self.rearm(id);
        }
        self.apply_pending_removals();

        Ok(dispatched)
    }

    /// Call [`run_once`] until a stop is requested or no monitors remain. The stop
    /// flag is checked before every wait and cleared when this returns, so the loop
    /// can be run again.
    ///
    /// # Errors
    ///
    /// The first [`EventLoopError::EventLoopFault`]; the loop does not retry it.
    ///
    /// [`run_once`]: Self::run_once
    pub fn run(&mut self) -> Result<(), EventLoopError> {
        let result = loop {
            if self.is_stop_requested() {
                DEBUG_EVENT_LOOP.then(|| {
                    tracing::debug!(message = "event_loop: stop requested");
                });
                break Ok(());
            }
            if self.registry.is_empty() {
                tracing::debug!(message = "event_loop: no monitors left, exiting run");
                break Ok(());
            }
            if let Err(error) = self.run_once(None) {
                break Err(error);
            }
        };
        self.stop_flag.store(false, Ordering::Release);
        result
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Result<(), EventLoopError> {
        // `None` after an overflowing add behaves like an unbounded wait.
        let deadline = timeout.and_then(|it| Instant::now().checked_add(it));

        loop {
            let remaining = deadline.map(|it| it.saturating_duration_since(Instant::now()));
            match self.poll.poll(&mut self.events, remaining) {
                Ok(()) => return Ok(()),
                Err(error) if error.kind() == ErrorKind::Interrupted => {
                    DEBUG_EVENT_LOOP.then(|| {
                        tracing::debug!(message = "event_loop: wait interrupted, retrying");
                    });
                }
                Err(source) => {
                    tracing::error!(message = "event_loop: wait failed", error = ?source);
                    return Err(EventLoopError::EventLoopFault { source });
                }
            }
        }
    }

    /// Merge the events of the last wait per monitor, in registration order.
    fn collect_ready(&self) -> Vec<(MonitorId, Readiness)> {
        let mut merged = BTreeMap::<MonitorId, Readiness>::new();
        for event in &self.events {
            if event.token() == WAKER_TOKEN {
                DEBUG_EVENT_LOOP.then(|| {
                    tracing::debug!(message = "event_loop: woken by stop handle");
                });
                continue;
            }
            *merged.entry(MonitorId::from_token(event.token())).or_default() |=
                Readiness::from_event(event);
        }
        merged.into_iter().collect()
    }

    fn rearm(&self, id: MonitorId) {
        if self.control.is_removal_pending(id) {
            return;
        }
        let Some(registration) = self.registry.get(&id) else {
            return;
        };
        if !registration.enabled {
            return;
        }
        if let Err(error) = self.poll.registry().reregister(
            &mut SourceFd(&registration.fd),
            id.to_token(),
            registration.interest,
        ) {
            tracing::warn!(
                message = "event_loop: failed to re-arm monitor",
                id = %id,
                monitor = registration.monitor.name(),
                error = ?error
            );
        }
    }

    fn apply_pending_removals(&mut self) {
        for id in self.control.take_pending_removals() {
            if let Err(error) = self.unregister(id) {
                DEBUG_EVENT_LOOP.then(|| {
                    tracing::debug!(
                        message = "event_loop: deferred removal of unknown monitor",
                        error = %error
                    );
                });
            }
        }
    }
}
