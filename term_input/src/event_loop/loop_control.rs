// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::MonitorId;
use mio::Waker;
use std::sync::{Arc,
                atomic::{AtomicBool, Ordering}};

/// Handed to every [`Monitor::trigger`] call. The only way a trigger can change the
/// loop it runs in.
///
/// Removals requested here are queued and applied after the current dispatch pass, so
/// the set of monitors being iterated never changes mid-pass.
///
/// [`Monitor::trigger`]: crate::Monitor::trigger
#[derive(Debug)]
pub struct LoopControl {
    stop_flag: Arc<AtomicBool>,
    current: Option<MonitorId>,
    pending_removals: Vec<MonitorId>,
}

impl LoopControl {
    pub(crate) fn new(stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            stop_flag,
            current: None,
            pending_removals: Vec::new(),
        }
    }

    /// Ask [`EventLoop::run`] to return. The current pass still completes.
    ///
    /// [`EventLoop::run`]: crate::EventLoop::run
    pub fn stop(&mut self) { self.stop_flag.store(true, Ordering::Release); }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool { self.stop_flag.load(Ordering::Acquire) }

    /// Queue `id` for removal once the current pass completes. Monitors later in the
    /// pass still fire; `id` itself is not triggered again.
    pub fn unregister(&mut self, id: MonitorId) {
        if !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
    }

    /// Id of the monitor whose trigger is running.
    #[must_use]
    pub fn current_monitor(&self) -> Option<MonitorId> { self.current }

    pub(crate) fn set_current(&mut self, id: Option<MonitorId>) { self.current = id; }

    pub(crate) fn is_removal_pending(&self, id: MonitorId) -> bool {
        self.pending_removals.contains(&id)
    }

    pub(crate) fn take_pending_removals(&mut self) -> Vec<MonitorId> {
        std::mem::take(&mut self.pending_removals)
    }
}

/// Stops an [`EventLoop`] from outside its thread.
///
/// [`stop`] sets the loop's stop flag and wakes a blocked wait, so a loop parked in
/// [`EventLoop::run`] with no pending input still returns promptly.
///
/// [`EventLoop::run`]: crate::EventLoop::run
/// [`EventLoop`]: crate::EventLoop
/// [`stop`]: LoopStopHandle::stop
#[derive(Debug, Clone)]
pub struct LoopStopHandle {
    stop_flag: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl LoopStopHandle {
    pub(crate) fn new(stop_flag: Arc<AtomicBool>, waker: Arc<Waker>) -> Self {
        Self { stop_flag, waker }
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        // The loop may already be gone, in which case there is nothing to wake.
        let _unused = self.waker.wake();
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool { self.stop_flag.load(Ordering::Acquire) }
}
