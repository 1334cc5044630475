// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Control flow signal returned by every [`Monitor::trigger`] call.
///
/// Tells the [`EventLoop`] what to do with the monitor (and the loop itself) after the
/// trigger returns.
///
/// [`EventLoop`]: crate::EventLoop
/// [`Monitor::trigger`]: crate::Monitor::trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuation {
    /// Keep the monitor registered and keep the loop running.
    #[default]
    Continue,

    /// Stop the loop after the current dispatch pass completes. Same effect as calling
    /// [`LoopControl::stop`].
    ///
    /// [`LoopControl::stop`]: crate::LoopControl::stop
    Stop,

    /// The monitor performed a bounded read and its source may still hold data. The
    /// loop re-arms the monitor's readiness after the pass so that it fires again on the
    /// next wait, instead of being starved by the edge-triggered OS multiplexer.
    MoreAvailable,
}

/// Whether an input source can still produce bytes. Becomes [`Closed`] once a read
/// reports end of input.
///
/// [`Closed`]: Self::Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivenessState {
    #[default]
    Alive,
    Closed,
}
