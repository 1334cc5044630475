// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Single-threaded readiness reactor. An [`EventLoop`] owns a set of [`Monitor`]s and
//! triggers each one when its file descriptor becomes ready.

// Attach sources.
pub mod event_loop_error;
pub mod event_loop_impl;
pub mod fn_monitor;
pub mod loop_control;
pub mod monitor;
pub mod signal_monitor;

// Re-export.
pub use event_loop_error::*;
pub use event_loop_impl::*;
pub use fn_monitor::*;
pub use loop_control::*;
pub use monitor::*;
pub use signal_monitor::*;

// Tests.
#[cfg(test)]
mod integration_tests;
