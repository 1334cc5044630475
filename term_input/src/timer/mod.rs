// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Timers whose expirations reach the [`EventLoop`] through a self-pipe.
//!
//! [`EventLoop`]: crate::EventLoop

// Attach sources.
pub mod timer_error;
pub mod timer_handle;
pub mod timer_source;
pub mod timer_worker;

// Re-export.
pub use timer_error::*;
pub use timer_handle::*;
pub use timer_source::*;
pub use timer_worker::*;

/// Verbose timer logging.
pub const DEBUG_TIMER_SOURCE: bool = false;
