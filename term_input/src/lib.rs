// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words epoll kqueue urxvt

//! # r3bl_term_input
//!
//! The input half of a terminal UI: read bytes from the keyboard descriptor, wait on
//! other descriptors at the same time, and turn what arrives into ordered
//! [`KeyEvent`]s.
//!
//! ```text
//! ┌───────────────────────────── InputEngine ─────────────────────────────┐
//! │                                                                       │
//! │   EventLoop (mio Poll: epoll / kqueue)                                │
//! │     │                                                                 │
//! │     ├─ KeyboardMonitor ── read ──► KeyDecoder ──► KeyEvent queue      │
//! │     │        │ pending prefix?          ▲                             │
//! │     │        ▼                          │ finalize_pending()          │
//! │     ├─ TimerSource ◄── self-pipe ── timer worker thread               │
//! │     │                                                                 │
//! │     └─ your monitors (FnMonitor, SignalMonitor, ...)                  │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Pieces
//!
//! - [`event_loop`]: a single-threaded readiness reactor. [`Monitor`]s are registered
//!   against descriptors and triggered in registration order, once per pass, with
//!   removal safe from inside a trigger.
//! - [`timer`]: [`TimerSource`] delivers expirations as readiness on a self-pipe, so
//!   timeouts are dispatched by the same loop as everything else.
//! - [`keyboard`]: the [`KeyDecoder`] state machine (UTF-8, a terminal capability
//!   [`KeyMap`], ESC/Meta disambiguation, X11/SGR/URXVT mouse reports) and the
//!   [`KeyboardMonitor`] that feeds it.
//! - [`engine`]: [`InputEngine`] wires the three together around one keyboard
//!   descriptor.
//! - [`core`]: logging setup ([`TracingConfig`]), the miette report hook, and the
//!   escape sequence constants the decoder and key map are built from.
//!
//! # Example
//!
//! ```no_run
//! use miette::IntoDiagnostic;
//! use r3bl_term_input::{InputConfig, InputEngine, KeyCode, KeyMap};
//! use std::{fs::File, os::fd::OwnedFd};
//!
//! # fn main() -> miette::Result<()> {
//! let tty: OwnedFd = File::open("/dev/tty").into_diagnostic()?.into();
//! let mut engine = InputEngine::new(tty, KeyMap::xterm(), InputConfig::default())?;
//!
//! loop {
//!     engine.run_once(None)?;
//!     while let Some(event) = engine.next_event() {
//!         println!("{event}");
//!         if event.code == KeyCode::Char('q') {
//!             return Ok(());
//!         }
//!     }
//!     if engine.is_input_closed() {
//!         return Ok(());
//!     }
//! }
//! # }
//! ```

// Enforce strict error handling in production library code only. Tests and examples are
// allowed to use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]
// Read buffers in tests are sized to the decoder's maximum capacity.
#![cfg_attr(test, allow(clippy::large_stack_arrays))]

// Attach modules (re-exported below to provide a flat public API).
pub mod core;
pub mod engine;
pub mod event_loop;
pub mod keyboard;
pub mod timer;

// Re-export.
#[allow(ambiguous_glob_reexports)]
pub use core::*;
#[allow(ambiguous_glob_reexports)]
pub use engine::*;
#[allow(ambiguous_glob_reexports)]
pub use event_loop::*;
#[allow(ambiguous_glob_reexports)]
pub use keyboard::*;
#[allow(ambiguous_glob_reexports)]
pub use timer::*;
