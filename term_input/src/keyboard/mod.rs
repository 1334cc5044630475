// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal byte stream to [`KeyEvent`] decoding, and the [`KeyboardMonitor`] that runs
//! it inside an [`EventLoop`].
//!
//! [`EventLoop`]: crate::EventLoop

// Attach sources.
pub mod control_chars;
pub mod decode_discard;
pub mod key_decoder;
pub mod key_map;
pub mod key_types;
pub mod keyboard_monitor;
pub mod mouse;
pub mod raw_input_buffer;
pub mod utf8;

// Re-export.
pub use control_chars::*;
pub use decode_discard::*;
pub use key_decoder::*;
pub use key_map::*;
pub use key_types::*;
pub use keyboard_monitor::*;
pub use mouse::*;
pub use raw_input_buffer::*;
pub use utf8::*;
