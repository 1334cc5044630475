// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod input_sequences;
pub mod mouse_constants;
pub mod utf8_constants;

// Re-export.
pub use input_sequences::*;
pub use mouse_constants::*;
pub use utf8_constants::*;
