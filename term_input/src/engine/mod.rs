// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod input_config;
pub mod input_engine;

// Re-export.
pub use input_config::*;
pub use input_engine::*;

// Tests.
#[cfg(test)]
mod integration_tests;
