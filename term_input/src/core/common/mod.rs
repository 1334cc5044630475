// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod common_enums;
pub mod miette_setup_global_report_handler;

// Re-export.
pub use common_enums::*;
pub use miette_setup_global_report_handler::*;
