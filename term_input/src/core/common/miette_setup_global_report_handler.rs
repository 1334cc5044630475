// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Install a graphical [miette](https://docs.rs/miette/latest/miette/index.html) report
//! handler for binaries built on this crate (see the `dump_keys` example).
//!
//! The hook is lazy. Terminal width is only queried when a report is actually rendered,
//! so a program that never errors out never touches the terminal for this.

use miette::MietteHandlerOpts;

/// Fallback width used when stdout is not a terminal.
pub const DEFAULT_REPORT_WIDTH: usize = 80;

/// Registers the global [`miette::ErrorHook`]. Calling this more than once is a no-op.
pub fn setup_default_miette_global_report_handler(issues_url: &'static str) {
    miette::set_hook(Box::new(|_report| {
        let terminal_width = {
            let it = rustix::termios::tcgetwinsize(std::io::stdout())
                .ok()
                .map(|winsize| usize::from(winsize.ws_col))
                .filter(|cols| *cols > 0)
                .unwrap_or(DEFAULT_REPORT_WIDTH);
            tracing::debug!(message = "miette::set_hook", terminal_width = it);
            it
        };
        Box::new(
            MietteHandlerOpts::new()
                .width(terminal_width)
                .wrap_lines(true)
                .force_graphical(true)
                .unicode(true)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .with_cause_chain()
                .footer(issues_url.to_string())
                .build(),
        )
    }))
    .ok();
}
