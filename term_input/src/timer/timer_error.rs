// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::Diagnostic;
use std::io;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum TimerError {
    #[error("Failed to create the timer notification pipe")]
    #[diagnostic(
        code(r3bl_term_input::timer::pipe_creation),
        help("The process may have run out of file descriptors")
    )]
    PipeCreation(#[source] io::Error),

    #[error("Failed to spawn the timer worker thread")]
    #[diagnostic(code(r3bl_term_input::timer::thread_spawn))]
    ThreadSpawn(#[source] io::Error),

    #[error("The timer worker thread is no longer running")]
    #[diagnostic(
        code(r3bl_term_input::timer::worker_gone),
        help("The worker exits only if it panicked or could not be spawned earlier")
    )]
    WorkerGone,
}
