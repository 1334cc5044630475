// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing::subscriber::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::try_create_layers;

/// Configure tracing output for a host program. Logs can go to:
/// 1. a file,
/// 2. stdout or stderr,
/// 3. both.
///
/// Nothing is installed until [`install_global`] or [`install_thread_local`] is called.
/// The library itself only emits events; it never installs a subscriber on its own.
///
/// [`install_global`]: TracingConfig::install_global
/// [`install_thread_local`]: TracingConfig::install_thread_local
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

/// - `tracing_log_file_path_and_prefix`: the file path to write to, eg:
///   `/tmp/dump_keys.log`.
/// - [`DisplayPreference`]: where display output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String /* tracing_log_file_path_and_prefix */),
    DisplayAndFile(
        DisplayPreference,
        String, /* tracing_log_file_path_and_prefix */
    ),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

impl TracingConfig {
    /// Log to a file at `DEBUG` level. Terminal programs in raw mode can't share stdout
    /// with their own log output, so this is the usual choice for them.
    #[must_use]
    pub fn new_file(filename: Option<String>) -> Self {
        Self {
            writer_config: WriterConfig::File(
                filename.unwrap_or_else(|| "term_input_debug.log".to_string()),
            ),
            level_filter: LevelFilter::DEBUG,
        }
    }

    #[must_use]
    pub fn new_display(preferred_display: DisplayPreference) -> Self {
        Self {
            writer_config: WriterConfig::Display(preferred_display),
            level_filter: LevelFilter::DEBUG,
        }
    }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    /// Install the layers as the process wide default subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if a log file can't be created, or if a global subscriber has
    /// already been set.
    pub fn install_global(self) -> miette::Result<()> {
        if let Some(layers) = try_create_layers(self)? {
            tracing_subscriber::registry()
                .with(layers)
                .try_init()
                .map_err(|err| miette::miette!("Failed to install tracing: {err}"))?;
        }
        Ok(())
    }

    /// Install the layers as the default subscriber for the current thread only. The
    /// subscriber is removed when the returned guard is dropped. Useful in tests.
    ///
    /// # Errors
    ///
    /// Returns an error if a log file can't be created.
    pub fn install_thread_local(self) -> miette::Result<Option<DefaultGuard>> {
        Ok(try_create_layers(self)?.map(|layers| {
            tracing::subscriber::set_default(tracing_subscriber::registry().with(layers))
        }))
    }
}
