// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DEFAULT_INPUT_BUFFER_CAPACITY, KeyDecoder, KeyMap, MatchPolicy, MouseMode,
            Utf8Mode};
use miette::{Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long an ambiguous prefix (a lone `ESC`, a partial escape sequence) waits for
/// more bytes before it is resolved with its shortest interpretation.
pub const DEFAULT_ESC_TIMEOUT: Duration = Duration::from_millis(100);

/// Settings for an [`InputEngine`].
///
/// Deserializes from JSON with every field optional; missing fields take their
/// defaults. `esc_timeout` is written in milliseconds as `esc_timeout_ms`.
///
/// ```
/// use r3bl_term_input::{InputConfig, MouseMode};
/// use std::time::Duration;
///
/// let config =
///     InputConfig::try_from_json_str(r#"{ "esc_timeout_ms": 50, "mouse": "Disabled" }"#)
///         .unwrap();
/// assert_eq!(config.esc_timeout, Duration::from_millis(50));
/// assert_eq!(config.mouse, MouseMode::Disabled);
/// ```
///
/// [`InputEngine`]: crate::InputEngine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    #[serde(rename = "esc_timeout_ms", with = "duration_as_millis")]
    pub esc_timeout: Duration,
    /// Clamped to [`MIN_INPUT_BUFFER_CAPACITY`]..=[`MAX_INPUT_BUFFER_CAPACITY`].
    ///
    /// [`MAX_INPUT_BUFFER_CAPACITY`]: crate::MAX_INPUT_BUFFER_CAPACITY
    /// [`MIN_INPUT_BUFFER_CAPACITY`]: crate::MIN_INPUT_BUFFER_CAPACITY
    pub buffer_capacity: usize,
    pub utf8: Utf8Mode,
    pub mouse: MouseMode,
    pub match_policy: MatchPolicy,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            esc_timeout: DEFAULT_ESC_TIMEOUT,
            buffer_capacity: DEFAULT_INPUT_BUFFER_CAPACITY,
            utf8: Utf8Mode::default(),
            mouse: MouseMode::default(),
            match_policy: MatchPolicy::default(),
        }
    }
}

impl InputConfig {
    #[must_use]
    pub fn with_esc_timeout(mut self, esc_timeout: Duration) -> Self {
        self.esc_timeout = esc_timeout;
        self
    }

    #[must_use]
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    #[must_use]
    pub fn with_utf8(mut self, utf8: Utf8Mode) -> Self {
        self.utf8 = utf8;
        self
    }

    #[must_use]
    pub fn with_mouse(mut self, mouse: MouseMode) -> Self {
        self.mouse = mouse;
        self
    }

    #[must_use]
    pub fn with_match_policy(mut self, match_policy: MatchPolicy) -> Self {
        self.match_policy = match_policy;
        self
    }

    /// # Errors
    ///
    /// Malformed JSON, unknown enum variants, or values of the wrong type.
    pub fn try_from_json_str(json: &str) -> miette::Result<Self> {
        serde_json::from_str(json)
            .into_diagnostic()
            .context("Failed to parse input config")
    }

    /// A decoder over `key_map` with this config's buffer, UTF-8, mouse and matching
    /// settings.
    #[must_use]
    pub fn build_decoder(&self, key_map: KeyMap) -> KeyDecoder {
        KeyDecoder::new(key_map)
            .with_buffer_capacity(self.buffer_capacity)
            .with_utf8_mode(self.utf8)
            .with_mouse_mode(self.mouse)
            .with_match_policy(self.match_policy)
    }
}

mod duration_as_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(it: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(it.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
