// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termcap rxvt

//! Capability key map: byte sequence to [`LogicalKey`].
//!
//! The map is built once at startup (from a capability database via
//! [`KeyMap::from_termcap`], or from the built-in [`KeyMap::xterm`] table) and is
//! read-only afterwards. Lookups answer one question about the head of the input
//! buffer: is it a complete entry, the start of a longer one, or neither?

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum_macros::{Display, EnumString};

use super::{KeyCode, KeyModifiers, LogicalKey};
use crate::{ANSI_CSI_BRACKET, ANSI_ESC, ANSI_SS3_O, ARROW_DOWN_FINAL, ARROW_LEFT_FINAL,
            ARROW_RIGHT_FINAL, ARROW_UP_FINAL, BACKTAB_FINAL, FUNCTION_KEY_CODES,
            KEYPAD_BEGIN_FINAL, LINUX_CONSOLE_F1_TO_F5_FINALS, MODIFIER_PARAMETERS,
            SPECIAL_DELETE_CODE, SPECIAL_END_ALT1_CODE, SPECIAL_END_ALT2_CODE,
            SPECIAL_END_FINAL, SPECIAL_HOME_ALT1_CODE, SPECIAL_HOME_ALT2_CODE,
            SPECIAL_HOME_FINAL, SPECIAL_INSERT_CODE, SPECIAL_PAGE_DOWN_CODE,
            SPECIAL_PAGE_UP_CODE, SS3_F1_TO_F4_FINALS, SS3_KEYPAD_ENTER_FINAL};

/// Most terminal key sequences fit in 8 bytes without spilling to the heap.
pub type KeySequence = SmallVec<[u8; 8]>;

/// How to pick between overlapping entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum MatchPolicy {
    /// The longest complete entry matching the head of the buffer wins, ties go to the
    /// earliest registered entry. If the whole buffer is a strict prefix of some longer
    /// entry, the lookup reports [`KeyMapMatch::Prefix`] so the decoder waits.
    #[default]
    LongestMatch,
    /// The earliest registered complete entry wins immediately, even if a longer entry
    /// could still match.
    FirstMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapEntry {
    pub sequence: KeySequence,
    pub key: LogicalKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMapMatch {
    /// The first `len` bytes are a complete entry.
    Complete { len: usize, key: LogicalKey },
    /// The buffer is a strict prefix of a longer entry. `fallback` is the complete entry
    /// (if any) that would win if no more bytes arrive.
    Prefix { fallback: Option<(usize, LogicalKey)> },
    NoMatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    entries: Vec<KeyMapEntry>,
}

impl KeyMap {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Add an entry. Empty sequences are ignored. Registration order matters for
    /// tie-breaking, see [`MatchPolicy`].
    pub fn insert(
        &mut self,
        sequence: impl AsRef<[u8]>,
        key: impl Into<LogicalKey>,
    ) -> &mut Self {
        let sequence = sequence.as_ref();
        if !sequence.is_empty() {
            self.entries.push(KeyMapEntry {
                sequence: SmallVec::from_slice(sequence),
                key: key.into(),
            });
        }
        self
    }

    #[must_use]
    pub fn with(mut self, sequence: impl AsRef<[u8]>, key: impl Into<LogicalKey>) -> Self {
        self.insert(sequence, key);
        self
    }

    /// Append all of `other`'s entries after this map's entries.
    pub fn extend_from(&mut self, other: &KeyMap) {
        self.entries.extend(other.entries.iter().cloned());
    }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyMapEntry> { self.entries.iter() }

    /// Match the head of `bytes` against the table.
    #[must_use]
    pub fn lookup(&self, bytes: &[u8], policy: MatchPolicy) -> KeyMapMatch {
        if bytes.is_empty() {
            return KeyMapMatch::NoMatch;
        }

        let mut longest: Option<(usize, LogicalKey)> = None;
        let mut first: Option<(usize, LogicalKey)> = None;
        let mut is_strict_prefix = false;

        for entry in &self.entries {
            let sequence = entry.sequence.as_slice();
            if bytes.starts_with(sequence) {
                let len = sequence.len();
                if first.is_none() {
                    first = Some((len, entry.key));
                }
                // Strictly greater, so the earliest entry keeps a tie.
                if longest.is_none_or(|(best_len, _)| len > best_len) {
                    longest = Some((len, entry.key));
                }
            } else if sequence.len() > bytes.len() && sequence.starts_with(bytes) {
                is_strict_prefix = true;
            }
        }

        match policy {
            MatchPolicy::FirstMatch => match (first, is_strict_prefix) {
                (Some((len, key)), _) => KeyMapMatch::Complete { len, key },
                (None, true) => KeyMapMatch::Prefix { fallback: None },
                (None, false) => KeyMapMatch::NoMatch,
            },
            MatchPolicy::LongestMatch => match (longest, is_strict_prefix) {
                (fallback, true) => KeyMapMatch::Prefix { fallback },
                (Some((len, key)), false) => KeyMapMatch::Complete { len, key },
                (None, false) => KeyMapMatch::NoMatch,
            },
        }
    }

    /// Build a map from termcap capability names and their sequences. Names that don't
    /// name a key (see [`termcap_key`]) and empty sequences are skipped.
    #[must_use]
    pub fn from_termcap<I, N, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<[u8]>,
    {
        let mut map = Self::new();
        for (name, sequence) in entries {
            match termcap_key(name.as_ref()) {
                Some(key) => {
                    map.insert(sequence, key);
                }
                None => {
                    tracing::trace!(
                        message = "Skipping termcap capability",
                        name = name.as_ref()
                    );
                }
            }
        }
        map
    }

    /// Built-in table for xterm compatible terminals, VT220/rxvt tilde keys and the
    /// linux console, including xterm's modified variants (`CSI 1;5A` is Ctrl+Up).
    #[must_use]
    pub fn xterm() -> Self {
        let mut map = Self::new();
        let csi = |tail: &[u8]| -> KeySequence {
            let mut it: KeySequence = SmallVec::from_slice(&[ANSI_ESC, ANSI_CSI_BRACKET]);
            it.extend_from_slice(tail);
            it
        };
        let ss3 = |final_byte: u8| [ANSI_ESC, ANSI_SS3_O, final_byte];

        // Cursor and editing keys with a letter final byte. Normal, application (SS3)
        // and modified forms.
        let letter_keys = [
            (ARROW_UP_FINAL, KeyCode::Up),
            (ARROW_DOWN_FINAL, KeyCode::Down),
            (ARROW_RIGHT_FINAL, KeyCode::Right),
            (ARROW_LEFT_FINAL, KeyCode::Left),
            (SPECIAL_HOME_FINAL, KeyCode::Home),
            (SPECIAL_END_FINAL, KeyCode::End),
            (KEYPAD_BEGIN_FINAL, KeyCode::Begin),
        ];
        for (final_byte, code) in letter_keys {
            map.insert(csi(&[final_byte]), code);
            map.insert(ss3(final_byte), code);
            insert_modified(&mut map, 1, final_byte, code);
        }

        // F1-F4 in SS3 form, and xterm's modified `CSI 1;m P..S`.
        for (index, final_byte) in SS3_F1_TO_F4_FINALS.into_iter().enumerate() {
            let code = function_key(index);
            map.insert(ss3(final_byte), code);
            insert_modified(&mut map, 1, final_byte, code);
        }

        // Tilde keys: `CSI n ~` and `CSI n ; m ~`.
        let tilde_keys = [
            (SPECIAL_HOME_ALT1_CODE, KeyCode::Home),
            (SPECIAL_INSERT_CODE, KeyCode::Insert),
            (SPECIAL_DELETE_CODE, KeyCode::Delete),
            (SPECIAL_END_ALT1_CODE, KeyCode::End),
            (SPECIAL_PAGE_UP_CODE, KeyCode::PageUp),
            (SPECIAL_PAGE_DOWN_CODE, KeyCode::PageDown),
            (SPECIAL_HOME_ALT2_CODE, KeyCode::Home),
            (SPECIAL_END_ALT2_CODE, KeyCode::End),
        ]
        .into_iter()
        .chain(
            FUNCTION_KEY_CODES
                .into_iter()
                .enumerate()
                .map(|(index, number)| (number, function_key(index))),
        );
        for (number, code) in tilde_keys {
            map.insert(format!("\x1b[{number}~"), code);
            for param in MODIFIER_PARAMETERS {
                if let Some(modifiers) = KeyModifiers::from_xterm_parameter(param) {
                    map.insert(
                        format!("\x1b[{number};{param}~"),
                        LogicalKey::with_modifiers(code, modifiers),
                    );
                }
            }
        }

        map.insert(csi(&[BACKTAB_FINAL]), KeyCode::BackTab);
        map.insert(ss3(SS3_KEYPAD_ENTER_FINAL), KeyCode::Enter);

        // Linux console: `ESC [ [ A..E` for F1-F5.
        for (index, final_byte) in LINUX_CONSOLE_F1_TO_F5_FINALS.into_iter().enumerate() {
            map.insert(csi(&[ANSI_CSI_BRACKET, final_byte]), function_key(index));
        }

        map
    }
}

impl<'a> IntoIterator for &'a KeyMap {
    type Item = &'a KeyMapEntry;
    type IntoIter = std::slice::Iter<'a, KeyMapEntry>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// `CSI <number> ; <param> <final>` for every xterm modifier parameter.
fn insert_modified(map: &mut KeyMap, number: u16, final_byte: u8, code: KeyCode) {
    for param in MODIFIER_PARAMETERS {
        if let Some(modifiers) = KeyModifiers::from_xterm_parameter(param) {
            let mut sequence = format!("\x1b[{number};{param}").into_bytes();
            sequence.push(final_byte);
            map.insert(sequence, LogicalKey::with_modifiers(code, modifiers));
        }
    }
}

/// `index` 0 is F1.
fn function_key(index: usize) -> KeyCode {
    KeyCode::Function(u8::try_from(index + 1).unwrap_or(u8::MAX))
}

/// The logical key a termcap capability name stands for.
///
/// | Name          | Key          | Name | Key       |
/// | ------------- | ------------ | ---- | --------- |
/// | `ku` `kd`     | Up, Down     | `kP` | PageUp    |
/// | `kl` `kr`     | Left, Right  | `kN` | PageDown  |
/// | `kh` `@7`     | Home, End    | `kB` | BackTab   |
/// | `kI` `kD`     | Insert, Del  | `kb` | Backspace |
/// | `k1`..`k9`    | F1..F9       | `@8` | Enter     |
/// | `k;` `F1` `F2`| F10 F11 F12  | `K2` | Begin     |
#[must_use]
pub fn termcap_key(name: &str) -> Option<LogicalKey> {
    let code = match name {
        "ku" => KeyCode::Up,
        "kd" => KeyCode::Down,
        "kl" => KeyCode::Left,
        "kr" => KeyCode::Right,
        "kh" => KeyCode::Home,
        "@7" => KeyCode::End,
        "kI" => KeyCode::Insert,
        "kD" => KeyCode::Delete,
        "kP" => KeyCode::PageUp,
        "kN" => KeyCode::PageDown,
        "kB" => KeyCode::BackTab,
        "kb" => KeyCode::Backspace,
        "@8" => KeyCode::Enter,
        "K2" => KeyCode::Begin,
        "k;" => KeyCode::Function(10),
        "F1" => KeyCode::Function(11),
        "F2" => KeyCode::Function(12),
        _ => {
            let digit = name.strip_prefix('k')?.parse::<u8>().ok()?;
            if !(1..=9).contains(&digit) || name.len() != 2 {
                return None;
            }
            KeyCode::Function(digit)
        }
    };
    Some(LogicalKey::new(code))
}
