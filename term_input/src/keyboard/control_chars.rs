// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{KeyCode, KeyEvent, KeyModifiers};
use crate::{ANSI_ESC, ASCII_BS, ASCII_CR, ASCII_DEL, ASCII_HT, ASCII_LF, ASCII_NUL,
            CTRL_DIGIT_RANGE, CTRL_LETTER_RANGE, CTRL_TO_DIGIT_OFFSET,
            CTRL_TO_LOWERCASE_MASK};

/// Map a C0 control byte (or DEL) to the key that produces it.
///
/// | Byte        | Key              |
/// | ----------- | ---------------- |
/// | CR, LF      | Enter            |
/// | HT          | Tab              |
/// | BS, DEL     | Backspace        |
/// | ESC         | Escape           |
/// | NUL         | Ctrl+Space       |
/// | 0x01-0x1A   | Ctrl+a .. Ctrl+z |
/// | 0x1C-0x1F   | Ctrl+4 .. Ctrl+7 |
///
/// Returns `None` for printable bytes.
#[must_use]
pub fn decode_control_byte(byte: u8) -> Option<KeyEvent> {
    let plain = |code| Some(KeyEvent::press(code, KeyModifiers::NONE));
    let ctrl = |ch| Some(KeyEvent::press(KeyCode::Char(ch), KeyModifiers::CTRL));

    match byte {
        ASCII_CR | ASCII_LF => plain(KeyCode::Enter),
        ASCII_HT => plain(KeyCode::Tab),
        ASCII_BS | ASCII_DEL => plain(KeyCode::Backspace),
        ANSI_ESC => plain(KeyCode::Escape),
        ASCII_NUL => ctrl(' '),
        it if CTRL_LETTER_RANGE.contains(&it) => {
            ctrl(char::from(it | CTRL_TO_LOWERCASE_MASK))
        }
        it if CTRL_DIGIT_RANGE.contains(&it) => ctrl(char::from(it + CTRL_TO_DIGIT_OFFSET)),
        _ => None,
    }
}
