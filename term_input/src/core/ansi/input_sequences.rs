// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Byte constants for terminal input sequences.
//!
//! # Keyboard Sequences
//!
//! - CSI = `ESC [` (0x1B 0x5B), SS3 = `ESC O` (0x1B 0x4F).
//! - Cursor keys: `CSI A..D` (normal mode) or `SS3 A..D` (application mode).
//! - Tilde keys: `CSI n ~`, eg: Insert `CSI 2~`, F5 `CSI 15~`.
//! - Modified keys: `CSI 1 ; m X` or `CSI n ; m ~` where `m = 1 + mask`, and the mask
//!   bits are 1 = Shift, 2 = Alt, 4 = Ctrl.
//! - Linux console: F1-F5 are `ESC [ [ A..E`.

// ==================== Sequence Components ====================

/// ESC byte (27 in decimal, 0x1B in hex).
pub const ANSI_ESC: u8 = 0x1B;

/// CSI bracket byte: `[`.
pub const ANSI_CSI_BRACKET: u8 = b'[';

/// SS3 `O` byte, second byte of application mode sequences.
pub const ANSI_SS3_O: u8 = b'O';

/// Parameter separator byte: `;`.
pub const ANSI_PARAM_SEPARATOR: u8 = b';';

/// Function key terminator: `~`.
pub const ANSI_FUNCTION_KEY_TERMINATOR: u8 = b'~';

// ==================== Final Bytes ====================

pub const ARROW_UP_FINAL: u8 = b'A';
pub const ARROW_DOWN_FINAL: u8 = b'B';
pub const ARROW_RIGHT_FINAL: u8 = b'C';
pub const ARROW_LEFT_FINAL: u8 = b'D';
/// Keypad center (5) in application mode.
pub const KEYPAD_BEGIN_FINAL: u8 = b'E';
pub const SPECIAL_END_FINAL: u8 = b'F';
pub const SPECIAL_HOME_FINAL: u8 = b'H';
/// `CSI Z`: Shift+Tab.
pub const BACKTAB_FINAL: u8 = b'Z';
/// `SS3 M`: keypad Enter.
pub const SS3_KEYPAD_ENTER_FINAL: u8 = b'M';

/// `SS3 P..S` and `CSI 1 ; m P..S`: F1-F4.
pub const SS3_F1_TO_F4_FINALS: [u8; 4] = [b'P', b'Q', b'R', b'S'];

/// `ESC [ [ A..E`: F1-F5 on the linux console.
pub const LINUX_CONSOLE_F1_TO_F5_FINALS: [u8; 5] = [b'A', b'B', b'C', b'D', b'E'];

// ==================== Tilde Codes (CSI n ~) ====================

pub const SPECIAL_HOME_ALT1_CODE: u16 = 1;
pub const SPECIAL_INSERT_CODE: u16 = 2;
pub const SPECIAL_DELETE_CODE: u16 = 3;
pub const SPECIAL_END_ALT1_CODE: u16 = 4;
pub const SPECIAL_PAGE_UP_CODE: u16 = 5;
pub const SPECIAL_PAGE_DOWN_CODE: u16 = 6;
/// rxvt.
pub const SPECIAL_HOME_ALT2_CODE: u16 = 7;
/// rxvt.
pub const SPECIAL_END_ALT2_CODE: u16 = 8;

/// Function key codes F1-F12. Note the gaps at 16 and 22.
pub const FUNCTION_KEY_CODES: [u16; 12] = [11, 12, 13, 14, 15, 17, 18, 19, 20, 21, 23, 24];

// ==================== Modifiers ====================

pub const MODIFIER_SHIFT_MASK: u8 = 1;
pub const MODIFIER_ALT_MASK: u8 = 2;
pub const MODIFIER_CTRL_MASK: u8 = 4;

/// Modifier parameters that xterm sends (`1 + mask`), Shift (2) through
/// Ctrl+Alt+Shift (8).
pub const MODIFIER_PARAMETERS: std::ops::RangeInclusive<u8> = 2..=8;

// ==================== Control Characters ====================

pub const ASCII_NUL: u8 = 0x00;
pub const ASCII_BS: u8 = 0x08;
pub const ASCII_HT: u8 = 0x09;
pub const ASCII_LF: u8 = 0x0A;
pub const ASCII_CR: u8 = 0x0D;
pub const ASCII_DEL: u8 = 0x7F;

/// `Ctrl+A` (0x01) through `Ctrl+Z` (0x1A).
pub const CTRL_LETTER_RANGE: std::ops::RangeInclusive<u8> = 0x01..=0x1A;

/// 0x1C-0x1F, which terminals send for `Ctrl+4` through `Ctrl+7`.
pub const CTRL_DIGIT_RANGE: std::ops::RangeInclusive<u8> = 0x1C..=0x1F;

/// OR-ing a control byte with this mask gives the lowercase letter (0x01 | 0x60 = `a`).
pub const CTRL_TO_LOWERCASE_MASK: u8 = 0x60;

/// Adding this to a byte in [`CTRL_DIGIT_RANGE`] gives the digit (0x1C + 0x18 = `4`).
pub const CTRL_TO_DIGIT_OFFSET: u8 = b'4' - 0x1C;
