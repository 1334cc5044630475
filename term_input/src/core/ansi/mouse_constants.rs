// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Mouse report encodings.
//!
//! | Protocol | Wire format                     | Values              |
//! | -------- | ------------------------------- | ------------------- |
//! | X11      | `CSI M Cb Cx Cy`                | each byte is 32 + n |
//! | SGR      | `CSI < Cb ; Cx ; Cy M` (or `m`) | decimal, `m` = up   |
//! | URXVT    | `CSI Cb ; Cx ; Cy M`            | decimal, Cb is 32+n |
//!
//! The button byte packs the button in its low two bits (3 = release in X11/URXVT)
//! plus flag bits for modifiers, motion and the wheel.

/// `M` after CSI introduces an X11 report. Also terminates SGR press / URXVT.
pub const MOUSE_X11_INTRODUCER: u8 = b'M';

/// `<` after CSI introduces an SGR report.
pub const MOUSE_SGR_INTRODUCER: u8 = b'<';

pub const MOUSE_PRESS_FINAL: u8 = b'M';
pub const MOUSE_SGR_RELEASE_FINAL: u8 = b'm';

/// X11 and URXVT encode values with this offset.
pub const MOUSE_VALUE_OFFSET: u16 = 32;

pub const MOUSE_BUTTON_BITS_MASK: u16 = 0b0000_0011;
pub const MOUSE_BUTTON_LEFT: u16 = 0;
pub const MOUSE_BUTTON_MIDDLE: u16 = 1;
pub const MOUSE_BUTTON_RIGHT: u16 = 2;
pub const MOUSE_BUTTON_RELEASE: u16 = 3;

pub const MOUSE_MODIFIER_SHIFT: u16 = 4;
pub const MOUSE_MODIFIER_ALT: u16 = 8;
pub const MOUSE_MODIFIER_CTRL: u16 = 16;
pub const MOUSE_MOTION_FLAG: u16 = 32;
pub const MOUSE_WHEEL_FLAG: u16 = 64;

/// Longest decimal parameter accepted in SGR / URXVT reports, a guard against runaway
/// digit strings.
pub const MOUSE_MAX_PARAM_DIGITS: usize = 5;

// Enable/disable sequences, for hosts that turn reporting on.
pub const MOUSE_ENABLE_X11: &str = "\x1b[?1000h";
pub const MOUSE_DISABLE_X11: &str = "\x1b[?1000l";
pub const MOUSE_ENABLE_BUTTON_MOTION: &str = "\x1b[?1002h";
pub const MOUSE_DISABLE_BUTTON_MOTION: &str = "\x1b[?1002l";
pub const MOUSE_ENABLE_SGR: &str = "\x1b[?1006h";
pub const MOUSE_DISABLE_SGR: &str = "\x1b[?1006l";
pub const MOUSE_ENABLE_URXVT: &str = "\x1b[?1015h";
pub const MOUSE_DISABLE_URXVT: &str = "\x1b[?1015l";
