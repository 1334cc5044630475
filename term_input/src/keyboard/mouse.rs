// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Mouse report sub-grammars. See [`crate::core::ansi::mouse_constants`] for the three
//! wire formats.
//!
//! Once `ESC [` plus a protocol introducer has been seen, each protocol is either fixed
//! length (X11) or terminator delimited (SGR, URXVT), so [`parse_mouse_report`] can say
//! exactly how many bytes a report occupies, or that it needs more bytes.

use super::{KeyEvent, KeyModifiers, MouseAction, MouseButton, MouseEvent, MousePosition,
            MouseProtocol, ScrollDirection};
use crate::{ANSI_CSI_BRACKET, ANSI_ESC, ANSI_PARAM_SEPARATOR, MOUSE_BUTTON_BITS_MASK,
            MOUSE_BUTTON_LEFT, MOUSE_BUTTON_MIDDLE, MOUSE_BUTTON_RIGHT,
            MOUSE_MAX_PARAM_DIGITS, MOUSE_MODIFIER_ALT, MOUSE_MODIFIER_CTRL,
            MOUSE_MODIFIER_SHIFT, MOUSE_MOTION_FLAG, MOUSE_PRESS_FINAL,
            MOUSE_SGR_INTRODUCER, MOUSE_SGR_RELEASE_FINAL, MOUSE_VALUE_OFFSET,
            MOUSE_WHEEL_FLAG, MOUSE_X11_INTRODUCER};

/// X11 reports are always `ESC [ M Cb Cx Cy`.
const X11_REPORT_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseParse {
    /// The bytes are not a mouse report; let the other decoder stages look at them.
    NotMouse,
    /// Could still become a mouse report. `protocol` is `None` while only `ESC` or
    /// `ESC [` has been seen.
    Incomplete { protocol: Option<MouseProtocol> },
    Complete { len: usize, event: KeyEvent },
    /// A report that was introduced correctly but can't be decoded. The first `len`
    /// bytes must be dropped.
    Malformed { len: usize, protocol: MouseProtocol },
}

/// Try to decode a mouse report at the head of `bytes`.
#[must_use]
pub fn parse_mouse_report(bytes: &[u8]) -> MouseParse {
    match bytes {
        [] => MouseParse::NotMouse,
        [ANSI_ESC] | [ANSI_ESC, ANSI_CSI_BRACKET] => {
            MouseParse::Incomplete { protocol: None }
        }
        [ANSI_ESC, ANSI_CSI_BRACKET, MOUSE_X11_INTRODUCER, ..] => parse_x11(bytes),
        [ANSI_ESC, ANSI_CSI_BRACKET, MOUSE_SGR_INTRODUCER, ..] => parse_sgr(bytes),
        [ANSI_ESC, ANSI_CSI_BRACKET, b'0'..=b'9', ..] => parse_urxvt(bytes),
        _ => MouseParse::NotMouse,
    }
}

fn parse_x11(bytes: &[u8]) -> MouseParse {
    if bytes.len() < X11_REPORT_LEN {
        return MouseParse::Incomplete {
            protocol: Some(MouseProtocol::X11),
        };
    }

    let malformed = MouseParse::Malformed {
        len: X11_REPORT_LEN,
        protocol: MouseProtocol::X11,
    };
    let decode = |byte: u8| u16::from(byte).checked_sub(MOUSE_VALUE_OFFSET);
    let (Some(cb), Some(cx), Some(cy)) = (decode(bytes[3]), decode(bytes[4]), decode(bytes[5]))
    else {
        return malformed;
    };

    match build_event(cb, cx, cy, ReleaseEncoding::LowBits, MouseProtocol::X11) {
        Some(event) => MouseParse::Complete {
            len: X11_REPORT_LEN,
            event,
        },
        None => malformed,
    }
}

fn parse_sgr(bytes: &[u8]) -> MouseParse {
    let protocol = MouseProtocol::Sgr;
    // Skip `ESC [ <`.
    match scan_params(bytes, 3) {
        ParamScan::NeedMore => MouseParse::Incomplete {
            protocol: Some(protocol),
        },
        ParamScan::Bad { len } => MouseParse::Malformed { len, protocol },
        ParamScan::Done {
            params,
            count,
            final_byte,
            len,
        } => {
            let release = match final_byte {
                MOUSE_PRESS_FINAL => ReleaseEncoding::LowBits,
                MOUSE_SGR_RELEASE_FINAL => ReleaseEncoding::Explicit,
                _ => return MouseParse::Malformed { len, protocol },
            };
            if count != 3 {
                return MouseParse::Malformed { len, protocol };
            }
            match build_event(params[0], params[1], params[2], release, protocol) {
                Some(event) => MouseParse::Complete { len, event },
                None => MouseParse::Malformed { len, protocol },
            }
        }
    }
}

/// URXVT shares its introducer (`CSI` + digit) with many key sequences, eg: `CSI 1 5 ~`.
/// Anything that isn't exactly `CSI Cb ; Cx ; Cy M` is left for the key map.
fn parse_urxvt(bytes: &[u8]) -> MouseParse {
    let protocol = MouseProtocol::Urxvt;
    // Skip `ESC [`.
    match scan_params(bytes, 2) {
        ParamScan::NeedMore => MouseParse::Incomplete {
            protocol: Some(protocol),
        },
        ParamScan::Bad { .. } => MouseParse::NotMouse,
        ParamScan::Done {
            params,
            count,
            final_byte,
            len,
        } => {
            if final_byte != MOUSE_PRESS_FINAL || count != 3 {
                return MouseParse::NotMouse;
            }
            let Some(cb) = params[0].checked_sub(MOUSE_VALUE_OFFSET) else {
                return MouseParse::Malformed { len, protocol };
            };
            match build_event(cb, params[1], params[2], ReleaseEncoding::LowBits, protocol)
            {
                Some(event) => MouseParse::Complete { len, event },
                None => MouseParse::Malformed { len, protocol },
            }
        }
    }
}

#[derive(Debug)]
enum ParamScan {
    NeedMore,
    /// A byte that can't appear in a report. `len` covers the bytes to drop: an extra
    /// `;` is dropped too, anything else is left for the next decode.
    Bad { len: usize },
    Done {
        params: [u16; 3],
        count: usize,
        final_byte: u8,
        len: usize,
    },
}

/// Scan `digits ; digits ; digits <final>` starting at `start`.
fn scan_params(bytes: &[u8], start: usize) -> ParamScan {
    let mut params = [0_u16; 3];
    let mut count = 0;
    let mut digits = 0;

    for (index, &byte) in bytes.iter().enumerate().skip(start) {
        match byte {
            b'0'..=b'9' => {
                digits += 1;
                let next = params[count]
                    .checked_mul(10)
                    .and_then(|it| it.checked_add(u16::from(byte - b'0')));
                match next {
                    Some(it) if digits <= MOUSE_MAX_PARAM_DIGITS => params[count] = it,
                    _ => return ParamScan::Bad { len: index },
                }
            }
            ANSI_PARAM_SEPARATOR => {
                if digits == 0 || count + 1 >= params.len() {
                    return ParamScan::Bad { len: index + 1 };
                }
                count += 1;
                digits = 0;
            }
            0x40..=0x7E => {
                let count = if digits == 0 { count } else { count + 1 };
                return ParamScan::Done {
                    params,
                    count,
                    final_byte: byte,
                    len: index + 1,
                };
            }
            _ => return ParamScan::Bad { len: index },
        }
    }

    ParamScan::NeedMore
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReleaseEncoding {
    /// Low two bits == 3 means "released" (X11, URXVT, SGR press final byte).
    LowBits,
    /// SGR `m` final byte; low bits still name the button.
    Explicit,
}

/// Positions must be 1-based; a zero coordinate makes the report malformed.
fn build_event(
    code: u16,
    col: u16,
    row: u16,
    release: ReleaseEncoding,
    protocol: MouseProtocol,
) -> Option<KeyEvent> {
    if col == 0 || row == 0 {
        return None;
    }

    let modifiers = KeyModifiers {
        shift: (code & MOUSE_MODIFIER_SHIFT != 0).into(),
        alt: (code & MOUSE_MODIFIER_ALT != 0).into(),
        ctrl: (code & MOUSE_MODIFIER_CTRL != 0).into(),
    };

    let low_bits = code & MOUSE_BUTTON_BITS_MASK;
    let button_from_low_bits = match low_bits {
        MOUSE_BUTTON_LEFT => MouseButton::Left,
        MOUSE_BUTTON_MIDDLE => MouseButton::Middle,
        MOUSE_BUTTON_RIGHT => MouseButton::Right,
        _ => MouseButton::None,
    };
    let is_motion = code & MOUSE_MOTION_FLAG != 0;

    let (button, action) = if code & MOUSE_WHEEL_FLAG != 0 {
        let direction = match low_bits {
            0 => ScrollDirection::Up,
            1 => ScrollDirection::Down,
            2 => ScrollDirection::Left,
            _ => ScrollDirection::Right,
        };
        (MouseButton::None, MouseAction::Scroll(direction))
    } else if release == ReleaseEncoding::Explicit {
        (button_from_low_bits, MouseAction::Release)
    } else if button_from_low_bits == MouseButton::None {
        if is_motion {
            (MouseButton::None, MouseAction::Motion)
        } else {
            (MouseButton::None, MouseAction::Release)
        }
    } else if is_motion {
        (button_from_low_bits, MouseAction::Drag)
    } else {
        (button_from_low_bits, MouseAction::Press)
    };

    Some(KeyEvent::mouse(
        MouseEvent {
            button,
            action,
            pos: MousePosition { col, row },
            protocol,
        },
        modifiers,
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    fn complete(bytes: &[u8]) -> (usize, MouseEvent, KeyModifiers) {
        match parse_mouse_report(bytes) {
            MouseParse::Complete { len, event } => {
                (len, *event.as_mouse().unwrap(), event.modifiers)
            }
            other => panic!("expected a complete report, got {other:?}"),
        }
    }

    #[test]
    fn test_x11_left_press() {
        // Button 0, col 1, row 2.
        let (len, event, modifiers) = complete(b"\x1b[M !\"");
        assert_eq!(len, 6);
        assert_eq!(event.button, MouseButton::Left);
        assert_eq!(event.action, MouseAction::Press);
        assert_eq!(event.pos, MousePosition { col: 1, row: 2 });
        assert_eq!(event.protocol, MouseProtocol::X11);
        assert!(modifiers.is_empty());
    }

    #[test]
    fn test_x11_release_has_no_button() {
        // Cb = 32 + 3.
        let (_, event, _) = complete(b"\x1b[M#!!");
        assert_eq!(event.button, MouseButton::None);
        assert_eq!(event.action, MouseAction::Release);
    }

    #[test]
    fn test_sgr_press_and_release() {
        let (len, event, _) = complete(b"\x1b[<0;10;20M");
        assert_eq!(len, 11);
        assert_eq!(event.action, MouseAction::Press);
        assert_eq!(event.pos, MousePosition { col: 10, row: 20 });

        let (_, event, _) = complete(b"\x1b[<2;10;20m");
        assert_eq!(event.button, MouseButton::Right);
        assert_eq!(event.action, MouseAction::Release);
    }

    #[test_case(b"\x1b[<64;5;5M", ScrollDirection::Up ; "wheel up")]
    #[test_case(b"\x1b[<65;5;5M", ScrollDirection::Down ; "wheel down")]
    fn test_sgr_wheel(bytes: &[u8], direction: ScrollDirection) {
        let (_, event, _) = complete(bytes);
        assert_eq!(event.action, MouseAction::Scroll(direction));
    }

    #[test]
    fn test_sgr_drag_with_ctrl() {
        // 32 (motion) + 16 (ctrl) + 0 (left).
        let (_, event, modifiers) = complete(b"\x1b[<48;3;4M");
        assert_eq!(event.action, MouseAction::Drag);
        assert_eq!(event.button, MouseButton::Left);
        assert_eq!(modifiers, KeyModifiers::CTRL);
    }

    #[test]
    fn test_urxvt_press() {
        let (len, event, _) = complete(b"\x1b[32;7;9M");
        assert_eq!(len, 9);
        assert_eq!(event.protocol, MouseProtocol::Urxvt);
        assert_eq!(event.button, MouseButton::Left);
        assert_eq!(event.pos, MousePosition { col: 7, row: 9 });
    }

    #[test_case(b"\x1b[15~" ; "function key")]
    #[test_case(b"\x1b[1;5A" ; "modified arrow")]
    #[test_case(b"\x1b[A" ; "plain arrow")]
    #[test_case(b"abc" ; "text")]
    fn test_not_mouse(bytes: &[u8]) {
        assert_eq!(parse_mouse_report(bytes), MouseParse::NotMouse);
    }

    #[test_case(b"\x1b", None ; "escape")]
    #[test_case(b"\x1b[", None ; "csi")]
    #[test_case(b"\x1b[M !", Some(MouseProtocol::X11) ; "short x11")]
    #[test_case(b"\x1b[<0;1", Some(MouseProtocol::Sgr) ; "short sgr")]
    #[test_case(b"\x1b[32;1", Some(MouseProtocol::Urxvt) ; "short urxvt")]
    fn test_incomplete(bytes: &[u8], protocol: Option<MouseProtocol>) {
        assert_eq!(parse_mouse_report(bytes), MouseParse::Incomplete { protocol });
    }

    #[test]
    fn test_malformed_sgr_is_dropped_through_final_byte() {
        assert_eq!(
            parse_mouse_report(b"\x1b[<0;1Xabc"),
            MouseParse::Malformed {
                len: 7,
                protocol: MouseProtocol::Sgr
            }
        );
    }

    #[test]
    fn test_zero_coordinate_is_malformed() {
        assert_eq!(
            parse_mouse_report(b"\x1b[<0;0;5M"),
            MouseParse::Malformed {
                len: 10,
                protocol: MouseProtocol::Sgr
            }
        );
    }
}
