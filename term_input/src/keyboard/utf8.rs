// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! UTF-8 decoding of the byte at the head of the input buffer.
//!
//! Terminal input arrives in arbitrary chunks, so a multi-byte character may be split
//! across reads. [`decode_utf8_prefix`] tells the decoder which of three states the head
//! of the buffer is in:
//!
//! ```text
//! Byte Pattern   Meaning              Detection
//! ────────────────────────────────────────────────────
//! 0xxxxxxx       ASCII (1-byte)       0x00..=0x7F
//! 110xxxxx       2-byte start         0xC0..=0xDF
//! 1110xxxx       3-byte start         0xE0..=0xEF
//! 11110xxx       4-byte start         0xF0..=0xF7
//! 10xxxxxx       Continuation         byte & 0xC0 == 0x80
//! ```
//!
//! Overlong encodings, surrogates and values past `U+10FFFF` are rejected as
//! [`Utf8Decode::Invalid`], so the lead byte gets discarded and decoding restarts at the
//! next byte.

use crate::{UTF8_1BYTE_MAX, UTF8_2BYTE_FIRST_MASK, UTF8_2BYTE_MAX, UTF8_2BYTE_MIN,
            UTF8_3BYTE_FIRST_MASK, UTF8_3BYTE_MAX, UTF8_3BYTE_MIN,
            UTF8_4BYTE_FIRST_MASK, UTF8_4BYTE_MAX, UTF8_4BYTE_MIN,
            UTF8_CONTINUATION_DATA_MASK, UTF8_CONTINUATION_MASK,
            UTF8_CONTINUATION_PATTERN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Decode {
    /// A whole character, and how many bytes it took.
    Complete { ch: char, len: usize },
    /// A valid lead byte whose continuation bytes haven't arrived yet.
    Incomplete { expected_len: usize },
    /// The head byte can't start a character (or the sequence it starts is malformed).
    Invalid,
}

/// Total sequence length implied by a lead byte, or `None` if the byte can't lead.
#[must_use]
pub fn get_utf8_length(lead: u8) -> Option<usize> {
    match lead {
        0..=UTF8_1BYTE_MAX => Some(1),
        UTF8_2BYTE_MIN..=UTF8_2BYTE_MAX => Some(2),
        UTF8_3BYTE_MIN..=UTF8_3BYTE_MAX => Some(3),
        UTF8_4BYTE_MIN..=UTF8_4BYTE_MAX => Some(4),
        _ => None,
    }
}

#[must_use]
pub fn is_utf8_continuation(byte: u8) -> bool {
    byte & UTF8_CONTINUATION_MASK == UTF8_CONTINUATION_PATTERN
}

/// Decode the first character in `bytes`. An empty slice is [`Utf8Decode::Incomplete`].
#[must_use]
pub fn decode_utf8_prefix(bytes: &[u8]) -> Utf8Decode {
    let Some(&lead) = bytes.first() else {
        return Utf8Decode::Incomplete { expected_len: 1 };
    };

    let Some(expected_len) = get_utf8_length(lead) else {
        return Utf8Decode::Invalid;
    };

    if expected_len == 1 {
        return Utf8Decode::Complete {
            ch: char::from(lead),
            len: 1,
        };
    }

    // Reject early on a bad continuation byte, even if the sequence is still short.
    let available = bytes.len().min(expected_len);
    if !bytes[1..available].iter().all(|&b| is_utf8_continuation(b)) {
        return Utf8Decode::Invalid;
    }

    if bytes.len() < expected_len {
        return Utf8Decode::Incomplete { expected_len };
    }

    let (first_mask, min_code_point) = match expected_len {
        2 => (UTF8_2BYTE_FIRST_MASK, 0x80),
        3 => (UTF8_3BYTE_FIRST_MASK, 0x800),
        _ => (UTF8_4BYTE_FIRST_MASK, 0x1_0000),
    };

    let code_point = bytes[1..expected_len]
        .iter()
        .fold(u32::from(lead & first_mask), |acc, &b| {
            (acc << 6) | u32::from(b & UTF8_CONTINUATION_DATA_MASK)
        });

    if code_point < min_code_point {
        return Utf8Decode::Invalid;
    }

    match char::from_u32(code_point) {
        Some(ch) => Utf8Decode::Complete {
            ch,
            len: expected_len,
        },
        None => Utf8Decode::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case("a" ; "ascii")]
    #[test_case("é" ; "two bytes")]
    #[test_case("€" ; "three bytes")]
    #[test_case("😀" ; "four bytes")]
    fn test_complete(text: &str) {
        let ch = text.chars().next().unwrap();
        assert_eq!(
            decode_utf8_prefix(text.as_bytes()),
            Utf8Decode::Complete {
                ch,
                len: text.len()
            }
        );
    }

    #[test]
    fn test_trailing_bytes_are_not_consumed() {
        assert_eq!(
            decode_utf8_prefix("éa".as_bytes()),
            Utf8Decode::Complete { ch: 'é', len: 2 }
        );
    }

    #[test]
    fn test_incomplete_three_byte_sequence() {
        let bytes = "€".as_bytes();
        assert_eq!(
            decode_utf8_prefix(&bytes[..1]),
            Utf8Decode::Incomplete { expected_len: 3 }
        );
        assert_eq!(
            decode_utf8_prefix(&bytes[..2]),
            Utf8Decode::Incomplete { expected_len: 3 }
        );
    }

    #[test_case(&[0x80] ; "lone continuation byte")]
    #[test_case(&[0xFF] ; "never valid")]
    #[test_case(&[0xC3, b'a'] ; "lead followed by ascii")]
    #[test_case(&[0xC0, 0x80] ; "overlong nul")]
    #[test_case(&[0xED, 0xA0, 0x80] ; "surrogate")]
    #[test_case(&[0xF5, 0x80, 0x80, 0x80] ; "past max code point")]
    fn test_invalid(bytes: &[u8]) {
        assert_eq!(decode_utf8_prefix(bytes), Utf8Decode::Invalid);
    }
}
