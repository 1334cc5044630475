// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::Diagnostic;

use super::MouseProtocol;

/// Bytes the [`KeyDecoder`] dropped. Never returned as an `Err`; the decoder logs each
/// one and keeps a bounded record that callers can [`drain`].
///
/// [`KeyDecoder`]: crate::KeyDecoder
/// [`drain`]: crate::KeyDecoder::drain_discards
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum DecodeDiscard {
    #[error("Dropped byte {byte:#04x}: not a key, not valid UTF-8")]
    #[diagnostic(code(r3bl_term_input::decoder::invalid_byte))]
    InvalidByte { byte: u8 },

    #[error(
        "Dropped UTF-8 lead byte {byte:#04x}: its {expected_len} byte sequence never completed"
    )]
    #[diagnostic(
        code(r3bl_term_input::decoder::incomplete_sequence),
        help("The disambiguation timeout fired before the rest of the character arrived")
    )]
    IncompleteSequence { byte: u8, expected_len: usize },

    #[error("Dropped {len} byte malformed {protocol} mouse report")]
    #[diagnostic(code(r3bl_term_input::decoder::malformed_mouse))]
    MalformedMouse { protocol: MouseProtocol, len: usize },

    #[error("Dropped byte {byte:#04x}: input buffer full")]
    #[diagnostic(
        code(r3bl_term_input::decoder::buffer_overflow),
        help("Input arrived faster than it could be decoded, or the buffer capacity is too small for the sequences in use")
    )]
    BufferOverflow { byte: u8 },
}
