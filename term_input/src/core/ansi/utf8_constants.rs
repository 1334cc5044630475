// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! UTF-8 lead and continuation byte patterns.

/// Largest single byte value, 0x00-0x7F.
pub const UTF8_1BYTE_MAX: u8 = 0x7F;

/// Lead byte ranges for multi-byte sequences.
pub const UTF8_2BYTE_MIN: u8 = 0xC0;
pub const UTF8_2BYTE_MAX: u8 = 0xDF;
pub const UTF8_3BYTE_MIN: u8 = 0xE0;
pub const UTF8_3BYTE_MAX: u8 = 0xEF;
pub const UTF8_4BYTE_MIN: u8 = 0xF0;
pub const UTF8_4BYTE_MAX: u8 = 0xF7;

/// Continuation bytes look like `10xx_xxxx`.
pub const UTF8_CONTINUATION_MASK: u8 = 0xC0;
pub const UTF8_CONTINUATION_PATTERN: u8 = 0x80;
pub const UTF8_CONTINUATION_DATA_MASK: u8 = 0x3F;

/// Payload bits of the lead byte, by sequence length.
pub const UTF8_2BYTE_FIRST_MASK: u8 = 0x1F;
pub const UTF8_3BYTE_FIRST_MASK: u8 = 0x0F;
pub const UTF8_4BYTE_FIRST_MASK: u8 = 0x07;
