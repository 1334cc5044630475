// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Key decoding automaton. See [`KeyDecoder`] docs.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::{DecodeDiscard, KeyCode, KeyEvent, KeyMap, KeyMapMatch, KeyModifiers,
            MatchPolicy, MouseParse, MouseProtocol, RawInputBuffer, Utf8Decode,
            decode_control_byte, decode_utf8_prefix, parse_mouse_report};
use crate::{ANSI_ESC, LivenessState, UTF8_1BYTE_MAX};

/// Verbose per-event logging for the decoder.
pub const DEBUG_KEY_DECODER: bool = false;

/// Oldest entries are dropped once the discard record holds this many.
pub const MAX_DISCARD_RECORD_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum Utf8Mode {
    #[default]
    Enabled,
    /// Bytes 0x80-0xFF decode as Latin-1 characters.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum MouseMode {
    #[default]
    Enabled,
    /// Mouse reports are not recognized; their bytes go through the key path.
    Disabled,
}

/// How to treat a sequence that could still grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// More bytes may arrive: keep ambiguous prefixes buffered.
    WaitForMore,
    /// The disambiguation timeout fired (or input ended): pick the shortest
    /// interpretation of whatever is buffered.
    Finalize,
}

/// Result of one decode step at the head of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Emit { len: usize, event: KeyEvent },
    Discard { len: usize, reason: DecodeDiscard },
    NeedMore,
}

/// Turns raw terminal bytes into [`KeyEvent`]s.
///
/// Bytes are fed in whatever chunks the terminal delivers them. Each call to [`feed`]
/// decodes as much as it can; whatever is left in the buffer afterwards is the pending
/// prefix: bytes that could be a complete key on their own, or the start of a longer
/// sequence. A pending prefix is resolved either by more bytes (the next [`feed`]) or by
/// [`finalize_pending`], which the owner calls when the disambiguation timeout fires.
///
/// Decode order at the head of the buffer:
/// 1. Mouse reports (X11 / SGR / URXVT), when [`MouseMode::Enabled`].
/// 2. The capability [`KeyMap`], under the configured [`MatchPolicy`].
/// 3. `ESC` followed by a decodable key is that key with Alt. A lone `ESC` waits, and
///    becomes Escape when finalized.
/// 4. Control bytes, then ASCII, then UTF-8 (or Latin-1 when [`Utf8Mode::Disabled`]).
///
/// A byte that none of these accept is dropped (recorded as a [`DecodeDiscard`]) and
/// decoding resumes with the next byte, so the decoder can never get stuck.
///
/// Decoded events are queued in arrival order. Drain them with [`next_event`], the
/// [`Iterator`] impl, or [`drain_events`].
///
/// [`drain_events`]: KeyDecoder::drain_events
/// [`feed`]: KeyDecoder::feed
/// [`finalize_pending`]: KeyDecoder::finalize_pending
/// [`next_event`]: KeyDecoder::next_event
#[derive(Debug)]
pub struct KeyDecoder {
    buffer: RawInputBuffer,
    key_map: KeyMap,
    match_policy: MatchPolicy,
    utf8_mode: Utf8Mode,
    mouse_mode: MouseMode,
    events: VecDeque<KeyEvent>,
    discards: VecDeque<DecodeDiscard>,
    discard_count: u64,
    liveness: LivenessState,
}

impl KeyDecoder {
    #[must_use]
    pub fn new(key_map: KeyMap) -> Self {
        Self {
            buffer: RawInputBuffer::default(),
            key_map,
            match_policy: MatchPolicy::default(),
            utf8_mode: Utf8Mode::default(),
            mouse_mode: MouseMode::default(),
            events: VecDeque::with_capacity(64),
            discards: VecDeque::new(),
            discard_count: 0,
            liveness: LivenessState::Alive,
        }
    }

    /// Drops any buffered bytes.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer = RawInputBuffer::new(capacity);
        self
    }

    #[must_use]
    pub fn with_match_policy(mut self, match_policy: MatchPolicy) -> Self {
        self.match_policy = match_policy;
        self
    }

    #[must_use]
    pub fn with_utf8_mode(mut self, utf8_mode: Utf8Mode) -> Self {
        self.utf8_mode = utf8_mode;
        self
    }

    #[must_use]
    pub fn with_mouse_mode(mut self, mouse_mode: MouseMode) -> Self {
        self.mouse_mode = mouse_mode;
        self
    }

    pub fn set_utf8_mode(&mut self, utf8_mode: Utf8Mode) { self.utf8_mode = utf8_mode; }

    pub fn set_mouse_mode(&mut self, mouse_mode: MouseMode) { self.mouse_mode = mouse_mode; }

    #[must_use]
    pub fn utf8_mode(&self) -> Utf8Mode { self.utf8_mode }

    #[must_use]
    pub fn mouse_mode(&self) -> MouseMode { self.mouse_mode }

    #[must_use]
    pub fn key_map(&self) -> &KeyMap { &self.key_map }

    /// Room left in the input buffer. Readers size their next read with this so a
    /// single read never overflows it.
    #[must_use]
    pub fn free_space(&self) -> usize { self.buffer.free_space() }

    /// Append `bytes` and decode as much as possible.
    pub fn feed(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let appended = self.buffer.append(bytes);
            bytes = &bytes[appended..];
            // When nothing fit, this drops the oldest byte to make room.
            self.decode(Resolution::WaitForMore);
        }
    }

    /// Resolve the pending prefix with its shortest interpretation. Called when the
    /// disambiguation timeout fires, when the owner cancels the wait, and at end of
    /// input. Leaves the buffer empty.
    pub fn finalize_pending(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        DEBUG_KEY_DECODER.then(|| {
            tracing::debug!(
                message = "Finalizing pending prefix",
                pending = ?self.buffer.unconsumed()
            );
        });
        self.decode(Resolution::Finalize);
    }

    /// Finalize anything pending and remember that the input source has closed.
    pub fn mark_input_closed(&mut self) {
        self.finalize_pending();
        self.liveness = LivenessState::Closed;
    }

    #[must_use]
    pub fn is_input_closed(&self) -> bool { self.liveness == LivenessState::Closed }

    /// Bytes are buffered waiting for more input or the disambiguation timeout.
    #[must_use]
    pub fn has_pending_prefix(&self) -> bool { !self.buffer.is_empty() }

    #[must_use]
    pub fn pending_bytes(&self) -> &[u8] { self.buffer.unconsumed() }

    /// Either undecoded bytes or decoded events that haven't been taken yet.
    #[must_use]
    pub fn has_unprocessed_input(&self) -> bool {
        !self.buffer.is_empty() || !self.events.is_empty()
    }

    /// Forget buffered bytes and queued events.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.events.clear();
    }

    pub fn next_event(&mut self) -> Option<KeyEvent> { self.events.pop_front() }

    pub fn drain_events(&mut self) -> std::collections::vec_deque::Drain<'_, KeyEvent> {
        self.events.drain(..)
    }

    pub fn drain_discards(&mut self) -> std::collections::vec_deque::Drain<'_, DecodeDiscard> {
        self.discards.drain(..)
    }

    /// Total discards since creation, including ones no longer in the record.
    #[must_use]
    pub fn discard_count(&self) -> u64 { self.discard_count }

    fn decode(&mut self, resolution: Resolution) {
        loop {
            let bytes = self.buffer.unconsumed();
            let Some(&head) = bytes.first() else {
                break;
            };

            match self.step(bytes, resolution) {
                Step::Emit { len, event } => {
                    self.buffer.consume(len);
                    DEBUG_KEY_DECODER.then(|| {
                        tracing::trace!(message = "Decoded key", event = %event, len);
                    });
                    self.events.push_back(event);
                }
                Step::Discard { len, reason } => {
                    self.buffer.consume(len);
                    self.record_discard(reason);
                }
                Step::NeedMore => {
                    if self.buffer.is_full() {
                        self.buffer.consume(1);
                        self.record_discard(DecodeDiscard::BufferOverflow { byte: head });
                    } else if resolution == Resolution::Finalize {
                        // Finalize never waits; drop the head to guarantee progress.
                        self.buffer.consume(1);
                        self.record_discard(DecodeDiscard::InvalidByte { byte: head });
                    } else {
                        break;
                    }
                }
            }
        }
    }

    fn record_discard(&mut self, reason: DecodeDiscard) {
        tracing::warn!(message = "Discarded input", reason = %reason);
        if self.discards.len() == MAX_DISCARD_RECORD_LEN {
            self.discards.pop_front();
        }
        self.discards.push_back(reason);
        self.discard_count += 1;
    }

    fn step(&self, bytes: &[u8], resolution: Resolution) -> Step {
        // URXVT shares its prefix (`CSI` + digits) with key sequences. A partial URXVT
        // report only holds the bytes back if the key map doesn't claim them.
        let mut urxvt_pending = false;

        if self.mouse_mode == MouseMode::Enabled {
            match parse_mouse_report(bytes) {
                MouseParse::Complete { len, event } => return Step::Emit { len, event },
                MouseParse::Malformed { len, protocol } => {
                    return Step::Discard {
                        len,
                        reason: DecodeDiscard::MalformedMouse { protocol, len },
                    };
                }
                MouseParse::Incomplete { protocol } => match (resolution, protocol) {
                    (Resolution::WaitForMore, Some(MouseProtocol::Urxvt)) => {
                        urxvt_pending = true;
                    }
                    (Resolution::WaitForMore, _) => return Step::NeedMore,
                    (
                        Resolution::Finalize,
                        Some(protocol @ (MouseProtocol::X11 | MouseProtocol::Sgr)),
                    ) => {
                        let len = bytes.len();
                        return Step::Discard {
                            len,
                            reason: DecodeDiscard::MalformedMouse { protocol, len },
                        };
                    }
                    (Resolution::Finalize, Some(MouseProtocol::Urxvt) | None) => {}
                },
                MouseParse::NotMouse => {}
            }
        }

        match self.key_map.lookup(bytes, self.match_policy) {
            KeyMapMatch::Complete { len, key } => {
                return Step::Emit {
                    len,
                    event: key.into(),
                };
            }
            KeyMapMatch::Prefix { fallback } => match (resolution, fallback) {
                (Resolution::WaitForMore, _) => return Step::NeedMore,
                (Resolution::Finalize, Some((len, key))) => {
                    return Step::Emit {
                        len,
                        event: key.into(),
                    };
                }
                (Resolution::Finalize, None) => {}
            },
            KeyMapMatch::NoMatch => {}
        }

        if urxvt_pending {
            return Step::NeedMore;
        }

        if bytes[0] == ANSI_ESC {
            return self.step_escape(bytes, resolution);
        }

        self.step_single_key(bytes, resolution)
    }

    /// `bytes` starts with `ESC`, which is not the start of any key map entry that could
    /// still complete. `ESC` + key is Meta (Alt) + key.
    fn step_escape(&self, bytes: &[u8], resolution: Resolution) -> Step {
        let escape = Step::Emit {
            len: 1,
            event: KeyEvent::press(KeyCode::Escape, KeyModifiers::NONE),
        };
        let with_alt = |len: usize, event: KeyEvent| Step::Emit {
            len: len + 1,
            event: KeyEvent::press(event.code, event.modifiers.with_alt()),
        };

        let rest = &bytes[1..];
        if rest.is_empty() {
            return match resolution {
                Resolution::WaitForMore => Step::NeedMore,
                Resolution::Finalize => escape,
            };
        }

        // `ESC` + a key map sequence, eg: rxvt sends `ESC ESC [ A` for Alt+Up.
        match self.key_map.lookup(rest, self.match_policy) {
            KeyMapMatch::Complete { len, key } => return with_alt(len, key.into()),
            KeyMapMatch::Prefix { fallback } => match (resolution, fallback) {
                (Resolution::WaitForMore, _) => return Step::NeedMore,
                (Resolution::Finalize, Some((len, key))) => return with_alt(len, key.into()),
                (Resolution::Finalize, None) => {}
            },
            KeyMapMatch::NoMatch => {}
        }

        if rest[0] == ANSI_ESC {
            return with_alt(
                1,
                KeyEvent::press(KeyCode::Escape, KeyModifiers::NONE),
            );
        }

        match self.step_single_key(rest, resolution) {
            Step::Emit { len, event } => with_alt(len, event),
            Step::NeedMore => Step::NeedMore,
            // The byte after ESC is garbage: ESC stands alone, the garbage is dropped
            // on the next step.
            Step::Discard { .. } => escape,
        }
    }

    fn step_single_key(&self, bytes: &[u8], resolution: Resolution) -> Step {
        let head = bytes[0];

        if let Some(event) = decode_control_byte(head) {
            return Step::Emit { len: 1, event };
        }

        if head <= UTF8_1BYTE_MAX || self.utf8_mode == Utf8Mode::Disabled {
            // ASCII, or Latin-1 when UTF-8 is off.
            return Step::Emit {
                len: 1,
                event: KeyEvent::char(char::from(head)),
            };
        }

        match decode_utf8_prefix(bytes) {
            Utf8Decode::Complete { ch, len } => Step::Emit {
                len,
                event: KeyEvent::char(ch),
            },
            Utf8Decode::Incomplete { expected_len } => match resolution {
                Resolution::WaitForMore => Step::NeedMore,
                Resolution::Finalize => Step::Discard {
                    len: 1,
                    reason: DecodeDiscard::IncompleteSequence {
                        byte: head,
                        expected_len,
                    },
                },
            },
            Utf8Decode::Invalid => Step::Discard {
                len: 1,
                reason: DecodeDiscard::InvalidByte { byte: head },
            },
        }
    }
}

impl Iterator for KeyDecoder {
    type Item = KeyEvent;

    fn next(&mut self) -> Option<Self::Item> { self.next_event() }
}


#[cfg(test)]
mod tests_basic_decoding {
    use pretty_assertions::assert_eq;

    use super::test_fixtures::*;

    #[test]
    fn ascii_chars_single_read() {
        let mut decoder = xterm_decoder();
        decoder.feed(b"abc");

        let events: Vec<_> = (&mut decoder).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], KeyEvent::char('a'));
        assert_eq!(events[2], KeyEvent::char('c'));
        assert!(!decoder.has_pending_prefix());
    }

    #[test]
    fn control_chars() {
        let mut decoder = xterm_decoder();
        decoder.feed(b"\r\t\x7f\x01");

        let events: Vec<_> = decoder.drain_events().collect();
        assert_eq!(
            events,
            vec![
                key(KeyCode::Enter),
                key(KeyCode::Tab),
                key(KeyCode::Backspace),
                KeyEvent::press(KeyCode::Char('a'), KeyModifiers::CTRL),
            ]
        );
    }

    #[test]
    fn function_key_in_one_read() {
        let mut decoder = xterm_decoder();
        decoder.feed(b"\x1b[15~");

        assert_eq!(decoder.next_event(), Some(key(KeyCode::Function(5))));
        assert_eq!(decoder.next_event(), None);
        assert!(!decoder.has_pending_prefix());
    }

    #[test]
    fn modified_arrow() {
        let mut decoder = xterm_decoder();
        decoder.feed(b"\x1b[1;5A");
        assert_eq!(
            decoder.next_event(),
            Some(KeyEvent::press(KeyCode::Up, KeyModifiers::CTRL))
        );
    }

    #[test]
    fn keys_and_text_interleaved() {
        let mut decoder = xterm_decoder();
        decoder.feed(b"x\x1b[Ay");

        let events: Vec<_> = (&mut decoder).collect();
        assert_eq!(
            events,
            vec![KeyEvent::char('x'), key(KeyCode::Up), KeyEvent::char('y')]
        );
    }

    #[test]
    fn custom_key_map_entry() {
        let map = KeyMap::new().with(b"\x1b[99z", KeyCode::Insert);
        let mut decoder = KeyDecoder::new(map);
        decoder.feed(b"\x1b[99z");
        assert_eq!(decoder.next_event(), Some(key(KeyCode::Insert)));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut decoder = xterm_decoder();
        decoder.feed(b"a\x1b[");
        assert!(decoder.has_unprocessed_input());

        decoder.clear();
        assert!(!decoder.has_unprocessed_input());
        assert!(!decoder.has_pending_prefix());
    }

    #[test]
    fn first_match_policy_does_not_wait_for_longer_entry() {
        let map = KeyMap::new()
            .with(b"\x1b[1", KeyCode::Home)
            .with(b"\x1b[15~", KeyCode::Function(5));
        let mut decoder = KeyDecoder::new(map).with_match_policy(MatchPolicy::FirstMatch);
        decoder.feed(b"\x1b[1");
        assert_eq!(decoder.next_event(), Some(key(KeyCode::Home)));
        assert!(!decoder.has_pending_prefix());
    }
}


#[cfg(test)]
mod tests_chunked_input {
    use pretty_assertions::assert_eq;

    use super::test_fixtures::*;

    #[test]
    fn every_split_of_a_sequence_yields_one_event() {
        let sequence = b"\x1b[24;5~";
        let expected = KeyEvent::press(KeyCode::Function(12), KeyModifiers::CTRL);

        for split in 1..sequence.len() {
            let mut decoder = xterm_decoder();
            decoder.feed(&sequence[..split]);
            assert_eq!(decoder.next_event(), None, "split at {split}");
            decoder.feed(&sequence[split..]);

            let events: Vec<_> = (&mut decoder).collect();
            assert_eq!(events, vec![expected], "split at {split}");
        }
    }

    #[test]
    fn byte_at_a_time() {
        let mut decoder = xterm_decoder();
        for byte in b"\x1b[1;3D" {
            decoder.feed(&[*byte]);
        }
        let events: Vec<_> = (&mut decoder).collect();
        assert_eq!(events, vec![alt(KeyCode::Left)]);
    }
}
