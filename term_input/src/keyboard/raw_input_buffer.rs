// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Bounded byte buffer holding keyboard bytes that have been read but not yet decoded.

use smallvec::SmallVec;

/// Default capacity, matching the size of a typical terminal FIFO.
pub const DEFAULT_INPUT_BUFFER_CAPACITY: usize = 512;

/// Smallest and largest capacity accepted by [`RawInputBuffer::new`].
pub const MIN_INPUT_BUFFER_CAPACITY: usize = 16;
pub const MAX_INPUT_BUFFER_CAPACITY: usize = 4096;

/// Bounded buffer that behaves like a ring buffer: consumed bytes are dropped from the
/// front lazily, when the consumed portion exceeds half the capacity or when room is
/// needed for an append.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │ data: [consumed bytes...][unconsumed bytes...]              │
/// │                          ^                                  │
/// │                          position                           │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// The number of unconsumed bytes never exceeds [`capacity`]. [`append`] takes as many
/// bytes as fit and reports how many it took; the caller decides what to do with the
/// rest.
///
/// [`append`]: RawInputBuffer::append
/// [`capacity`]: RawInputBuffer::capacity
#[derive(Debug, Clone)]
pub struct RawInputBuffer {
    data: SmallVec<[u8; DEFAULT_INPUT_BUFFER_CAPACITY]>,
    position: usize,
    capacity: usize,
}

impl Default for RawInputBuffer {
    fn default() -> Self { Self::new(DEFAULT_INPUT_BUFFER_CAPACITY) }
}

impl RawInputBuffer {
    /// `capacity` is clamped to
    /// [`MIN_INPUT_BUFFER_CAPACITY`]..=[`MAX_INPUT_BUFFER_CAPACITY`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_INPUT_BUFFER_CAPACITY, MAX_INPUT_BUFFER_CAPACITY);
        Self {
            data: SmallVec::new(),
            position: 0,
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    #[must_use]
    pub fn unconsumed(&self) -> &[u8] { &self.data[self.position..] }

    /// Number of unconsumed bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() - self.position }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    #[must_use]
    pub fn is_full(&self) -> bool { self.len() >= self.capacity }

    #[must_use]
    pub fn free_space(&self) -> usize { self.capacity - self.len() }

    /// Append as many of `bytes` as fit. Returns the number appended.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(self.free_space());
        if count == 0 {
            return 0;
        }
        if self.data.len() + count > self.capacity {
            self.compact();
        }
        self.data.extend_from_slice(&bytes[..count]);
        count
    }

    /// Drop `count` bytes from the front of the unconsumed region.
    pub fn consume(&mut self, count: usize) {
        self.position = (self.position + count).min(self.data.len());

        if self.position == self.data.len() {
            self.data.clear();
            self.position = 0;
        } else if self.position > self.capacity / 2 {
            self.compact();
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.position = 0;
    }

    fn compact(&mut self) {
        self.data.drain(..self.position);
        self.position = 0;
    }
}
