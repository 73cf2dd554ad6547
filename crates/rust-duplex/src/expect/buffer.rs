//! Input accumulator.
//!
//! Bytes read from the channel are appended here one at a time. A
//! successful match consumes the prefix up to the end of the match and
//! shifts the remainder down to offset zero, so early bytes of a following
//! response survive. When full, the oldest byte is evicted to make room.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

/// Bounded byte buffer with sliding-window overflow.
#[derive(Clone, PartialEq, Eq)]
pub struct InputBuffer {
    /// Logical content, oldest byte first.
    data: VecDeque<u8>,
    /// Maximum logical length.
    capacity: usize,
    /// Total bytes ever appended.
    total_received: u64,
    /// Bytes evicted because the buffer was full.
    bytes_evicted: u64,
}

impl InputBuffer {
    /// Create an empty buffer holding at most `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            // Headroom keeps wrap-around, and so `make_contiguous`, rare.
            data: VecDeque::with_capacity(capacity.saturating_mul(2)),
            capacity,
            total_received: 0,
            bytes_evicted: 0,
        }
    }

    /// Append one byte, evicting the oldest byte if the buffer is full.
    ///
    /// Returns `true` if a byte was evicted.
    pub fn push(&mut self, byte: u8) -> bool {
        self.total_received += 1;
        if self.capacity == 0 {
            self.bytes_evicted += 1;
            return true;
        }
        let evicted = self.data.len() == self.capacity;
        if evicted {
            self.data.pop_front();
            self.bytes_evicted += 1;
        }
        self.data.push_back(byte);
        evicted
    }

    /// Append a run of bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    /// Drop the first `end` bytes and shift the rest to offset zero.
    ///
    /// Returns the number of bytes removed.
    pub fn consume(&mut self, end: usize) -> usize {
        let end = end.min(self.data.len());
        self.data.drain(..end);
        end
    }

    /// Discard all content.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Current content as one contiguous slice.
    pub fn as_slice(&mut self) -> &[u8] {
        self.data.make_contiguous()
    }

    /// Current content as text, replacing invalid UTF-8.
    #[must_use]
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        match self.data.as_slices() {
            (front, []) => String::from_utf8_lossy(front),
            _ => {
                let bytes: Vec<u8> = self.data.iter().copied().collect();
                Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    /// Copy up to `out.len()` bytes of content into `out`.
    ///
    /// Returns the number of bytes copied.
    pub fn copy_to(&self, out: &mut [u8]) -> usize {
        let mut n = 0;
        for (dst, &src) in out.iter_mut().zip(&self.data) {
            *dst = src;
            n += 1;
        }
        n
    }

    /// Current logical length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maximum logical length.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total bytes ever appended.
    #[must_use]
    pub const fn total_received(&self) -> u64 {
        self.total_received
    }

    /// Bytes evicted by the sliding window.
    #[must_use]
    pub const fn bytes_evicted(&self) -> u64 {
        self.bytes_evicted
    }
}

impl fmt::Debug for InputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputBuffer")
            .field("content", &self.as_str_lossy())
            .field("capacity", &self.capacity)
            .field("total_received", &self.total_received)
            .field("bytes_evicted", &self.bytes_evicted)
            .finish()
    }
}
