//! Pushback queue: bytes a state machine hands back to be read again.
//!
//! Invariants
//! - At most [`Pushback::CAPACITY`] bytes are ever queued (the gb18030
//!   «second, third, byte» case is the worst).
//! - Bytes come out in the order they were queued, before any new input.

/// Fixed-capacity FIFO of bytes to re-present before new input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Pushback {
    bytes: [u8; Pushback::CAPACITY],
    start: u8,
    end: u8,
}

impl Pushback {
    pub(crate) const CAPACITY: usize = 3;

    /// Queues `bytes` behind anything already pending.
    ///
    /// State machines only push back after consuming at least as many bytes
    /// as they return, and the driver drains the queue before reading input,
    /// so the bound holds by construction.
    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        if usize::from(self.start) == usize::from(self.end) {
            self.clear();
        }
        let mut end = usize::from(self.end);
        if end + bytes.len() > Self::CAPACITY {
            // Compact; the pending bytes always fit after the shift.
            self.bytes.copy_within(usize::from(self.start)..end, 0);
            end -= usize::from(self.start);
            self.start = 0;
        }
        debug_assert!(end + bytes.len() <= Self::CAPACITY, "pushback overflow");
        let take = bytes.len().min(Self::CAPACITY - end);
        self.bytes[end..end + take].copy_from_slice(&bytes[..take]);
        #[allow(clippy::cast_possible_truncation)]
        {
            self.end = (end + take) as u8;
        }
    }

    /// Takes the next queued byte.
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<u8> {
        if self.start == self.end {
            return None;
        }
        let byte = self.bytes[usize::from(self.start)];
        self.start += 1;
        Some(byte)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        usize::from(self.end - self.start)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub(crate) fn clear(&mut self) {
        *self = Pushback::default();
    }
}
