//! Bounded circular character queue
//!
//! The transport between the line discipline and the hardware backends.
//! Capacity is fixed at allocation time and must be a power of two so
//! that index wraparound is a single mask. Hardware interrupt handlers
//! may enqueue asynchronously; everything else runs on the single
//! cooperative service thread, so the queue itself carries no lock.
//!
//! Blocking behavior (wait-for-data, wait-for-room) lives in the line
//! discipline, which suspends on the queue's wait channel through the
//! [`Kernel`](crate::kernel::Kernel) collaborator.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::errno::Errno;

/// Fixed-capacity circular byte buffer.
pub struct CharQueue {
    buf: Box<[u8]>,
    start: usize,
    len: usize,
}

impl CharQueue {
    /// An unallocated queue: capacity 0, always full, never readable.
    ///
    /// Terminal slots hold this until a backend open allocates real
    /// buffers.
    pub fn empty() -> Self {
        Self {
            buf: Vec::new().into_boxed_slice(),
            start: 0,
            len: 0,
        }
    }

    /// Allocate a queue of `capacity` bytes.
    ///
    /// `capacity` must be a power of two. Allocation failure is
    /// reported as `OutOfMemory` rather than aborting, so an open can
    /// unwind cleanly.
    pub fn with_capacity(capacity: usize) -> Result<Self, Errno> {
        assert!(capacity.is_power_of_two(), "queue capacity must be a power of two");
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity).map_err(|_| Errno::OutOfMemory)?;
        buf.resize(capacity, 0);
        Ok(Self {
            buf: buf.into_boxed_slice(),
            start: 0,
            len: 0,
        })
    }

    /// Number of bytes currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Buffer capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Append a byte, or `WouldBlock` if the queue is full.
    pub fn push(&mut self, ch: u8) -> Result<(), Errno> {
        if self.is_full() {
            return Err(Errno::WouldBlock);
        }
        let mask = self.buf.len() - 1;
        self.buf[(self.start + self.len) & mask] = ch;
        self.len += 1;
        Ok(())
    }

    /// Look at the head byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        Some(self.buf[self.start])
    }

    /// Consume and return the head byte.
    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let ch = self.buf[self.start];
        self.start = (self.start + 1) & (self.buf.len() - 1);
        self.len -= 1;
        Some(ch)
    }

    /// Discard all queued bytes.
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::VecDeque;
    use proptest::prelude::*;

    #[test]
    fn push_pop_roundtrip() {
        let mut q = CharQueue::with_capacity(8).unwrap();
        assert!(q.is_empty());

        for b in b"hello" {
            q.push(*b).unwrap();
        }
        assert_eq!(q.len(), 5);
        assert_eq!(q.peek(), Some(b'h'));
        assert_eq!(q.pop(), Some(b'h'));
        assert_eq!(q.pop(), Some(b'e'));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn full_queue_rejects_push() {
        let mut q = CharQueue::with_capacity(4).unwrap();
        for b in 0..4u8 {
            q.push(b).unwrap();
        }
        assert!(q.is_full());
        assert_eq!(q.push(99), Err(Errno::WouldBlock));

        // Room opens up after a pop.
        assert_eq!(q.pop(), Some(0));
        q.push(99).unwrap();
    }

    #[test]
    fn wraparound_preserves_order() {
        let mut q = CharQueue::with_capacity(4).unwrap();
        // Walk the start index all the way around the buffer.
        for round in 0..10u8 {
            q.push(round).unwrap();
            q.push(round.wrapping_add(100)).unwrap();
            assert_eq!(q.pop(), Some(round));
            assert_eq!(q.pop(), Some(round.wrapping_add(100)));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn empty_queue_is_inert() {
        let mut q = CharQueue::empty();
        assert_eq!(q.capacity(), 0);
        assert!(q.is_full());
        assert_eq!(q.peek(), None);
        assert_eq!(q.pop(), None);
        assert_eq!(q.push(1), Err(Errno::WouldBlock));
    }

    #[test]
    fn clear_resets_state() {
        let mut q = CharQueue::with_capacity(8).unwrap();
        for b in b"abc" {
            q.push(*b).unwrap();
        }
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn non_power_of_two_capacity_is_a_bug() {
        let _ = CharQueue::with_capacity(6);
    }

    proptest! {
        // Any interleaving of pushes and pops over a power-of-two
        // capacity behaves exactly like an unbounded FIFO truncated at
        // capacity, and index arithmetic never escapes the buffer.
        #[test]
        fn behaves_like_fifo(cap_pow in 0u32..8, ops in prop::collection::vec(any::<Option<u8>>(), 0..400)) {
            let cap = 1usize << cap_pow;
            let mut q = CharQueue::with_capacity(cap).unwrap();
            let mut model: VecDeque<u8> = VecDeque::new();

            for op in ops {
                match op {
                    Some(b) => {
                        if model.len() < cap {
                            model.push_back(b);
                            prop_assert!(q.push(b).is_ok());
                        } else {
                            prop_assert_eq!(q.push(b), Err(Errno::WouldBlock));
                        }
                    }
                    None => {
                        prop_assert_eq!(q.pop(), model.pop_front());
                    }
                }
                prop_assert_eq!(q.len(), model.len());
                prop_assert_eq!(q.peek(), model.front().copied());
                prop_assert_eq!(q.is_full(), model.len() == cap);
            }
        }
    }
}
