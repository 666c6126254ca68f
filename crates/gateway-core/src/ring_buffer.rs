//! Fixed-capacity byte ring buffer.
//!
//! This is the shared store between pipeline producers and the drain
//! thread. Two write modes are exposed:
//!
//! - [`RingByteBuffer::try_push`]: atomic check-and-reserve. Either the
//!   whole slice fits in free space and is copied, or nothing happens.
//!   Pipelines that must not lose data call this under their lock.
//! - [`RingByteBuffer::push_overwrite`]: overwrite-on-overflow. Never
//!   refuses data; the oldest unread bytes are evicted to make room.
//!
//! Reads come in a non-consuming flavor ([`RingByteBuffer::read`]) and a
//! consuming one ([`RingByteBuffer::pop`]). The split is deliberate: the
//! outbound drain loop peeks bytes, attempts a transport send, and pops
//! only after the transport accepted them, so a failed send leaves the
//! buffer untouched for retry.
//!
//! Not synchronized; callers wrap it in a `Mutex` when shared.

/// Fixed-capacity FIFO byte store with wraparound addressing.
pub struct RingByteBuffer {
    buf: Box<[u8]>,
    /// Offset of the oldest unread byte. Meaningless while `occupied == 0`.
    head: usize,
    occupied: usize,
}

impl RingByteBuffer {
    /// Create a buffer holding at most `capacity` bytes.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            occupied: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of unread bytes currently stored.
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Number of bytes that can be pushed without evicting anything.
    pub fn free(&self) -> usize {
        self.capacity() - self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Return to the empty state unconditionally. Stored bytes are lost.
    pub fn reset(&mut self) {
        self.head = 0;
        self.occupied = 0;
    }

    /// Copy `src` into the buffer only if it fits in free space.
    ///
    /// Returns `true` if all bytes were stored, `false` if the buffer was
    /// left untouched. The check and the copy are one operation, so a
    /// caller holding a lock around this call gets a race-free reserve.
    pub fn try_push(&mut self, src: &[u8]) -> bool {
        if src.len() > self.free() {
            return false;
        }
        self.copy_in(src);
        self.occupied += src.len();
        true
    }

    /// Copy `src` into the buffer, evicting old data as needed.
    ///
    /// Writing always succeeds and never blocks. If `src` is larger than
    /// the whole capacity, only its last `capacity` bytes are retained
    /// (the oldest part of the incoming data is dropped). If the write
    /// overruns the unread head, the head is advanced past the evicted
    /// bytes and the buffer ends up full.
    pub fn push_overwrite(&mut self, src: &[u8]) {
        let capacity = self.capacity();
        let src = if src.len() > capacity {
            &src[src.len() - capacity..]
        } else {
            src
        };
        if src.is_empty() {
            return;
        }

        self.copy_in(src);
        let total = self.occupied + src.len();
        if total > capacity {
            // Oldest unread bytes were overwritten; skip the head past them.
            let evicted = total - capacity;
            self.head = (self.head + evicted) % capacity;
            self.occupied = capacity;
        } else {
            self.occupied = total;
        }
    }

    /// Copy up to `out.len()` bytes from the head without consuming them.
    ///
    /// Returns the number of bytes copied (bounded by `occupied`).
    pub fn read(&self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.occupied);
        self.copy_out(&mut out[..n]);
        n
    }

    /// Copy up to `out.len()` bytes from the head and consume them.
    ///
    /// Returns the number of bytes copied. Draining the last byte resets
    /// the buffer to its empty state.
    pub fn pop(&mut self, out: &mut [u8]) -> usize {
        let n = self.read(out);
        self.discard(n);
        n
    }

    /// Consume `n` bytes from the head without copying them anywhere.
    ///
    /// Used by the drain loop to commit a previously peeked range.
    /// Returns the number of bytes actually discarded.
    pub fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.occupied);
        self.head = (self.head + n) % self.capacity();
        self.occupied -= n;
        if self.occupied == 0 {
            self.head = 0;
        }
        n
    }

    /// Write `src` at the current tail, wrapping as needed. Does not
    /// update `occupied`; `src` must not exceed capacity.
    fn copy_in(&mut self, src: &[u8]) {
        let capacity = self.capacity();
        let tail = (self.head + self.occupied) % capacity;
        let first = src.len().min(capacity - tail);
        self.buf[tail..tail + first].copy_from_slice(&src[..first]);
        let rest = &src[first..];
        self.buf[..rest.len()].copy_from_slice(rest);
    }

    /// Fill `out` from the head, wrapping as needed; `out.len()` must not
    /// exceed `occupied`.
    fn copy_out(&self, out: &mut [u8]) {
        let capacity = self.capacity();
        let first = out.len().min(capacity - self.head);
        out[..first].copy_from_slice(&self.buf[self.head..self.head + first]);
        let rest_len = out.len() - first;
        out[first..].copy_from_slice(&self.buf[..rest_len]);
    }
}

impl std::fmt::Debug for RingByteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingByteBuffer")
            .field("capacity", &self.capacity())
            .field("occupied", &self.occupied)
            .field("head", &self.head)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_round_trip() {
        let mut rb = RingByteBuffer::new(32);
        assert!(rb.try_push(b"hello"));
        assert!(rb.try_push(b" world"));
        assert_eq!(rb.occupied(), 11);

        let mut out = [0u8; 11];
        assert_eq!(rb.pop(&mut out), 11);
        assert_eq!(&out, b"hello world");
        assert!(rb.is_empty());
    }

    #[test]
    fn try_push_refuses_when_full() {
        let mut rb = RingByteBuffer::new(8);
        assert!(rb.try_push(b"12345678"));
        assert!(!rb.try_push(b"x"));
        assert_eq!(rb.occupied(), 8);

        let mut out = [0u8; 8];
        assert_eq!(rb.pop(&mut out), 8);
        assert_eq!(&out, b"12345678");
    }

    #[test]
    fn peek_is_idempotent_and_pop_commits() {
        let mut rb = RingByteBuffer::new(16);
        assert!(rb.try_push(b"abcdef"));

        let mut a = [0u8; 4];
        let mut b = [0u8; 4];
        assert_eq!(rb.read(&mut a), 4);
        assert_eq!(rb.read(&mut b), 4);
        assert_eq!(a, b);
        assert_eq!(rb.occupied(), 6);

        let mut c = [0u8; 4];
        assert_eq!(rb.pop(&mut c), 4);
        assert_eq!(&c, b"abcd");
        assert_eq!(rb.occupied(), 2);
    }

    #[test]
    fn overwrite_evicts_oldest_unread_bytes() {
        // Capacity 16: 11 + 7 bytes pushed, so the oldest 2 are evicted.
        let mut rb = RingByteBuffer::new(16);
        rb.push_overwrite(b"HELLOWORLD!");
        rb.push_overwrite(b"1234567");
        assert_eq!(rb.occupied(), 16);

        let mut out = [0u8; 16];
        assert_eq!(rb.pop(&mut out), 16);
        assert_eq!(&out, b"LLOWORLD!1234567");
        assert!(rb.is_empty());
    }

    #[test]
    fn overwrite_with_oversized_input_keeps_the_tail() {
        let mut rb = RingByteBuffer::new(4);
        rb.push_overwrite(b"abcdefgh");
        assert_eq!(rb.occupied(), 4);

        let mut out = [0u8; 4];
        assert_eq!(rb.pop(&mut out), 4);
        assert_eq!(&out, b"efgh");
    }

    #[test]
    fn wraparound_preserves_order() {
        let mut rb = RingByteBuffer::new(8);
        let mut out = [0u8; 8];
        for round in 0u8..10 {
            let chunk = [round; 5];
            assert!(rb.try_push(&chunk));
            assert_eq!(rb.pop(&mut out[..5]), 5);
            assert_eq!(&out[..5], &chunk);
        }
    }

    #[test]
    fn pop_is_bounded_by_occupied() {
        let mut rb = RingByteBuffer::new(8);
        assert!(rb.try_push(b"abc"));
        let mut out = [0u8; 8];
        assert_eq!(rb.pop(&mut out), 3);
        assert_eq!(&out[..3], b"abc");
        assert_eq!(rb.pop(&mut out), 0);
    }

    #[test]
    fn discard_commits_without_copying() {
        let mut rb = RingByteBuffer::new(8);
        assert!(rb.try_push(b"abcdef"));
        let mut peeked = [0u8; 4];
        assert_eq!(rb.read(&mut peeked), 4);
        assert_eq!(rb.discard(4), 4);

        let mut rest = [0u8; 4];
        assert_eq!(rb.pop(&mut rest), 2);
        assert_eq!(&rest[..2], b"ef");
    }

    #[test]
    fn reset_empties_the_buffer() {
        let mut rb = RingByteBuffer::new(8);
        assert!(rb.try_push(b"abc"));
        rb.reset();
        assert!(rb.is_empty());
        assert_eq!(rb.free(), 8);
    }
}
