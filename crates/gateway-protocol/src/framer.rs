//! Length-prefixed stream reassembly.
//!
//! Both wire protocols are framed over a byte stream as a 2-byte
//! big-endian length prefix followed by that many message bytes. The
//! transport delivers the stream in fragments split at arbitrary points,
//! down to a single byte, so the framer keeps one persistent state per
//! connection:
//!
//! - `expected`: the declared message length, 0 while the prefix itself
//!   is still being assembled
//! - `cache`: bytes of the in-flight prefix or message collected across
//!   fragment boundaries
//!
//! At most one message is ever in flight in the cache, and the cache is
//! cleared the instant a prefix is resolved or a message completes.

use crate::wire::CodecError;

/// Bytes of the big-endian length prefix preceding each framed message.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Length-prefix reassembly state machine. One instance per connection.
#[derive(Debug, Default)]
pub struct Framer {
    /// Declared length of the in-flight message; 0 = prefix unknown.
    expected: usize,
    cache: Vec<u8>,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all framing state; used on connection restart.
    pub fn reset(&mut self) {
        self.expected = 0;
        self.cache.clear();
    }

    /// True while a partial prefix or message is buffered.
    pub fn has_partial(&self) -> bool {
        self.expected != 0 || !self.cache.is_empty()
    }

    /// Consume one fragment, invoking `on_message` once per completed
    /// message, in order.
    ///
    /// A failing `on_message` aborts the call immediately: the remaining
    /// fragment bytes are not processed and the in-flight framing state
    /// is left as-is. Callers that continue after a failure should
    /// [`reset`](Self::reset) first; there is no partial-failure
    /// redelivery.
    pub fn process<E, F>(&mut self, fragment: &[u8], mut on_message: F) -> Result<(), E>
    where
        F: FnMut(&[u8]) -> Result<(), E>,
    {
        let mut index = 0;
        while index < fragment.len() {
            if self.expected == 0 {
                let remaining = fragment.len() - index;
                if self.cache.is_empty() && remaining >= LENGTH_PREFIX_SIZE {
                    // Prefix available in one piece; read it in place.
                    self.expected =
                        u16::from_be_bytes([fragment[index], fragment[index + 1]]) as usize;
                    index += LENGTH_PREFIX_SIZE;
                } else {
                    // Assemble the prefix across fragment boundaries.
                    let take = (LENGTH_PREFIX_SIZE - self.cache.len()).min(remaining);
                    self.cache.extend_from_slice(&fragment[index..index + take]);
                    index += take;
                    if self.cache.len() < LENGTH_PREFIX_SIZE {
                        return Ok(());
                    }
                    self.expected = u16::from_be_bytes([self.cache[0], self.cache[1]]) as usize;
                    self.cache.clear();
                }
                // A zero-length prefix declares nothing; loop straight
                // into reading the next prefix.
                continue;
            }

            let remaining = fragment.len() - index;
            if !self.cache.is_empty() {
                // Top up the partially cached message.
                let take = (self.expected - self.cache.len()).min(remaining);
                self.cache.extend_from_slice(&fragment[index..index + take]);
                index += take;
                if self.cache.len() < self.expected {
                    return Ok(());
                }
                on_message(&self.cache)?;
                self.cache.clear();
                self.expected = 0;
            } else if remaining < self.expected {
                // Not enough for a whole message; cache what we have.
                self.cache.reserve(self.expected);
                self.cache.extend_from_slice(&fragment[index..]);
                return Ok(());
            } else {
                // Whole message sits in the fragment; no copy needed.
                on_message(&fragment[index..index + self.expected])?;
                index += self.expected;
                self.expected = 0;
            }
        }
        Ok(())
    }

    /// Append `payload` to `out` behind its 2-byte length prefix.
    ///
    /// This is the outbound counterpart of [`process`](Self::process):
    /// serialized messages are framed here before being published.
    pub fn frame_into(payload: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        let len = u16::try_from(payload.len()).map_err(|_| CodecError::Oversized)?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(payload);
        Ok(())
    }
}
