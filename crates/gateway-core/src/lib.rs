//! gateway-core
//!
//! Pure gateway primitives:
//! - byte-oriented ring buffer with peek/commit semantics
//! - the matching-engine collaborator interface and its reject codes
//!
//! No networking, no protocol knowledge. Wire codecs live in
//! `gateway-protocol`; pipelines live in `gateway-transport`.

pub mod market;
pub mod ring_buffer;

pub use market::{MatchError, MatchingEngine, Side};
pub use ring_buffer::RingByteBuffer;
