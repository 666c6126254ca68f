//! gateway-protocol
//!
//! Wire-level encoding/decoding for the exchange gateway.
//!
//! This crate turns raw bytes into strongly-typed protocol events and
//! back again, for two fixed-layout binary protocols:
//!
//! - [`itch`]   : market-data distribution feed
//! - [`ouch`]   : order entry (requests in, events out)
//! - [`framer`] : length-prefixed stream reassembly shared by both
//!
//! All multi-byte integers are big-endian; fixed character fields occupy
//! exactly their declared width with no padding or termination.

pub mod framer;
pub mod itch;
pub mod ouch;
pub mod wire;

pub use framer::{Framer, LENGTH_PREFIX_SIZE};
pub use itch::ItchMessage;
pub use ouch::{OuchEvent, OuchRequest, MARKET_ORDER_PRICE};
pub use wire::CodecError;
