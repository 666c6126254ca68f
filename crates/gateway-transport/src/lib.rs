//! gateway-transport
//!
//! Moves framed bytes between the gateway and its peers.
//!
//! The crate is built around a small [`Transport`] abstraction with
//! offer/poll semantics and two pipelines that pair a transport with a
//! ring buffer and a dedicated drain thread:
//!
//! - [`OutboundPipeline`] buffers published bytes and drains them to the
//!   transport, surviving back-pressure without losing data
//! - [`InboundPipeline`] polls fragments off the transport into a
//!   registered handler
//!
//! Everything here runs on plain OS threads; there is no async runtime.

pub mod config;
pub mod idle;
pub mod loopback;
pub mod publisher;
pub mod subscriber;
pub mod transport;

pub use config::PipelineSettings;
pub use idle::IdleStrategy;
pub use loopback::LoopbackTransport;
pub use publisher::OutboundPipeline;
pub use subscriber::InboundPipeline;
pub use transport::{OfferOutcome, Transport};
