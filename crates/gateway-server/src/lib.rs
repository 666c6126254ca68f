//! gateway-server
//!
//! Glue between the wire protocols and the matching engine:
//!
//! - [`OrderEntrySession`] decodes order-entry requests, applies them to
//!   the engine and answers with accept/reject/replace/cancel events
//! - [`MarketDataSession`] consumes the market-data feed to build books
//!   and republishes it downstream
//! - [`InMemoryEngine`] is a book-keeping [`gateway_core::MatchingEngine`]
//!   used by the demo binary and the integration tests

pub mod app;
pub mod engine;
pub mod itch_session;
pub mod ouch_session;

pub use engine::InMemoryEngine;
pub use itch_session::MarketDataSession;
pub use ouch_session::OrderEntrySession;
