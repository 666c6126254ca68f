//! The matching-engine collaborator interface.
//!
//! The gateway never matches orders itself. Decoded protocol events are
//! applied to an implementation of [`MatchingEngine`], one operation per
//! business event. Implementations return a [`MatchError`] from a closed
//! set of rejection reasons; the protocol glue decides whether a given
//! rejection maps onto an outbound reject message.

use std::fmt;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Wire representation used by both protocols.
    pub fn to_wire(self) -> u8 {
        match self {
            Side::Buy => b'B',
            Side::Sell => b'S',
        }
    }

    /// Both protocols use `'B'` for buy; anything else reads as sell,
    /// matching the original handler behavior.
    pub fn from_wire(c: u8) -> Side {
        if c == b'B' {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

/// Rejection reasons a matching engine may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    DuplicateSymbol,
    SymbolNotFound,
    DuplicateOrderId,
    OrderNotFound,
    InvalidParameter,
    InvalidQuantity,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::DuplicateSymbol => write!(f, "duplicate symbol"),
            MatchError::SymbolNotFound => write!(f, "symbol not found"),
            MatchError::DuplicateOrderId => write!(f, "duplicate order id"),
            MatchError::OrderNotFound => write!(f, "order not found"),
            MatchError::InvalidParameter => write!(f, "invalid parameter"),
            MatchError::InvalidQuantity => write!(f, "invalid quantity"),
        }
    }
}

impl std::error::Error for MatchError {}

/// One operation per decoded business event.
///
/// Prices and quantities are integer ticks/shares as carried on the wire.
/// Implementations own whatever book-keeping they need; the gateway only
/// routes events in and rejection codes out.
pub trait MatchingEngine {
    /// Register a tradable instrument.
    fn add_symbol(&mut self, symbol_id: u32, name: [u8; 8]) -> Result<(), MatchError>;

    fn add_limit_order(
        &mut self,
        order_id: u64,
        symbol_id: u32,
        side: Side,
        price: u32,
        quantity: u64,
    ) -> Result<(), MatchError>;

    fn add_market_order(
        &mut self,
        order_id: u64,
        symbol_id: u32,
        side: Side,
        quantity: u64,
    ) -> Result<(), MatchError>;

    /// Execute `quantity` shares of a resting order at its own price.
    fn execute_order(&mut self, order_id: u64, quantity: u64) -> Result<(), MatchError>;

    /// Execute `quantity` shares of a resting order at an explicit price.
    fn execute_order_at_price(
        &mut self,
        order_id: u64,
        quantity: u64,
        price: u32,
    ) -> Result<(), MatchError>;

    /// Reduce the open quantity of a resting order.
    fn reduce_order(&mut self, order_id: u64, quantity: u64) -> Result<(), MatchError>;

    /// Remove a resting order entirely.
    fn delete_order(&mut self, order_id: u64) -> Result<(), MatchError>;

    /// Atomically replace a resting order with a new id, price and quantity.
    fn replace_order(
        &mut self,
        order_id: u64,
        new_order_id: u64,
        price: u32,
        quantity: u64,
    ) -> Result<(), MatchError>;
}
