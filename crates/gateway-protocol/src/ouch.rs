//! Order-entry protocol (OUCH-style).
//!
//! Requests flow *into* the exchange, events flow back *out*. Both
//! directions are fixed-width, tag-led records; order-entry timestamps
//! are full 64-bit values (unlike the market-data feed's 48-bit ones).
//!
//! ```text
//! Inbound (OuchRequest)
//! 'O' EnterOrder     43   order_token, account_type, account_id, side,
//!                         shares(u64), book_id, price, time_in_force,
//!                         client_id, minimum_quantity(u64)
//! 'U' ReplaceOrder   21   existing_token, replacement_token,
//!                         shares(u64), price
//! 'X' CancelOrder     5   order_token
//!
//! Outbound (OuchEvent)
//! 'S' SystemEvent    10   timestamp, event_code
//! 'A' OrderAccepted  60   timestamp + the EnterOrder fields +
//!                         order_reference, order_state
//! 'J' OrderRejected  14   timestamp, order_token, reason
//! 'U' OrderReplaced  43   timestamp, replacement_token, side,
//!                         shares(u64), book_id, price,
//!                         order_reference, order_state, previous_token
//! 'C' OrderCanceled  22   timestamp, order_token, shares(u64), reason
//! 'E' OrderExecuted  38   timestamp, order_token, executed_shares(u64),
//!                         executed_price, liquidity_flag, match_number,
//!                         counterparty_id
//! 'B' BrokenTrade    22   timestamp, order_token, match_number, reason
//! ```
//!
//! An unmapped inbound tag decodes into [`OuchRequest::Unknown`] and is
//! routed to the catch-all handler rather than failing the stream.

use crate::wire::{need, CodecError, Reader, Writer};

/// Price sentinel marking an inbound order as a market order.
pub const MARKET_ORDER_PRICE: u32 = 0x7fff_ffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnterOrder {
    pub order_token: u32,
    pub account_type: u8,
    pub account_id: u32,
    /// `'B'` or `'S'`.
    pub side: u8,
    pub shares: u64,
    pub book_id: u32,
    /// [`MARKET_ORDER_PRICE`] selects a market order.
    pub price: u32,
    pub time_in_force: u32,
    pub client_id: u32,
    pub minimum_quantity: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOrder {
    pub existing_token: u32,
    pub replacement_token: u32,
    pub shares: u64,
    pub price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOrder {
    pub order_token: u32,
}

/// Inbound order-entry requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuchRequest {
    EnterOrder(EnterOrder),
    ReplaceOrder(ReplaceOrder),
    CancelOrder(CancelOrder),
    Unknown { tag: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemEvent {
    pub timestamp: u64,
    pub event_code: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAccepted {
    pub timestamp: u64,
    pub order_token: u32,
    pub account_type: u8,
    pub account_id: u32,
    pub side: u8,
    pub shares: u64,
    pub book_id: u32,
    pub price: u32,
    pub time_in_force: u32,
    pub client_id: u32,
    pub order_reference: u64,
    pub minimum_quantity: u64,
    pub order_state: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRejected {
    pub timestamp: u64,
    pub order_token: u32,
    pub reason: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReplaced {
    pub timestamp: u64,
    pub replacement_token: u32,
    pub side: u8,
    pub shares: u64,
    pub book_id: u32,
    pub price: u32,
    pub order_reference: u64,
    pub order_state: u8,
    pub previous_token: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCanceled {
    pub timestamp: u64,
    pub order_token: u32,
    pub shares: u64,
    pub reason: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderExecuted {
    pub timestamp: u64,
    pub order_token: u32,
    pub executed_shares: u64,
    pub executed_price: u32,
    pub liquidity_flag: u8,
    pub match_number: u64,
    pub counterparty_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenTrade {
    pub timestamp: u64,
    pub order_token: u32,
    pub match_number: u64,
    pub reason: u8,
}

/// Outbound order-entry events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuchEvent {
    SystemEvent(SystemEvent),
    OrderAccepted(OrderAccepted),
    OrderRejected(OrderRejected),
    OrderReplaced(OrderReplaced),
    OrderCanceled(OrderCanceled),
    OrderExecuted(OrderExecuted),
    BrokenTrade(BrokenTrade),
}

impl EnterOrder {
    pub const TAG: u8 = b'O';
    pub const WIRE_SIZE: usize = 43;
}

impl ReplaceOrder {
    pub const TAG: u8 = b'U';
    pub const WIRE_SIZE: usize = 21;
}

impl CancelOrder {
    pub const TAG: u8 = b'X';
    pub const WIRE_SIZE: usize = 5;
}

impl OuchRequest {
    pub fn tag(&self) -> u8 {
        match self {
            OuchRequest::EnterOrder(_) => EnterOrder::TAG,
            OuchRequest::ReplaceOrder(_) => ReplaceOrder::TAG,
            OuchRequest::CancelOrder(_) => CancelOrder::TAG,
            OuchRequest::Unknown { tag } => *tag,
        }
    }

    pub fn wire_size(&self) -> usize {
        match self {
            OuchRequest::EnterOrder(_) => EnterOrder::WIRE_SIZE,
            OuchRequest::ReplaceOrder(_) => ReplaceOrder::WIRE_SIZE,
            OuchRequest::CancelOrder(_) => CancelOrder::WIRE_SIZE,
            OuchRequest::Unknown { .. } => 1,
        }
    }

    /// Encode into `buf`; returns bytes written, or 0 if `buf` is too
    /// small for this kind's fixed layout.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        let size = self.wire_size();
        if buf.len() < size {
            return 0;
        }
        let mut w = Writer::new(buf);
        w.u8(self.tag());
        match self {
            OuchRequest::EnterOrder(m) => {
                w.u32(m.order_token);
                w.u8(m.account_type);
                w.u32(m.account_id);
                w.u8(m.side);
                w.u64(m.shares);
                w.u32(m.book_id);
                w.u32(m.price);
                w.u32(m.time_in_force);
                w.u32(m.client_id);
                w.u64(m.minimum_quantity);
            }
            OuchRequest::ReplaceOrder(m) => {
                w.u32(m.existing_token);
                w.u32(m.replacement_token);
                w.u64(m.shares);
                w.u32(m.price);
            }
            OuchRequest::CancelOrder(m) => {
                w.u32(m.order_token);
            }
            OuchRequest::Unknown { .. } => {}
        }
        size
    }

    pub fn deserialize(buf: &[u8]) -> Result<OuchRequest, CodecError> {
        need(buf, 1)?;
        let tag = buf[0];
        let mut r = Reader::at(buf, 1);
        let msg = match tag {
            EnterOrder::TAG => {
                need(buf, EnterOrder::WIRE_SIZE)?;
                OuchRequest::EnterOrder(EnterOrder {
                    order_token: r.u32(),
                    account_type: r.u8(),
                    account_id: r.u32(),
                    side: r.u8(),
                    shares: r.u64(),
                    book_id: r.u32(),
                    price: r.u32(),
                    time_in_force: r.u32(),
                    client_id: r.u32(),
                    minimum_quantity: r.u64(),
                })
            }
            ReplaceOrder::TAG => {
                need(buf, ReplaceOrder::WIRE_SIZE)?;
                OuchRequest::ReplaceOrder(ReplaceOrder {
                    existing_token: r.u32(),
                    replacement_token: r.u32(),
                    shares: r.u64(),
                    price: r.u32(),
                })
            }
            CancelOrder::TAG => {
                need(buf, CancelOrder::WIRE_SIZE)?;
                OuchRequest::CancelOrder(CancelOrder {
                    order_token: r.u32(),
                })
            }
            tag => OuchRequest::Unknown { tag },
        };
        Ok(msg)
    }
}

impl SystemEvent {
    pub const TAG: u8 = b'S';
    pub const WIRE_SIZE: usize = 10;
}

impl OrderAccepted {
    pub const TAG: u8 = b'A';
    pub const WIRE_SIZE: usize = 60;
}

impl OrderRejected {
    pub const TAG: u8 = b'J';
    pub const WIRE_SIZE: usize = 14;
}

impl OrderReplaced {
    pub const TAG: u8 = b'U';
    pub const WIRE_SIZE: usize = 43;
}

impl OrderCanceled {
    pub const TAG: u8 = b'C';
    pub const WIRE_SIZE: usize = 22;
}

impl OrderExecuted {
    pub const TAG: u8 = b'E';
    pub const WIRE_SIZE: usize = 38;
}

impl BrokenTrade {
    pub const TAG: u8 = b'B';
    pub const WIRE_SIZE: usize = 22;
}

impl OuchEvent {
    pub fn tag(&self) -> u8 {
        match self {
            OuchEvent::SystemEvent(_) => SystemEvent::TAG,
            OuchEvent::OrderAccepted(_) => OrderAccepted::TAG,
            OuchEvent::OrderRejected(_) => OrderRejected::TAG,
            OuchEvent::OrderReplaced(_) => OrderReplaced::TAG,
            OuchEvent::OrderCanceled(_) => OrderCanceled::TAG,
            OuchEvent::OrderExecuted(_) => OrderExecuted::TAG,
            OuchEvent::BrokenTrade(_) => BrokenTrade::TAG,
        }
    }

    pub fn wire_size(&self) -> usize {
        match self {
            OuchEvent::SystemEvent(_) => SystemEvent::WIRE_SIZE,
            OuchEvent::OrderAccepted(_) => OrderAccepted::WIRE_SIZE,
            OuchEvent::OrderRejected(_) => OrderRejected::WIRE_SIZE,
            OuchEvent::OrderReplaced(_) => OrderReplaced::WIRE_SIZE,
            OuchEvent::OrderCanceled(_) => OrderCanceled::WIRE_SIZE,
            OuchEvent::OrderExecuted(_) => OrderExecuted::WIRE_SIZE,
            OuchEvent::BrokenTrade(_) => BrokenTrade::WIRE_SIZE,
        }
    }

    /// Encode into `buf`; returns bytes written, or 0 if `buf` is too
    /// small for this kind's fixed layout.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        let size = self.wire_size();
        if buf.len() < size {
            return 0;
        }
        let mut w = Writer::new(buf);
        w.u8(self.tag());
        match self {
            OuchEvent::SystemEvent(m) => {
                w.u64(m.timestamp);
                w.u8(m.event_code);
            }
            OuchEvent::OrderAccepted(m) => {
                w.u64(m.timestamp);
                w.u32(m.order_token);
                w.u8(m.account_type);
                w.u32(m.account_id);
                w.u8(m.side);
                w.u64(m.shares);
                w.u32(m.book_id);
                w.u32(m.price);
                w.u32(m.time_in_force);
                w.u32(m.client_id);
                w.u64(m.order_reference);
                w.u64(m.minimum_quantity);
                w.u8(m.order_state);
            }
            OuchEvent::OrderRejected(m) => {
                w.u64(m.timestamp);
                w.u32(m.order_token);
                w.u8(m.reason);
            }
            OuchEvent::OrderReplaced(m) => {
                w.u64(m.timestamp);
                w.u32(m.replacement_token);
                w.u8(m.side);
                w.u64(m.shares);
                w.u32(m.book_id);
                w.u32(m.price);
                w.u64(m.order_reference);
                w.u8(m.order_state);
                w.u32(m.previous_token);
            }
            OuchEvent::OrderCanceled(m) => {
                w.u64(m.timestamp);
                w.u32(m.order_token);
                w.u64(m.shares);
                w.u8(m.reason);
            }
            OuchEvent::OrderExecuted(m) => {
                w.u64(m.timestamp);
                w.u32(m.order_token);
                w.u64(m.executed_shares);
                w.u32(m.executed_price);
                w.u8(m.liquidity_flag);
                w.u64(m.match_number);
                w.u32(m.counterparty_id);
            }
            OuchEvent::BrokenTrade(m) => {
                w.u64(m.timestamp);
                w.u32(m.order_token);
                w.u64(m.match_number);
                w.u8(m.reason);
            }
        }
        size
    }

    /// Decode one outbound event; used by order-entry clients reading
    /// the exchange's responses.
    pub fn deserialize(buf: &[u8]) -> Result<OuchEvent, CodecError> {
        need(buf, 1)?;
        let tag = buf[0];
        let mut r = Reader::at(buf, 1);
        let msg = match tag {
            SystemEvent::TAG => {
                need(buf, SystemEvent::WIRE_SIZE)?;
                OuchEvent::SystemEvent(SystemEvent {
                    timestamp: r.u64(),
                    event_code: r.u8(),
                })
            }
            OrderAccepted::TAG => {
                need(buf, OrderAccepted::WIRE_SIZE)?;
                OuchEvent::OrderAccepted(OrderAccepted {
                    timestamp: r.u64(),
                    order_token: r.u32(),
                    account_type: r.u8(),
                    account_id: r.u32(),
                    side: r.u8(),
                    shares: r.u64(),
                    book_id: r.u32(),
                    price: r.u32(),
                    time_in_force: r.u32(),
                    client_id: r.u32(),
                    order_reference: r.u64(),
                    minimum_quantity: r.u64(),
                    order_state: r.u8(),
                })
            }
            OrderRejected::TAG => {
                need(buf, OrderRejected::WIRE_SIZE)?;
                OuchEvent::OrderRejected(OrderRejected {
                    timestamp: r.u64(),
                    order_token: r.u32(),
                    reason: r.u8(),
                })
            }
            OrderReplaced::TAG => {
                need(buf, OrderReplaced::WIRE_SIZE)?;
                OuchEvent::OrderReplaced(OrderReplaced {
                    timestamp: r.u64(),
                    replacement_token: r.u32(),
                    side: r.u8(),
                    shares: r.u64(),
                    book_id: r.u32(),
                    price: r.u32(),
                    order_reference: r.u64(),
                    order_state: r.u8(),
                    previous_token: r.u32(),
                })
            }
            OrderCanceled::TAG => {
                need(buf, OrderCanceled::WIRE_SIZE)?;
                OuchEvent::OrderCanceled(OrderCanceled {
                    timestamp: r.u64(),
                    order_token: r.u32(),
                    shares: r.u64(),
                    reason: r.u8(),
                })
            }
            OrderExecuted::TAG => {
                need(buf, OrderExecuted::WIRE_SIZE)?;
                OuchEvent::OrderExecuted(OrderExecuted {
                    timestamp: r.u64(),
                    order_token: r.u32(),
                    executed_shares: r.u64(),
                    executed_price: r.u32(),
                    liquidity_flag: r.u8(),
                    match_number: r.u64(),
                    counterparty_id: r.u32(),
                })
            }
            BrokenTrade::TAG => {
                need(buf, BrokenTrade::WIRE_SIZE)?;
                OuchEvent::BrokenTrade(BrokenTrade {
                    timestamp: r.u64(),
                    order_token: r.u32(),
                    match_number: r.u64(),
                    reason: r.u8(),
                })
            }
            tag => return Err(CodecError::UnknownTag(tag)),
        };
        Ok(msg)
    }
}
