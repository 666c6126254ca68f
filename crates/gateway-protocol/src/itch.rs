//! Market-data distribution protocol (ITCH-style).
//!
//! Every message is a fixed-width record led by a one-byte type tag and
//! the common `stock_locate / tracking_number / timestamp` header. The
//! timestamp is 48-bit. Layouts (sizes include the tag):
//!
//! ```text
//! 'S' SystemEvent            12   header, event_code
//! 'R' StockDirectory         39   header, stock[8], market_category,
//!                                 financial_status, round_lot_size,
//!                                 round_lots_only, issue_classification,
//!                                 issue_sub_type[2], authenticity,
//!                                 short_sale_threshold, ipo_flag,
//!                                 luld_tier, etp_flag, etp_leverage,
//!                                 inverse_indicator
//! 'H' StockTradingAction     22   header, stock[8], trading_state,
//!                                 reserved, reason
//! 'A' AddOrder               36   header, order_ref, side, shares,
//!                                 stock[8], price
//! 'F' AddOrderMpid           37   AddOrder layout + attribution
//! 'E' OrderExecuted          31   header, order_ref, executed_shares,
//!                                 match_number
//! 'C' OrderExecutedWithPrice 36   OrderExecuted layout + printable,
//!                                 execution_price
//! 'X' OrderCancel            23   header, order_ref, canceled_shares
//! 'D' OrderDelete            19   header, order_ref
//! 'U' OrderReplace           35   header, original_ref, new_ref,
//!                                 shares, price
//! 'P' Trade                  44   header, order_ref, side, shares,
//!                                 stock[8], price, match_number
//! 'Q' CrossTrade             40   header, shares(u64), stock[8],
//!                                 cross_price, match_number, cross_type
//! 'B' BrokenTrade            19   header, match_number
//! 'I' Noii                   50   header, paired_shares,
//!                                 imbalance_shares, imbalance_direction,
//!                                 stock[8], far_price, near_price,
//!                                 reference_price, cross_type,
//!                                 price_variation
//! 'N' Rpii                   20   header, stock[8], interest_flag
//! ```
//!
//! Any other tag decodes into [`ItchMessage::Unknown`], which always
//! succeeds: an unrecognized message never aborts the stream.

use crate::wire::{need, CodecError, Reader, Writer};

/// Common header carried by every market-data message (after the tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItchHeader {
    pub stock_locate: u16,
    pub tracking_number: u16,
    /// Nanoseconds since midnight; 48 bits on the wire.
    pub timestamp: u64,
}

impl ItchHeader {
    const WIRE_SIZE: usize = 10;

    fn write(&self, w: &mut Writer<'_>) {
        w.u16(self.stock_locate);
        w.u16(self.tracking_number);
        w.u48(self.timestamp);
    }

    fn read(r: &mut Reader<'_>) -> Self {
        Self {
            stock_locate: r.u16(),
            tracking_number: r.u16(),
            timestamp: r.u48(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemEvent {
    pub header: ItchHeader,
    pub event_code: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDirectory {
    pub header: ItchHeader,
    pub stock: [u8; 8],
    pub market_category: u8,
    pub financial_status: u8,
    pub round_lot_size: u32,
    pub round_lots_only: u8,
    pub issue_classification: u8,
    pub issue_sub_type: [u8; 2],
    pub authenticity: u8,
    pub short_sale_threshold: u8,
    pub ipo_flag: u8,
    pub luld_tier: u8,
    pub etp_flag: u8,
    pub etp_leverage: u32,
    pub inverse_indicator: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockTradingAction {
    pub header: ItchHeader,
    pub stock: [u8; 8],
    pub trading_state: u8,
    pub reserved: u8,
    pub reason: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOrder {
    pub header: ItchHeader,
    pub order_reference: u64,
    /// `'B'` or `'S'`.
    pub side: u8,
    pub shares: u32,
    pub stock: [u8; 8],
    pub price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOrderMpid {
    pub order: AddOrder,
    pub attribution: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderExecuted {
    pub header: ItchHeader,
    pub order_reference: u64,
    pub executed_shares: u32,
    pub match_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderExecutedWithPrice {
    pub executed: OrderExecuted,
    pub printable: u8,
    pub execution_price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCancel {
    pub header: ItchHeader,
    pub order_reference: u64,
    pub canceled_shares: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDelete {
    pub header: ItchHeader,
    pub order_reference: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReplace {
    pub header: ItchHeader,
    pub original_reference: u64,
    pub new_reference: u64,
    pub shares: u32,
    pub price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub header: ItchHeader,
    pub order_reference: u64,
    pub side: u8,
    pub shares: u32,
    pub stock: [u8; 8],
    pub price: u32,
    pub match_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossTrade {
    pub header: ItchHeader,
    pub shares: u64,
    pub stock: [u8; 8],
    pub cross_price: u32,
    pub match_number: u64,
    pub cross_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenTrade {
    pub header: ItchHeader,
    pub match_number: u64,
}

/// Net order imbalance indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Noii {
    pub header: ItchHeader,
    pub paired_shares: u64,
    pub imbalance_shares: u64,
    pub imbalance_direction: u8,
    pub stock: [u8; 8],
    pub far_price: u32,
    pub near_price: u32,
    pub reference_price: u32,
    pub cross_type: u8,
    pub price_variation: u8,
}

/// Retail price improvement indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rpii {
    pub header: ItchHeader,
    pub stock: [u8; 8],
    pub interest_flag: u8,
}

/// All market-data message kinds, dispatched on the leading tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItchMessage {
    SystemEvent(SystemEvent),
    StockDirectory(StockDirectory),
    StockTradingAction(StockTradingAction),
    AddOrder(AddOrder),
    AddOrderMpid(AddOrderMpid),
    OrderExecuted(OrderExecuted),
    OrderExecutedWithPrice(OrderExecutedWithPrice),
    OrderCancel(OrderCancel),
    OrderDelete(OrderDelete),
    OrderReplace(OrderReplace),
    Trade(Trade),
    CrossTrade(CrossTrade),
    BrokenTrade(BrokenTrade),
    Noii(Noii),
    Rpii(Rpii),
    /// Unrecognized tag; carries only the tag byte.
    Unknown { tag: u8 },
}

impl SystemEvent {
    pub const TAG: u8 = b'S';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 1;
}

impl StockDirectory {
    pub const TAG: u8 = b'R';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 28;
}

impl StockTradingAction {
    pub const TAG: u8 = b'H';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 11;
}

impl AddOrder {
    pub const TAG: u8 = b'A';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 25;
}

impl AddOrderMpid {
    pub const TAG: u8 = b'F';
    pub const WIRE_SIZE: usize = AddOrder::WIRE_SIZE + 1;
}

impl OrderExecuted {
    pub const TAG: u8 = b'E';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 20;
}

impl OrderExecutedWithPrice {
    pub const TAG: u8 = b'C';
    pub const WIRE_SIZE: usize = OrderExecuted::WIRE_SIZE + 5;
}

impl OrderCancel {
    pub const TAG: u8 = b'X';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 12;
}

impl OrderDelete {
    pub const TAG: u8 = b'D';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 8;
}

impl OrderReplace {
    pub const TAG: u8 = b'U';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 24;
}

impl Trade {
    pub const TAG: u8 = b'P';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 33;
}

impl CrossTrade {
    pub const TAG: u8 = b'Q';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 29;
}

impl BrokenTrade {
    pub const TAG: u8 = b'B';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 8;
}

impl Noii {
    pub const TAG: u8 = b'I';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 39;
}

impl Rpii {
    pub const TAG: u8 = b'N';
    pub const WIRE_SIZE: usize = 1 + ItchHeader::WIRE_SIZE + 9;
}

impl ItchMessage {
    /// The leading tag byte for this message kind.
    pub fn tag(&self) -> u8 {
        match self {
            ItchMessage::SystemEvent(_) => SystemEvent::TAG,
            ItchMessage::StockDirectory(_) => StockDirectory::TAG,
            ItchMessage::StockTradingAction(_) => StockTradingAction::TAG,
            ItchMessage::AddOrder(_) => AddOrder::TAG,
            ItchMessage::AddOrderMpid(_) => AddOrderMpid::TAG,
            ItchMessage::OrderExecuted(_) => OrderExecuted::TAG,
            ItchMessage::OrderExecutedWithPrice(_) => OrderExecutedWithPrice::TAG,
            ItchMessage::OrderCancel(_) => OrderCancel::TAG,
            ItchMessage::OrderDelete(_) => OrderDelete::TAG,
            ItchMessage::OrderReplace(_) => OrderReplace::TAG,
            ItchMessage::Trade(_) => Trade::TAG,
            ItchMessage::CrossTrade(_) => CrossTrade::TAG,
            ItchMessage::BrokenTrade(_) => BrokenTrade::TAG,
            ItchMessage::Noii(_) => Noii::TAG,
            ItchMessage::Rpii(_) => Rpii::TAG,
            ItchMessage::Unknown { tag } => *tag,
        }
    }

    /// Size of this message's fixed on-wire layout.
    pub fn wire_size(&self) -> usize {
        match self {
            ItchMessage::SystemEvent(_) => SystemEvent::WIRE_SIZE,
            ItchMessage::StockDirectory(_) => StockDirectory::WIRE_SIZE,
            ItchMessage::StockTradingAction(_) => StockTradingAction::WIRE_SIZE,
            ItchMessage::AddOrder(_) => AddOrder::WIRE_SIZE,
            ItchMessage::AddOrderMpid(_) => AddOrderMpid::WIRE_SIZE,
            ItchMessage::OrderExecuted(_) => OrderExecuted::WIRE_SIZE,
            ItchMessage::OrderExecutedWithPrice(_) => OrderExecutedWithPrice::WIRE_SIZE,
            ItchMessage::OrderCancel(_) => OrderCancel::WIRE_SIZE,
            ItchMessage::OrderDelete(_) => OrderDelete::WIRE_SIZE,
            ItchMessage::OrderReplace(_) => OrderReplace::WIRE_SIZE,
            ItchMessage::Trade(_) => Trade::WIRE_SIZE,
            ItchMessage::CrossTrade(_) => CrossTrade::WIRE_SIZE,
            ItchMessage::BrokenTrade(_) => BrokenTrade::WIRE_SIZE,
            ItchMessage::Noii(_) => Noii::WIRE_SIZE,
            ItchMessage::Rpii(_) => Rpii::WIRE_SIZE,
            ItchMessage::Unknown { .. } => 1,
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
            ItchMessage::SystemEvent(m) => {
                m.header.write(&mut w);
                w.u8(m.event_code);
            }
            ItchMessage::StockDirectory(m) => {
                m.header.write(&mut w);
                w.bytes(&m.stock);
                w.u8(m.market_category);
                w.u8(m.financial_status);
                w.u32(m.round_lot_size);
                w.u8(m.round_lots_only);
                w.u8(m.issue_classification);
                w.bytes(&m.issue_sub_type);
                w.u8(m.authenticity);
                w.u8(m.short_sale_threshold);
                w.u8(m.ipo_flag);
                w.u8(m.luld_tier);
                w.u8(m.etp_flag);
                w.u32(m.etp_leverage);
                w.u8(m.inverse_indicator);
            }
            ItchMessage::StockTradingAction(m) => {
                m.header.write(&mut w);
                w.bytes(&m.stock);
                w.u8(m.trading_state);
                w.u8(m.reserved);
                w.u8(m.reason);
            }
            ItchMessage::AddOrder(m) => {
                write_add_order(&mut w, m);
            }
            ItchMessage::AddOrderMpid(m) => {
                write_add_order(&mut w, &m.order);
                w.u8(m.attribution);
            }
            ItchMessage::OrderExecuted(m) => {
                write_order_executed(&mut w, m);
            }
            ItchMessage::OrderExecutedWithPrice(m) => {
                write_order_executed(&mut w, &m.executed);
                w.u8(m.printable);
                w.u32(m.execution_price);
            }
            ItchMessage::OrderCancel(m) => {
                m.header.write(&mut w);
                w.u64(m.order_reference);
                w.u32(m.canceled_shares);
            }
            ItchMessage::OrderDelete(m) => {
                m.header.write(&mut w);
                w.u64(m.order_reference);
            }
            ItchMessage::OrderReplace(m) => {
                m.header.write(&mut w);
                w.u64(m.original_reference);
                w.u64(m.new_reference);
                w.u32(m.shares);
                w.u32(m.price);
            }
            ItchMessage::Trade(m) => {
                m.header.write(&mut w);
                w.u64(m.order_reference);
                w.u8(m.side);
                w.u32(m.shares);
                w.bytes(&m.stock);
                w.u32(m.price);
                w.u64(m.match_number);
            }
            ItchMessage::CrossTrade(m) => {
                m.header.write(&mut w);
                w.u64(m.shares);
                w.bytes(&m.stock);
                w.u32(m.cross_price);
                w.u64(m.match_number);
                w.u8(m.cross_type);
            }
            ItchMessage::BrokenTrade(m) => {
                m.header.write(&mut w);
                w.u64(m.match_number);
            }
            ItchMessage::Noii(m) => {
                m.header.write(&mut w);
                w.u64(m.paired_shares);
                w.u64(m.imbalance_shares);
                w.u8(m.imbalance_direction);
                w.bytes(&m.stock);
                w.u32(m.far_price);
                w.u32(m.near_price);
                w.u32(m.reference_price);
                w.u8(m.cross_type);
                w.u8(m.price_variation);
            }
            ItchMessage::Rpii(m) => {
                m.header.write(&mut w);
                w.bytes(&m.stock);
                w.u8(m.interest_flag);
            }
            ItchMessage::Unknown { .. } => {}
        }
        size
    }

    /// Decode one message from `buf`.
    ///
    /// Fails only when `buf` is shorter than the fixed layout selected by
    /// the tag; unmapped tags decode into [`ItchMessage::Unknown`].
    pub fn deserialize(buf: &[u8]) -> Result<ItchMessage, CodecError> {
        need(buf, 1)?;
        let tag = buf[0];
        let mut r = Reader::at(buf, 1);
        let msg = match tag {
            SystemEvent::TAG => {
                need(buf, SystemEvent::WIRE_SIZE)?;
                ItchMessage::SystemEvent(SystemEvent {
                    header: ItchHeader::read(&mut r),
                    event_code: r.u8(),
                })
            }
            StockDirectory::TAG => {
                need(buf, StockDirectory::WIRE_SIZE)?;
                ItchMessage::StockDirectory(StockDirectory {
                    header: ItchHeader::read(&mut r),
                    stock: r.array(),
                    market_category: r.u8(),
                    financial_status: r.u8(),
                    round_lot_size: r.u32(),
                    round_lots_only: r.u8(),
                    issue_classification: r.u8(),
                    issue_sub_type: r.array(),
                    authenticity: r.u8(),
                    short_sale_threshold: r.u8(),
                    ipo_flag: r.u8(),
                    luld_tier: r.u8(),
                    etp_flag: r.u8(),
                    etp_leverage: r.u32(),
                    inverse_indicator: r.u8(),
                })
            }
            StockTradingAction::TAG => {
                need(buf, StockTradingAction::WIRE_SIZE)?;
                ItchMessage::StockTradingAction(StockTradingAction {
                    header: ItchHeader::read(&mut r),
                    stock: r.array(),
                    trading_state: r.u8(),
                    reserved: r.u8(),
                    reason: r.u8(),
                })
            }
            AddOrder::TAG => {
                need(buf, AddOrder::WIRE_SIZE)?;
                ItchMessage::AddOrder(read_add_order(&mut r))
            }
            AddOrderMpid::TAG => {
                need(buf, AddOrderMpid::WIRE_SIZE)?;
                ItchMessage::AddOrderMpid(AddOrderMpid {
                    order: read_add_order(&mut r),
                    attribution: r.u8(),
                })
            }
            OrderExecuted::TAG => {
                need(buf, OrderExecuted::WIRE_SIZE)?;
                ItchMessage::OrderExecuted(read_order_executed(&mut r))
            }
            OrderExecutedWithPrice::TAG => {
                need(buf, OrderExecutedWithPrice::WIRE_SIZE)?;
                ItchMessage::OrderExecutedWithPrice(OrderExecutedWithPrice {
                    executed: read_order_executed(&mut r),
                    printable: r.u8(),
                    execution_price: r.u32(),
                })
            }
            OrderCancel::TAG => {
                need(buf, OrderCancel::WIRE_SIZE)?;
                ItchMessage::OrderCancel(OrderCancel {
                    header: ItchHeader::read(&mut r),
                    order_reference: r.u64(),
                    canceled_shares: r.u32(),
                })
            }
            OrderDelete::TAG => {
                need(buf, OrderDelete::WIRE_SIZE)?;
                ItchMessage::OrderDelete(OrderDelete {
                    header: ItchHeader::read(&mut r),
                    order_reference: r.u64(),
                })
            }
            OrderReplace::TAG => {
                need(buf, OrderReplace::WIRE_SIZE)?;
                ItchMessage::OrderReplace(OrderReplace {
                    header: ItchHeader::read(&mut r),
                    original_reference: r.u64(),
                    new_reference: r.u64(),
                    shares: r.u32(),
                    price: r.u32(),
                })
            }
            Trade::TAG => {
                need(buf, Trade::WIRE_SIZE)?;
                ItchMessage::Trade(Trade {
                    header: ItchHeader::read(&mut r),
                    order_reference: r.u64(),
                    side: r.u8(),
                    shares: r.u32(),
                    stock: r.array(),
                    price: r.u32(),
                    match_number: r.u64(),
                })
            }
            CrossTrade::TAG => {
                need(buf, CrossTrade::WIRE_SIZE)?;
                ItchMessage::CrossTrade(CrossTrade {
                    header: ItchHeader::read(&mut r),
                    shares: r.u64(),
                    stock: r.array(),
                    cross_price: r.u32(),
                    match_number: r.u64(),
                    cross_type: r.u8(),
                })
            }
            BrokenTrade::TAG => {
                need(buf, BrokenTrade::WIRE_SIZE)?;
                ItchMessage::BrokenTrade(BrokenTrade {
                    header: ItchHeader::read(&mut r),
                    match_number: r.u64(),
                })
            }
            Noii::TAG => {
                need(buf, Noii::WIRE_SIZE)?;
                ItchMessage::Noii(Noii {
                    header: ItchHeader::read(&mut r),
                    paired_shares: r.u64(),
                    imbalance_shares: r.u64(),
                    imbalance_direction: r.u8(),
                    stock: r.array(),
                    far_price: r.u32(),
                    near_price: r.u32(),
                    reference_price: r.u32(),
                    cross_type: r.u8(),
                    price_variation: r.u8(),
                })
            }
            Rpii::TAG => {
                need(buf, Rpii::WIRE_SIZE)?;
                ItchMessage::Rpii(Rpii {
                    header: ItchHeader::read(&mut r),
                    stock: r.array(),
                    interest_flag: r.u8(),
                })
            }
            tag => ItchMessage::Unknown { tag },
        };
        Ok(msg)
    }
}

fn write_add_order(w: &mut Writer<'_>, m: &AddOrder) {
    m.header.write(w);
    w.u64(m.order_reference);
    w.u8(m.side);
    w.u32(m.shares);
    w.bytes(&m.stock);
    w.u32(m.price);
}

fn read_add_order(r: &mut Reader<'_>) -> AddOrder {
    AddOrder {
        header: ItchHeader::read(r),
        order_reference: r.u64(),
        side: r.u8(),
        shares: r.u32(),
        stock: r.array(),
        price: r.u32(),
    }
}

fn write_order_executed(w: &mut Writer<'_>, m: &OrderExecuted) {
    m.header.write(w);
    w.u64(m.order_reference);
    w.u32(m.executed_shares);
    w.u64(m.match_number);
}

fn read_order_executed(r: &mut Reader<'_>) -> OrderExecuted {
    OrderExecuted {
        header: ItchHeader::read(r),
        order_reference: r.u64(),
        executed_shares: r.u32(),
        match_number: r.u64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ItchHeader {
        ItchHeader {
            stock_locate: 7,
            tracking_number: 21,
            timestamp: 0x0000_00ab_cdef_0123,
        }
    }

    fn sample_messages() -> Vec<ItchMessage> {
        vec![
            ItchMessage::SystemEvent(SystemEvent {
                header: header(),
                event_code: b'O',
            }),
            ItchMessage::StockDirectory(StockDirectory {
                header: header(),
                stock: *b"EUR_USD ",
                market_category: b'Q',
                financial_status: b'N',
                round_lot_size: 100,
                round_lots_only: b'N',
                issue_classification: b'C',
                issue_sub_type: *b"Z ",
                authenticity: b'P',
                short_sale_threshold: b'N',
                ipo_flag: b'N',
                luld_tier: b'1',
                etp_flag: b'N',
                etp_leverage: 0,
                inverse_indicator: b'N',
            }),
            ItchMessage::StockTradingAction(StockTradingAction {
                header: header(),
                stock: *b"EUR_USD ",
                trading_state: b'T',
                reserved: b' ',
                reason: b' ',
            }),
            ItchMessage::AddOrder(AddOrder {
                header: header(),
                order_reference: 42,
                side: b'B',
                shares: 100,
                stock: *b"EUR_USD ",
                price: 10050,
            }),
            ItchMessage::AddOrderMpid(AddOrderMpid {
                order: AddOrder {
                    header: header(),
                    order_reference: 43,
                    side: b'S',
                    shares: 250,
                    stock: *b"USD_RUB ",
                    price: 99,
                },
                attribution: b'M',
            }),
            ItchMessage::OrderExecuted(OrderExecuted {
                header: header(),
                order_reference: 42,
                executed_shares: 10,
                match_number: 9001,
            }),
            ItchMessage::OrderExecutedWithPrice(OrderExecutedWithPrice {
                executed: OrderExecuted {
                    header: header(),
                    order_reference: 42,
                    executed_shares: 5,
                    match_number: 9002,
                },
                printable: b'Y',
                execution_price: 10049,
            }),
            ItchMessage::OrderCancel(OrderCancel {
                header: header(),
                order_reference: 42,
                canceled_shares: 25,
            }),
            ItchMessage::OrderDelete(OrderDelete {
                header: header(),
                order_reference: 42,
            }),
            ItchMessage::OrderReplace(OrderReplace {
                header: header(),
                original_reference: 42,
                new_reference: 44,
                shares: 80,
                price: 10060,
            }),
            ItchMessage::Trade(Trade {
                header: header(),
                order_reference: 42,
                side: b'B',
                shares: 10,
                stock: *b"EUR_USD ",
                price: 10050,
                match_number: 9003,
            }),
            ItchMessage::CrossTrade(CrossTrade {
                header: header(),
                shares: 1000,
                stock: *b"EUR_USD ",
                cross_price: 10000,
                match_number: 9004,
                cross_type: b'O',
            }),
            ItchMessage::BrokenTrade(BrokenTrade {
                header: header(),
                match_number: 9003,
            }),
            ItchMessage::Noii(Noii {
                header: header(),
                paired_shares: 500,
                imbalance_shares: 50,
                imbalance_direction: b'B',
                stock: *b"EUR_USD ",
                far_price: 10020,
                near_price: 10040,
                reference_price: 10030,
                cross_type: b'O',
                price_variation: b'A',
            }),
            ItchMessage::Rpii(Rpii {
                header: header(),
                stock: *b"EUR_USD ",
                interest_flag: b'A',
            }),
        ]
    }

    #[test]
    fn every_kind_round_trips() {
        for msg in sample_messages() {
            let mut buf = vec![0u8; msg.wire_size()];
            assert_eq!(msg.serialize(&mut buf), msg.wire_size(), "{:?}", msg);
            let decoded = ItchMessage::deserialize(&buf).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn serialize_reports_insufficient_capacity_as_zero() {
        for msg in sample_messages() {
            let mut buf = vec![0u8; msg.wire_size() - 1];
            assert_eq!(msg.serialize(&mut buf), 0, "{:?}", msg);
        }
    }

    #[test]
    fn deserialize_rejects_short_buffers() {
        for msg in sample_messages() {
            let mut buf = vec![0u8; msg.wire_size()];
            msg.serialize(&mut buf);
            let err = ItchMessage::deserialize(&buf[..buf.len() - 1]).unwrap_err();
            assert_eq!(err, CodecError::Truncated, "{:?}", msg);
        }
    }

    #[test]
    fn add_order_layout_is_byte_exact() {
        let msg = ItchMessage::AddOrder(AddOrder {
            header: ItchHeader {
                stock_locate: 0x0102,
                tracking_number: 0x0304,
                timestamp: 0x0000_0506_0708_090a,
            },
            order_reference: 0x1112_1314_1516_1718,
            side: b'B',
            shares: 0x2122_2324,
            stock: *b"EUR_USD ",
            price: 0x3132_3334,
        });
        let mut buf = [0u8; AddOrder::WIRE_SIZE];
        assert_eq!(msg.serialize(&mut buf), AddOrder::WIRE_SIZE);

        let mut expected = vec![b'A', 0x01, 0x02, 0x03, 0x04];
        expected.extend_from_slice(&[0x05, 0x06, 0x07, 0x08, 0x09, 0x0a]);
        expected.extend_from_slice(&[0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18]);
        expected.push(b'B');
        expected.extend_from_slice(&[0x21, 0x22, 0x23, 0x24]);
        expected.extend_from_slice(b"EUR_USD ");
        expected.extend_from_slice(&[0x31, 0x32, 0x33, 0x34]);
        assert_eq!(&buf[..], &expected[..]);
    }

    #[test]
    fn unknown_tag_always_decodes() {
        let decoded = ItchMessage::deserialize(&[0x7f]).unwrap();
        assert_eq!(decoded, ItchMessage::Unknown { tag: 0x7f });

        // Unknown with trailing bytes still succeeds; only the tag counts.
        let decoded = ItchMessage::deserialize(&[b'z', 1, 2, 3]).unwrap();
        assert_eq!(decoded, ItchMessage::Unknown { tag: b'z' });
    }

    #[test]
    fn empty_buffer_is_truncated() {
        assert_eq!(ItchMessage::deserialize(&[]), Err(CodecError::Truncated));
    }
}
