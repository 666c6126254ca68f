//! Market-data session.
//!
//! Consumes the distribution feed: decoded messages drive the matching
//! engine's book-keeping and, when a publisher is attached, every
//! decoded message is republished downstream unchanged. The feed
//! defines no reject message, so engine rejections are log-only here.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use gateway_core::{MatchError, MatchingEngine, Side};
use gateway_protocol::{CodecError, Framer, ItchMessage};
use gateway_transport::OutboundPipeline;

/// Protocol glue for one market-data connection.
pub struct MarketDataSession<E: MatchingEngine> {
    framer: Framer,
    engine: Arc<Mutex<E>>,
    republisher: Option<Arc<OutboundPipeline>>,
    messages_seen: u64,
    unknown_messages: u64,
}

impl<E: MatchingEngine> MarketDataSession<E> {
    pub fn new(engine: Arc<Mutex<E>>) -> Self {
        Self {
            framer: Framer::new(),
            engine,
            republisher: None,
            messages_seen: 0,
            unknown_messages: 0,
        }
    }

    /// Republish every decoded message (re-framed) on `publisher`.
    pub fn with_republisher(mut self, publisher: Arc<OutboundPipeline>) -> Self {
        self.republisher = Some(publisher);
        self
    }

    pub fn messages_seen(&self) -> u64 {
        self.messages_seen
    }

    /// Messages whose tag was not in the catalog; counted, never fatal.
    pub fn unknown_messages(&self) -> u64 {
        self.unknown_messages
    }

    /// Feed one transport fragment into the session.
    pub fn on_fragment(&mut self, fragment: &[u8]) {
        let mut framer = std::mem::take(&mut self.framer);
        let result = framer.process(fragment, |bytes| self.handle_message(bytes));
        if let Err(error) = result {
            warn!(%error, "market-data decode failed, dropping rest of fragment");
            framer.reset();
        }
        self.framer = framer;
    }

    fn handle_message(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let message = ItchMessage::deserialize(bytes)?;
        self.messages_seen += 1;

        if let Some(publisher) = &self.republisher {
            let mut framed = Vec::with_capacity(bytes.len() + gateway_protocol::LENGTH_PREFIX_SIZE);
            if Framer::frame_into(bytes, &mut framed).is_ok() && !publisher.publish(&framed) {
                warn!(tag = message.tag(), "republish refused by outbound pipeline");
            }
        }

        self.apply(&message);
        Ok(())
    }

    /// Apply the book-building subset to the engine; everything else is
    /// informational on this feed.
    fn apply(&mut self, message: &ItchMessage) {
        let result: Result<(), MatchError> = match message {
            ItchMessage::StockDirectory(m) => self
                .lock_engine()
                .add_symbol(u32::from(m.header.stock_locate), m.stock),
            ItchMessage::AddOrder(m) => self.lock_engine().add_limit_order(
                m.order_reference,
                u32::from(m.header.stock_locate),
                Side::from_wire(m.side),
                m.price,
                u64::from(m.shares),
            ),
            ItchMessage::AddOrderMpid(m) => self.lock_engine().add_limit_order(
                m.order.order_reference,
                u32::from(m.order.header.stock_locate),
                Side::from_wire(m.order.side),
                m.order.price,
                u64::from(m.order.shares),
            ),
            ItchMessage::OrderExecuted(m) => self
                .lock_engine()
                .execute_order(m.order_reference, u64::from(m.executed_shares)),
            ItchMessage::OrderExecutedWithPrice(m) => self.lock_engine().execute_order_at_price(
                m.executed.order_reference,
                u64::from(m.executed.executed_shares),
                m.execution_price,
            ),
            ItchMessage::OrderCancel(m) => self
                .lock_engine()
                .reduce_order(m.order_reference, u64::from(m.canceled_shares)),
            ItchMessage::OrderDelete(m) => self.lock_engine().delete_order(m.order_reference),
            ItchMessage::OrderReplace(m) => self.lock_engine().replace_order(
                m.original_reference,
                m.new_reference,
                m.price,
                u64::from(m.shares),
            ),
            ItchMessage::SystemEvent(m) => {
                debug!(event_code = m.event_code, "system event");
                Ok(())
            }
            ItchMessage::StockTradingAction(m) => {
                debug!(
                    stock_locate = m.header.stock_locate,
                    state = m.trading_state,
                    "trading action"
                );
                Ok(())
            }
            ItchMessage::Trade(m) => {
                debug!(match_number = m.match_number, "trade");
                Ok(())
            }
            ItchMessage::CrossTrade(m) => {
                debug!(match_number = m.match_number, "cross trade");
                Ok(())
            }
            ItchMessage::BrokenTrade(m) => {
                debug!(match_number = m.match_number, "broken trade");
                Ok(())
            }
            ItchMessage::Noii(m) => {
                debug!(paired_shares = m.paired_shares, "imbalance indicator");
                Ok(())
            }
            ItchMessage::Rpii(m) => {
                debug!(interest = m.interest_flag, "retail interest");
                Ok(())
            }
            ItchMessage::Unknown { tag } => {
                self.unknown_messages += 1;
                debug!(tag, "unknown market-data message");
                Ok(())
            }
        };
        if let Err(error) = result {
            warn!(tag = message.tag(), %error, "book update rejected");
        }
    }

    fn lock_engine(&self) -> MutexGuard<'_, E> {
        match self.engine.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
