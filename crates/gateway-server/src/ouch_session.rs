//! Order-entry session.
//!
//! One session per order-entry connection. Inbound fragments are
//! reassembled by the framer, decoded as [`OuchRequest`]s and applied to
//! the matching engine; every request is answered with an accept,
//! replace, cancel or reject event on the outbound pipeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use gateway_core::{MatchError, MatchingEngine, Side};
use gateway_protocol::ouch::{
    CancelOrder, EnterOrder, OrderAccepted, OrderCanceled, OrderRejected, OrderReplaced,
    ReplaceOrder,
};
use gateway_protocol::{CodecError, Framer, OuchEvent, OuchRequest, MARKET_ORDER_PRICE};
use gateway_transport::OutboundPipeline;

/// Order state reported in accepted/replaced events.
const ORDER_STATE_LIVE: u8 = b'L';
const ORDER_STATE_DONE: u8 = b'D';

/// Cancel reason for a user-requested cancel.
const CANCEL_BY_USER: u8 = b'U';

/// Reject reason characters:
/// `'S'` duplicate symbol, `'U'` unknown book, `'D'` duplicate order
/// token, `'N'` order not found, `'P'` invalid parameter, `'Q'` invalid
/// quantity.
fn reject_reason(error: MatchError) -> u8 {
    match error {
        MatchError::DuplicateSymbol => b'S',
        MatchError::SymbolNotFound => b'U',
        MatchError::DuplicateOrderId => b'D',
        MatchError::OrderNotFound => b'N',
        MatchError::InvalidParameter => b'P',
        MatchError::InvalidQuantity => b'Q',
    }
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Protocol glue for one order-entry connection.
pub struct OrderEntrySession<E: MatchingEngine> {
    framer: Framer,
    engine: Arc<Mutex<E>>,
    publisher: Arc<OutboundPipeline>,
    /// Last known request state per live order token; fills the fields
    /// of replace/cancel events the engine does not echo back.
    orders: HashMap<u32, EnterOrder>,
    next_order_reference: u64,
}

impl<E: MatchingEngine> OrderEntrySession<E> {
    pub fn new(engine: Arc<Mutex<E>>, publisher: Arc<OutboundPipeline>) -> Self {
        Self {
            framer: Framer::new(),
            engine,
            publisher,
            orders: HashMap::new(),
            next_order_reference: 1,
        }
    }

    /// Feed one transport fragment into the session.
    ///
    /// A malformed message aborts the rest of the fragment and clears
    /// the framing state; subsequent fragments start clean.
    pub fn on_fragment(&mut self, fragment: &[u8]) {
        let mut framer = std::mem::take(&mut self.framer);
        let result = framer.process(fragment, |bytes| self.handle_message(bytes));
        if let Err(error) = result {
            warn!(%error, "order-entry decode failed, dropping rest of fragment");
            framer.reset();
        }
        self.framer = framer;
    }

    fn handle_message(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        match OuchRequest::deserialize(bytes)? {
            OuchRequest::EnterOrder(request) => self.enter_order(request),
            OuchRequest::ReplaceOrder(request) => self.replace_order(request),
            OuchRequest::CancelOrder(request) => self.cancel_order(request),
            OuchRequest::Unknown { tag } => {
                warn!(tag, "ignoring unknown order-entry request");
            }
        }
        Ok(())
    }

    fn enter_order(&mut self, request: EnterOrder) {
        let side = Side::from_wire(request.side);
        let order_id = u64::from(request.order_token);
        let is_market = request.price == MARKET_ORDER_PRICE;
        let result = {
            let mut engine = self.lock_engine();
            if is_market {
                engine.add_market_order(order_id, request.book_id, side, request.shares)
            } else {
                engine.add_limit_order(
                    order_id,
                    request.book_id,
                    side,
                    request.price,
                    request.shares,
                )
            }
        };
        match result {
            Ok(()) => {
                let order_reference = self.next_order_reference();
                let order_state = if is_market {
                    ORDER_STATE_DONE
                } else {
                    self.orders.insert(request.order_token, request);
                    ORDER_STATE_LIVE
                };
                self.publish(&OuchEvent::OrderAccepted(OrderAccepted {
                    timestamp: timestamp(),
                    order_token: request.order_token,
                    account_type: request.account_type,
                    account_id: request.account_id,
                    side: request.side,
                    shares: request.shares,
                    book_id: request.book_id,
                    price: request.price,
                    time_in_force: request.time_in_force,
                    client_id: request.client_id,
                    order_reference,
                    minimum_quantity: request.minimum_quantity,
                    order_state,
                }));
            }
            Err(error) => self.reject(request.order_token, error),
        }
    }

    fn replace_order(&mut self, request: ReplaceOrder) {
        let result = self.lock_engine().replace_order(
            u64::from(request.existing_token),
            u64::from(request.replacement_token),
            request.price,
            request.shares,
        );
        match result {
            Ok(()) => {
                let previous = self.orders.remove(&request.existing_token);
                let (side, book_id) = previous
                    .map(|order| (order.side, order.book_id))
                    .unwrap_or((b' ', 0));
                if let Some(mut order) = previous {
                    order.order_token = request.replacement_token;
                    order.shares = request.shares;
                    order.price = request.price;
                    self.orders.insert(request.replacement_token, order);
                }
                let order_reference = self.next_order_reference();
                self.publish(&OuchEvent::OrderReplaced(OrderReplaced {
                    timestamp: timestamp(),
                    replacement_token: request.replacement_token,
                    side,
                    shares: request.shares,
                    book_id,
                    price: request.price,
                    order_reference,
                    order_state: ORDER_STATE_LIVE,
                    previous_token: request.existing_token,
                }));
            }
            Err(error) => self.reject(request.replacement_token, error),
        }
    }

    fn cancel_order(&mut self, request: CancelOrder) {
        let result = self
            .lock_engine()
            .delete_order(u64::from(request.order_token));
        match result {
            Ok(()) => {
                let shares = self
                    .orders
                    .remove(&request.order_token)
                    .map(|order| order.shares)
                    .unwrap_or(0);
                self.publish(&OuchEvent::OrderCanceled(OrderCanceled {
                    timestamp: timestamp(),
                    order_token: request.order_token,
                    shares,
                    reason: CANCEL_BY_USER,
                }));
            }
            Err(error) => self.reject(request.order_token, error),
        }
    }

    fn reject(&mut self, order_token: u32, error: MatchError) {
        debug!(order_token, %error, "order-entry request rejected");
        self.publish(&OuchEvent::OrderRejected(OrderRejected {
            timestamp: timestamp(),
            order_token,
            reason: reject_reason(error),
        }));
    }

    fn publish(&self, event: &OuchEvent) {
        let mut payload = vec![0u8; event.wire_size()];
        if event.serialize(&mut payload) == 0 {
            warn!(tag = event.tag(), "failed to serialize outbound event");
            return;
        }
        let mut framed = Vec::with_capacity(payload.len() + gateway_protocol::LENGTH_PREFIX_SIZE);
        if Framer::frame_into(&payload, &mut framed).is_err() {
            warn!(tag = event.tag(), "outbound event too large to frame");
            return;
        }
        if !self.publisher.publish(&framed) {
            warn!(tag = event.tag(), "outbound pipeline refused event");
        }
    }

    fn next_order_reference(&mut self) -> u64 {
        let reference = self.next_order_reference;
        self.next_order_reference += 1;
        reference
    }

    fn lock_engine(&self) -> MutexGuard<'_, E> {
        match self.engine.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InMemoryEngine;
    use gateway_transport::{IdleStrategy, LoopbackTransport, Transport};
    use std::time::{Duration, Instant};

    fn session() -> (
        OrderEntrySession<InMemoryEngine>,
        Arc<Mutex<InMemoryEngine>>,
        Arc<LoopbackTransport>,
        Arc<OutboundPipeline>,
    ) {
        let mut engine = InMemoryEngine::new();
        engine.add_symbol(4, *b"EUR_USD ").unwrap();
        let engine = Arc::new(Mutex::new(engine));

        let transport = Arc::new(LoopbackTransport::new(1024));
        let mut pipeline = OutboundPipeline::new(
            transport.clone() as Arc<dyn Transport>,
            4096,
            256,
            IdleStrategy::BusyYield,
        );
        pipeline.start();
        let pipeline = Arc::new(pipeline);

        let session = OrderEntrySession::new(engine.clone(), pipeline.clone());
        (session, engine, transport, pipeline)
    }

    fn framed_request(request: &OuchRequest) -> Vec<u8> {
        let mut payload = vec![0u8; request.wire_size()];
        assert_eq!(request.serialize(&mut payload), request.wire_size());
        let mut framed = Vec::new();
        Framer::frame_into(&payload, &mut framed).unwrap();
        framed
    }

    fn enter_order(token: u32, price: u32) -> EnterOrder {
        EnterOrder {
            order_token: token,
            account_type: b'C',
            account_id: 7,
            side: b'B',
            shares: 100,
            book_id: 4,
            price,
            time_in_force: 0,
            client_id: 12,
            minimum_quantity: 1,
        }
    }

    /// Drain outbound events, reassembling frames from the transport.
    fn collect_events(transport: &LoopbackTransport, expected: usize) -> Vec<OuchEvent> {
        let mut framer = Framer::new();
        let mut events = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while events.len() < expected && Instant::now() < deadline {
            transport.poll(
                &mut |fragment| {
                    framer
                        .process(&fragment, |bytes| {
                            events.push(OuchEvent::deserialize(bytes)?);
                            Ok::<(), CodecError>(())
                        })
                        .unwrap();
                },
                16,
            );
            std::thread::yield_now();
        }
        events
    }

    #[test]
    fn limit_order_is_accepted() {
        let (mut session, engine, transport, _pipeline) = session();
        session.on_fragment(&framed_request(&OuchRequest::EnterOrder(enter_order(1001, 10050))));

        let events = collect_events(&transport, 1);
        match &events[..] {
            [OuchEvent::OrderAccepted(a)] => {
                assert_eq!(a.order_token, 1001);
                assert_eq!(a.price, 10050);
                assert_eq!(a.order_state, ORDER_STATE_LIVE);
            }
            other => panic!("unexpected events: {:?}", other),
        }
        assert_eq!(engine.lock().unwrap().open_quantity(1001), Some(100));
    }

    #[test]
    fn market_order_is_accepted_as_done() {
        let (mut session, engine, transport, _pipeline) = session();
        session.on_fragment(&framed_request(&OuchRequest::EnterOrder(enter_order(
            1001,
            MARKET_ORDER_PRICE,
        ))));

        let events = collect_events(&transport, 1);
        match &events[..] {
            [OuchEvent::OrderAccepted(a)] => assert_eq!(a.order_state, ORDER_STATE_DONE),
            other => panic!("unexpected events: {:?}", other),
        }
        assert_eq!(engine.lock().unwrap().order_count(), 0);
    }

    #[test]
    fn unknown_book_is_rejected() {
        let (mut session, _engine, transport, _pipeline) = session();
        let request = EnterOrder {
            book_id: 99,
            ..enter_order(1001, 10050)
        };
        session.on_fragment(&framed_request(&OuchRequest::EnterOrder(request)));

        let events = collect_events(&transport, 1);
        match &events[..] {
            [OuchEvent::OrderRejected(r)] => {
                assert_eq!(r.order_token, 1001);
                assert_eq!(r.reason, b'U');
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn replace_then_cancel_full_round() {
        let (mut session, engine, transport, _pipeline) = session();
        session.on_fragment(&framed_request(&OuchRequest::EnterOrder(enter_order(1001, 10050))));
        session.on_fragment(&framed_request(&OuchRequest::ReplaceOrder(ReplaceOrder {
            existing_token: 1001,
            replacement_token: 1002,
            shares: 80,
            price: 10060,
        })));
        session.on_fragment(&framed_request(&OuchRequest::CancelOrder(CancelOrder {
            order_token: 1002,
        })));

        let events = collect_events(&transport, 3);
        match &events[..] {
            [OuchEvent::OrderAccepted(_), OuchEvent::OrderReplaced(r), OuchEvent::OrderCanceled(c)] =>
            {
                assert_eq!(r.replacement_token, 1002);
                assert_eq!(r.previous_token, 1001);
                assert_eq!(r.side, b'B');
                assert_eq!(r.book_id, 4);
                assert_eq!(c.order_token, 1002);
                assert_eq!(c.shares, 80);
                assert_eq!(c.reason, CANCEL_BY_USER);
            }
            other => panic!("unexpected events: {:?}", other),
        }
        assert_eq!(engine.lock().unwrap().order_count(), 0);
    }

    #[test]
    fn cancel_of_unknown_order_is_rejected() {
        let (mut session, _engine, transport, _pipeline) = session();
        session.on_fragment(&framed_request(&OuchRequest::CancelOrder(CancelOrder {
            order_token: 77,
        })));

        let events = collect_events(&transport, 1);
        match &events[..] {
            [OuchEvent::OrderRejected(r)] => {
                assert_eq!(r.order_token, 77);
                assert_eq!(r.reason, b'N');
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn requests_split_across_fragments_still_apply() {
        let (mut session, engine, transport, _pipeline) = session();
        let framed = framed_request(&OuchRequest::EnterOrder(enter_order(1001, 10050)));
        session.on_fragment(&framed[..1]);
        session.on_fragment(&framed[1..3]);
        session.on_fragment(&framed[3..]);

        let events = collect_events(&transport, 1);
        assert!(matches!(events[..], [OuchEvent::OrderAccepted(_)]));
        assert_eq!(engine.lock().unwrap().open_quantity(1001), Some(100));
    }

    #[test]
    fn unknown_request_tag_is_skipped() {
        let (mut session, _engine, transport, _pipeline) = session();
        let mut stream = Vec::new();
        Framer::frame_into(&[b'?', 0, 0], &mut stream).unwrap();
        stream.extend_from_slice(&framed_request(&OuchRequest::EnterOrder(enter_order(
            1001, 10050,
        ))));
        session.on_fragment(&stream);

        let events = collect_events(&transport, 1);
        assert!(matches!(events[..], [OuchEvent::OrderAccepted(_)]));
    }
}
