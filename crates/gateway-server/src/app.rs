//! Demo application wiring.
//!
//! Stands up a complete order-entry path over the loopback transport:
//! a request transport feeding an inbound pipeline, the session applying
//! requests to an [`InMemoryEngine`], and an outbound pipeline carrying
//! the response events back. The demo plays a small order lifecycle
//! (enter, replace, cancel, plus one reject) and prints the responses.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tracing::{info, warn};

use gateway_core::MatchingEngine;
use gateway_protocol::ouch::{CancelOrder, EnterOrder, ReplaceOrder};
use gateway_protocol::{CodecError, Framer, OuchEvent, OuchRequest};
use gateway_transport::{
    IdleStrategy, InboundPipeline, LoopbackTransport, OutboundPipeline, PipelineSettings,
    Transport,
};

use crate::engine::InMemoryEngine;
use crate::ouch_session::OrderEntrySession;

/// Everything the demo owns, torn down in order on drop.
struct Gateway {
    requests: Arc<LoopbackTransport>,
    responses: Arc<LoopbackTransport>,
    inbound: InboundPipeline,
    outbound: Arc<OutboundPipeline>,
    engine: Arc<Mutex<InMemoryEngine>>,
}

impl Gateway {
    fn new(settings: &PipelineSettings) -> Result<Self> {
        let mut engine = InMemoryEngine::new();
        engine
            .add_symbol(1, *b"EUR_USD ")
            .map_err(|e| anyhow::anyhow!("failed to seed demo symbol: {e}"))?;
        let engine = Arc::new(Mutex::new(engine));

        let requests = Arc::new(LoopbackTransport::new(settings.fragment_limit));
        let responses = Arc::new(LoopbackTransport::new(settings.fragment_limit));

        let mut outbound = OutboundPipeline::new(
            responses.clone() as Arc<dyn Transport>,
            settings.buffer_size,
            settings.message_size,
            IdleStrategy::BusyYield,
        );
        outbound.start();
        let outbound = Arc::new(outbound);

        let mut session = OrderEntrySession::new(engine.clone(), outbound.clone());
        let mut inbound = InboundPipeline::new(
            requests.clone() as Arc<dyn Transport>,
            settings.fragment_limit,
            IdleStrategy::BusyYield,
        );
        inbound.set_data_handler(move |fragment| session.on_fragment(&fragment));
        inbound.set_end_of_stream_handler(|| info!("order-entry stream ended"));
        inbound.start();

        Ok(Self {
            requests,
            responses,
            inbound,
            outbound,
            engine,
        })
    }

    fn send(&self, request: &OuchRequest) -> Result<()> {
        let mut payload = vec![0u8; request.wire_size()];
        if request.serialize(&mut payload) == 0 {
            bail!("failed to serialize request with tag {}", request.tag());
        }
        let mut framed = Vec::new();
        Framer::frame_into(&payload, &mut framed)?;
        let outcome = self.requests.offer(&framed);
        if outcome.is_transient() {
            bail!("request transport back-pressured the demo");
        }
        Ok(())
    }

    /// Collect `expected` response events or time out.
    fn await_responses(&self, expected: usize, timeout: Duration) -> Vec<OuchEvent> {
        let mut framer = Framer::new();
        let mut events = Vec::new();
        let deadline = Instant::now() + timeout;
        while events.len() < expected && Instant::now() < deadline {
            self.responses.poll(
                &mut |fragment| {
                    let decoded = framer.process(&fragment, |bytes| {
                        events.push(OuchEvent::deserialize(bytes)?);
                        Ok::<(), CodecError>(())
                    });
                    if let Err(error) = decoded {
                        warn!(%error, "undecodable response");
                        framer.reset();
                    }
                },
                16,
            );
            std::thread::yield_now();
        }
        events
    }

    fn shutdown(mut self) {
        self.inbound.stop();
        self.inbound.wait();
        self.outbound.stop();
        // The outbound drain joins when the last Arc drops.
    }
}

/// Run the demo lifecycle and exit.
pub fn run(settings: PipelineSettings) -> Result<()> {
    info!(
        channel = %settings.channel,
        stream_id = settings.stream_id,
        "starting gateway demo"
    );
    let gateway = Gateway::new(&settings)?;

    gateway.send(&OuchRequest::EnterOrder(EnterOrder {
        order_token: 1001,
        account_type: b'C',
        account_id: 7,
        side: b'B',
        shares: 100,
        book_id: 1,
        price: 10050,
        time_in_force: 0,
        client_id: 12,
        minimum_quantity: 1,
    }))?;
    gateway.send(&OuchRequest::ReplaceOrder(ReplaceOrder {
        existing_token: 1001,
        replacement_token: 1002,
        shares: 80,
        price: 10060,
    }))?;
    gateway.send(&OuchRequest::CancelOrder(CancelOrder { order_token: 1002 }))?;
    // Unknown order: the engine rejects and the gateway answers 'J'.
    gateway.send(&OuchRequest::CancelOrder(CancelOrder { order_token: 9999 }))?;

    let events = gateway.await_responses(4, Duration::from_secs(5));
    for event in &events {
        match event {
            OuchEvent::OrderAccepted(e) => {
                info!(token = e.order_token, price = e.price, "order accepted")
            }
            OuchEvent::OrderReplaced(e) => {
                info!(token = e.replacement_token, price = e.price, "order replaced")
            }
            OuchEvent::OrderCanceled(e) => {
                info!(token = e.order_token, shares = e.shares, "order canceled")
            }
            OuchEvent::OrderRejected(e) => {
                info!(token = e.order_token, reason = e.reason, "order rejected")
            }
            other => info!(tag = other.tag(), "event"),
        }
    }
    if events.len() < 4 {
        warn!(received = events.len(), "demo finished with missing responses");
    }

    let open_orders = match gateway.engine.lock() {
        Ok(engine) => engine.order_count(),
        Err(poisoned) => poisoned.into_inner().order_count(),
    };
    info!(open_orders, "demo complete, shutting down");
    gateway.shutdown();
    Ok(())
}
