//! In-process loopback transport.
//!
//! Backs the integration tests and the demo binary: one end offers
//! messages, the other polls them, over a shared in-memory queue. Flow
//! control is modeled with a fragment cap so back-pressure paths get
//! exercised without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use bytes::Bytes;

use crate::transport::{OfferOutcome, Transport};

/// Shared-queue transport where offers on one handle surface as polled
/// fragments on any handle. Clone-free: wrap in `Arc` to share.
pub struct LoopbackTransport {
    queue: Mutex<VecDeque<Bytes>>,
    /// Offers beyond this many undelivered fragments are back-pressured.
    in_flight_limit: usize,
    closed: AtomicBool,
    end_of_stream_reported: AtomicBool,
}

impl LoopbackTransport {
    pub fn new(in_flight_limit: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            in_flight_limit,
            closed: AtomicBool::new(false),
            end_of_stream_reported: AtomicBool::new(false),
        }
    }

    /// Close the transport: further offers fail with `Closed` and the
    /// consumer side observes end-of-stream once drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Undelivered fragments currently queued.
    pub fn pending(&self) -> usize {
        match self.queue.lock() {
            Ok(queue) => queue.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Transport for LoopbackTransport {
    fn offer(&self, message: &[u8]) -> OfferOutcome {
        if self.closed.load(Ordering::SeqCst) {
            return OfferOutcome::Closed;
        }
        let mut queue = match self.queue.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        };
        if queue.len() >= self.in_flight_limit {
            return OfferOutcome::BackPressured;
        }
        queue.push_back(Bytes::copy_from_slice(message));
        OfferOutcome::Accepted
    }

    fn poll(&self, on_fragment: &mut dyn FnMut(Bytes), fragment_limit: usize) -> usize {
        let mut delivered = 0;
        while delivered < fragment_limit {
            // Take one fragment at a time so the handler never runs
            // under the queue lock.
            let fragment = {
                let mut queue = match self.queue.lock() {
                    Ok(queue) => queue,
                    Err(poisoned) => poisoned.into_inner(),
                };
                queue.pop_front()
            };
            match fragment {
                Some(fragment) => {
                    on_fragment(fragment);
                    delivered += 1;
                }
                None => break,
            }
        }
        delivered
    }

    fn poll_end_of_stream(&self, on_end_of_stream: &mut dyn FnMut()) -> usize {
        if !self.closed.load(Ordering::SeqCst) || self.pending() > 0 {
            return 0;
        }
        if self
            .end_of_stream_reported
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            on_end_of_stream();
            1
        } else {
            0
        }
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}
