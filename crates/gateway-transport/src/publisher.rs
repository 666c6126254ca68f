//! Outbound pipeline: ring buffer + drain thread in front of a transport.
//!
//! Producers call [`OutboundPipeline::publish`] from any thread; a
//! dedicated drain thread moves buffered bytes to the transport. The
//! drain commit is retry-safe: bytes are peeked, offered, and only
//! discarded from the ring once the transport has accepted them, so a
//! back-pressured offer retries the exact same bytes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use gateway_core::RingByteBuffer;

use crate::idle::IdleStrategy;
use crate::transport::{OfferOutcome, Transport};

struct Shared {
    buffer: Mutex<RingByteBuffer>,
    running: AtomicBool,
    transport: Arc<dyn Transport>,
    message_size: usize,
    idle: IdleStrategy,
}

impl Shared {
    fn lock_buffer(&self) -> MutexGuard<'_, RingByteBuffer> {
        match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Buffered publisher with a dedicated drain thread.
pub struct OutboundPipeline {
    shared: Arc<Shared>,
    drain: Option<JoinHandle<()>>,
}

impl OutboundPipeline {
    /// Create a stopped pipeline. Call [`start`](Self::start) to spawn
    /// the drain thread.
    pub fn new(
        transport: Arc<dyn Transport>,
        buffer_size: usize,
        message_size: usize,
        idle: IdleStrategy,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                buffer: Mutex::new(RingByteBuffer::new(buffer_size)),
                running: AtomicBool::new(false),
                transport,
                message_size,
                idle,
            }),
            drain: None,
        }
    }

    /// Spawn the drain thread, restarting cleanly if one is already
    /// running.
    pub fn start(&mut self) {
        self.stop();
        self.wait();

        self.shared.running.store(true, Ordering::SeqCst);
        let shared = Arc::clone(&self.shared);
        self.drain = Some(
            thread::Builder::new()
                .name("outbound-drain".to_string())
                .spawn(move || drain_loop(&shared))
                // Thread spawn only fails on resource exhaustion, at
                // which point the process is already lost.
                .unwrap_or_else(|e| panic!("failed to spawn outbound drain thread: {e}")),
        );
        info!("outbound pipeline started");
    }

    /// Request the drain thread to finish its current pass and exit.
    ///
    /// Only flips an atomic flag: safe to call from contexts that must
    /// not lock or allocate, including signal handlers. Pair with
    /// [`wait`](Self::wait) from normal context.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
    }

    /// Join the drain thread if one is running.
    pub fn wait(&mut self) {
        if let Some(handle) = self.drain.take() {
            if handle.join().is_err() {
                error!("outbound drain thread panicked");
            }
        }
    }

    /// Buffer `data` for transmission, blocking (by idling) while the
    /// ring is full. Returns `false` only if the pipeline is stopped or
    /// `data` can never fit; buffered data is never dropped.
    pub fn publish(&self, data: &[u8]) -> bool {
        {
            let buffer = self.shared.lock_buffer();
            if data.len() > buffer.capacity() {
                warn!(
                    size = data.len(),
                    capacity = buffer.capacity(),
                    "message larger than the outbound buffer"
                );
                return false;
            }
        }
        loop {
            if !self.shared.running.load(Ordering::SeqCst) {
                return false;
            }
            {
                let mut buffer = self.shared.lock_buffer();
                if buffer.try_push(data) {
                    return true;
                }
            }
            // Ring full: wait for the drain thread to make room. The
            // lock is released before idling.
            self.shared.idle.idle(0);
        }
    }

    /// Bytes currently waiting in the ring.
    pub fn backlog(&self) -> usize {
        self.shared.lock_buffer().occupied()
    }
}

impl Drop for OutboundPipeline {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}

fn drain_loop(shared: &Shared) {
    let mut scratch = vec![0u8; shared.message_size];
    while shared.running.load(Ordering::SeqCst) {
        // Peek under the lock, offer outside it.
        let peeked = {
            let buffer = shared.lock_buffer();
            let n = buffer.read(&mut scratch);
            if n == 0 && buffer.occupied() != 0 {
                error!(occupied = buffer.occupied(), "ring buffer returned no bytes");
            }
            n
        };
        if peeked == 0 {
            shared.idle.idle(0);
            continue;
        }

        match shared.transport.offer(&scratch[..peeked]) {
            OfferOutcome::Accepted => {
                let discarded = shared.lock_buffer().discard(peeked);
                if discarded != peeked {
                    error!(
                        expected = peeked,
                        discarded, "ring buffer commit fell short"
                    );
                }
            }
            OfferOutcome::BackPressured => {
                debug!(bytes = peeked, "transport back-pressured");
                shared.idle.idle(0);
            }
            OfferOutcome::NotConnected => {
                debug!("offer failed: no active subscribers");
                shared.idle.idle(0);
            }
            OfferOutcome::AdminAction => {
                debug!("offer failed because of an administration action");
                shared.idle.idle(0);
            }
            OfferOutcome::Closed => {
                warn!("offer failed: transport closed");
                shared.idle.idle(0);
            }
        }
    }
}
