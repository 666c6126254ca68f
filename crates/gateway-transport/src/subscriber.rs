//! Inbound pipeline: drain thread polling a transport into handlers.
//!
//! The registered data handler receives fragments in arrival order,
//! exactly once, synchronously on the drain thread. When the peer
//! closes, the end-of-stream handler fires once after the last fragment
//! has been delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use tracing::{error, info};

use crate::idle::IdleStrategy;
use crate::transport::Transport;

type DataHandler = Box<dyn FnMut(Bytes) + Send>;
type EndOfStreamHandler = Box<dyn FnMut() + Send>;

struct Shared {
    running: AtomicBool,
    transport: Arc<dyn Transport>,
    fragment_limit: usize,
    idle: IdleStrategy,
    data_handler: Mutex<Option<DataHandler>>,
    end_of_stream_handler: Mutex<Option<EndOfStreamHandler>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Polling subscriber with a dedicated drain thread.
pub struct InboundPipeline {
    shared: Arc<Shared>,
    drain: Option<JoinHandle<()>>,
}

impl InboundPipeline {
    /// Create a stopped pipeline. Register handlers, then
    /// [`start`](Self::start).
    pub fn new(transport: Arc<dyn Transport>, fragment_limit: usize, idle: IdleStrategy) -> Self {
        Self {
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                transport,
                fragment_limit,
                idle,
                data_handler: Mutex::new(None),
                end_of_stream_handler: Mutex::new(None),
            }),
            drain: None,
        }
    }

    /// Register the fragment handler, replacing any prior one.
    pub fn set_data_handler(&self, handler: impl FnMut(Bytes) + Send + 'static) {
        *lock(&self.shared.data_handler) = Some(Box::new(handler));
    }

    /// Register the end-of-stream handler, replacing any prior one.
    pub fn set_end_of_stream_handler(&self, handler: impl FnMut() + Send + 'static) {
        *lock(&self.shared.end_of_stream_handler) = Some(Box::new(handler));
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
                .name("inbound-drain".to_string())
                .spawn(move || drain_loop(&shared))
                .unwrap_or_else(|e| panic!("failed to spawn inbound drain thread: {e}")),
        );
        info!("inbound pipeline started");
    }

    /// Request the drain thread to finish its current pass and exit.
    /// Flag-flip only; pair with [`wait`](Self::wait).
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
    }

    /// Join the drain thread if one is running.
    pub fn wait(&mut self) {
        if let Some(handle) = self.drain.take() {
            if handle.join().is_err() {
                error!("inbound drain thread panicked");
            }
        }
    }
}

impl Drop for InboundPipeline {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}

fn drain_loop(shared: &Shared) {
    let mut end_of_stream_seen = false;
    while shared.running.load(Ordering::SeqCst) {
        let fragments = {
            let mut handler = lock(&shared.data_handler);
            match handler.as_mut() {
                Some(on_fragment) => shared
                    .transport
                    .poll(&mut |fragment| on_fragment(fragment), shared.fragment_limit),
                None => 0,
            }
        };

        if fragments == 0 && !end_of_stream_seen {
            let mut handler = lock(&shared.end_of_stream_handler);
            let mut notify = || {
                if let Some(on_end_of_stream) = handler.as_mut() {
                    on_end_of_stream();
                }
            };
            if shared.transport.poll_end_of_stream(&mut notify) > 0 {
                end_of_stream_seen = true;
                info!("transport reported end of stream");
            }
        }

        shared.idle.idle(fragments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackTransport;
    use crate::transport::OfferOutcome;
    use std::time::{Duration, Instant};

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::yield_now();
        }
        done()
    }

    #[test]
    fn fragments_reach_the_handler_in_order() {
        let transport = Arc::new(LoopbackTransport::new(64));
        let mut pipeline = InboundPipeline::new(transport.clone(), 16, IdleStrategy::BusyYield);

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        pipeline.set_data_handler(move |fragment| {
            lock(&sink).push(fragment.to_vec());
        });
        pipeline.start();

        assert_eq!(transport.offer(b"first"), OfferOutcome::Accepted);
        assert_eq!(transport.offer(b"second"), OfferOutcome::Accepted);

        assert!(wait_until(Duration::from_secs(5), || lock(&received).len() == 2));
        pipeline.stop();
        pipeline.wait();

        let received = lock(&received);
        assert_eq!(received[0], b"first");
        assert_eq!(received[1], b"second");
    }

    #[test]
    fn end_of_stream_fires_once_after_the_last_fragment() {
        let transport = Arc::new(LoopbackTransport::new(64));
        let mut pipeline = InboundPipeline::new(transport.clone(), 16, IdleStrategy::BusyYield);

        let fragments = Arc::new(Mutex::new(0usize));
        let ends = Arc::new(Mutex::new(0usize));
        let fragment_count = Arc::clone(&fragments);
        let end_count = Arc::clone(&ends);
        pipeline.set_data_handler(move |_| *lock(&fragment_count) += 1);
        pipeline.set_end_of_stream_handler(move || *lock(&end_count) += 1);
        pipeline.start();

        assert_eq!(transport.offer(b"payload"), OfferOutcome::Accepted);
        transport.close();

        assert!(wait_until(Duration::from_secs(5), || *lock(&ends) == 1));
        // Give the loop a few more passes; the notification must not repeat.
        thread::sleep(Duration::from_millis(20));
        pipeline.stop();
        pipeline.wait();

        assert_eq!(*lock(&fragments), 1);
        assert_eq!(*lock(&ends), 1);
    }

    #[test]
    fn replacing_the_handler_redirects_delivery() {
        let transport = Arc::new(LoopbackTransport::new(64));
        let mut pipeline = InboundPipeline::new(transport.clone(), 16, IdleStrategy::BusyYield);

        let first = Arc::new(Mutex::new(0usize));
        let second = Arc::new(Mutex::new(0usize));
        let first_count = Arc::clone(&first);
        pipeline.set_data_handler(move |_| *lock(&first_count) += 1);
        pipeline.start();

        assert_eq!(transport.offer(b"a"), OfferOutcome::Accepted);
        assert!(wait_until(Duration::from_secs(5), || *lock(&first) == 1));

        let second_count = Arc::clone(&second);
        pipeline.set_data_handler(move |_| *lock(&second_count) += 1);
        assert_eq!(transport.offer(b"b"), OfferOutcome::Accepted);
        assert!(wait_until(Duration::from_secs(5), || *lock(&second) == 1));
        pipeline.stop();
        pipeline.wait();

        assert_eq!(*lock(&first), 1);
        assert_eq!(*lock(&second), 1);
    }
}
