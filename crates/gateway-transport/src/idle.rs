//! Idle strategies for the drain threads.

use std::thread;
use std::time::Duration;

/// How a drain thread waits when it has no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleStrategy {
    /// `thread::yield_now` on every idle pass. Lowest latency, burns a
    /// core while the pipeline is quiet.
    BusyYield,
    /// Sleep a fixed number of microseconds on every idle pass.
    Sleep(u64),
}

impl Default for IdleStrategy {
    fn default() -> Self {
        IdleStrategy::BusyYield
    }
}

impl IdleStrategy {
    /// Idle once given the amount of work the last pass produced.
    /// Non-zero work means the pass was productive and no wait happens.
    pub fn idle(self, work_count: usize) {
        if work_count > 0 {
            return;
        }
        match self {
            IdleStrategy::BusyYield => thread::yield_now(),
            IdleStrategy::Sleep(micros) => thread::sleep(Duration::from_micros(micros)),
        }
    }
}
