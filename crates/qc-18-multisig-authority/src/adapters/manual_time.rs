//! Manually driven clock.

use crate::ports::outbound::TimeSource;
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock that only moves when told to. Shared via `Arc` between the service
/// and whoever drives time (tests, simulations, replay tools).
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    /// Clock starting at `initial` seconds.
    pub fn new(initial: u64) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to `time`.
    pub fn set(&self, time: u64) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }
}
