use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use alloy_primitives::U256;

/// Source of the current time in seconds, playing the role of the block
/// timestamp for off-chain hosts. Must never move backwards.
pub trait Clock {
    fn now(&self) -> U256;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> U256 {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();

        U256::from(seconds)
    }
}

/// Hand-driven clock for simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self(AtomicU64::new(start))
    }

    pub fn advance(&self, seconds: u64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Moves the clock to `timestamp`; earlier timestamps are ignored.
    pub fn set(&self, timestamp: u64) {
        self.0.fetch_max(timestamp, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> U256 {
        U256::from(self.0.load(Ordering::SeqCst))
    }
}
