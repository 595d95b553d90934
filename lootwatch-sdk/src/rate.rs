//! Trailing event-rate window.

use std::sync::atomic::{AtomicU64, Ordering};

use lootwatch_types::RATE_WINDOW_SECS;

const SLOTS: usize = RATE_WINDOW_SECS as usize;

/// Per-second event counters covering the last ten seconds.
///
/// Slot `s % 10` holds the count for epoch second `s`. A slot is only
/// reset when the next event for a different second lands in it, so stale
/// slots linger and are filtered out at read time.
///
/// Writes are plain relaxed stores; consistency with the rest of the
/// telemetry comes from the enclosing sequence lock.
#[derive(Debug, Default)]
pub struct RateWindow {
    seconds: [AtomicU64; SLOTS],
    counts: [AtomicU64; SLOTS],
}

/// Plain copy of a [`RateWindow`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateBuckets {
    pub seconds: [u64; SLOTS],
    pub counts: [u64; SLOTS],
}

impl RateWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event at `timestamp_ms`.
    pub fn record(&self, timestamp_ms: u64) {
        let second = timestamp_ms / 1000;
        let slot = (second % RATE_WINDOW_SECS) as usize;
        if self.seconds[slot].load(Ordering::Relaxed) != second {
            self.seconds[slot].store(second, Ordering::Relaxed);
            self.counts[slot].store(0, Ordering::Relaxed);
        }
        let count = self.counts[slot].load(Ordering::Relaxed);
        self.counts[slot].store(count + 1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        for slot in 0..SLOTS {
            self.seconds[slot].store(0, Ordering::Relaxed);
            self.counts[slot].store(0, Ordering::Relaxed);
        }
    }

    /// Copy every slot with relaxed loads.
    pub fn load(&self) -> RateBuckets {
        let mut buckets = RateBuckets::default();
        for slot in 0..SLOTS {
            buckets.seconds[slot] = self.seconds[slot].load(Ordering::Relaxed);
            buckets.counts[slot] = self.counts[slot].load(Ordering::Relaxed);
        }
        buckets
    }
}

impl RateBuckets {
    /// Average events per second over the window ending at `now_ms`, scaled
    /// by 100 and truncated.
    ///
    /// A slot contributes only if its second is no later than now and less
    /// than ten seconds before it.
    pub fn rate_x100(&self, now_ms: u64) -> u64 {
        let now = now_ms / 1000;
        let total: u64 = self
            .seconds
            .iter()
            .zip(self.counts.iter())
            .filter(|(second, _)| **second <= now && now - **second < RATE_WINDOW_SECS)
            .map(|(_, count)| *count)
            .sum();
        total * 100 / RATE_WINDOW_SECS
    }
}
