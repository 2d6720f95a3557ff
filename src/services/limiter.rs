// src/services/limiter.rs

//! Fixed-interval request gate.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Lets at most one request through per interval, across all callers.
///
/// Callers queue on the gate in arrival order. The next free slot is
/// advanced before the lock is released, so the interval holds under
/// concurrent use.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Build from a millisecond interval; `0` yields no limiter.
    pub fn from_millis(ms: u64) -> Option<Self> {
        (ms > 0).then(|| Self::new(Duration::from_millis(ms)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until this caller may send a request.
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(slot) = *next_slot {
            if slot > Instant::now() {
                sleep_until(slot).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}
