//! Minimum-interval throttling for the geocoding loop.
//!
//! A courtesy delay between successive provider calls, not a token
//! bucket: the pipeline is single-flight by contract, so one "time of
//! last call" is all the state needed. Built on [`tokio::time::Instant`],
//! which is monotonic (immune to wall-clock adjustment) and controllable
//! from tests via `tokio::time::pause()` — the limiter is an explicit
//! instance owned by the orchestrator, never ambient global state.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// Enforces a minimum delay between successive calls.
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Block until at least `min_interval` has elapsed since the previous
    /// `throttle` call returned. The first call never waits.
    pub async fn throttle(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!("Throttling geocode call for {:?}", wait);
                sleep(wait).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}
