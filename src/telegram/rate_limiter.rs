//! Pacing for consecutive outbound sends.
//!
//! Telegram throttles bursts of photo messages to one chat; the Mars rover
//! handler spaces its sends through this limiter.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Keeps at least `min_interval` between two acquisitions.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_send: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_send: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleeps until the interval since the previous send has elapsed, then
    /// records a new send.
    ///
    /// Returns how long it slept.
    pub async fn wait_and_acquire(&self) -> Duration {
        let mut last_send = self.last_send.lock().await;

        let pause = last_send.map_or(Duration::ZERO, |at| {
            self.min_interval.saturating_sub(at.elapsed())
        });

        if !pause.is_zero() {
            debug!("Pacing: waiting {:?} before next send", pause);
            tokio::time::sleep(pause).await;
        }

        *last_send = Some(Instant::now());
        pause
    }
}
