//! Token bucket shared by every call issued through one client.
//!
//! Uses the `governor` crate (GCRA) for the bucket itself and a fair Tokio
//! mutex to hand tokens out in request order.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use tokio::sync::Mutex;

use crate::{CallContext, MistyError, Result};

/// Token bucket refilled at `rate` tokens per second, holding at most `burst`.
pub struct RateLimiter {
    bucket: DefaultDirectRateLimiter,
    // Tokio's mutex is FIFO, so waiters are served in arrival order.
    queue: Mutex<()>,
    rate: f64,
    burst: u32,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.rate)
            .field("burst", &self.burst)
            .finish()
    }
}

impl RateLimiter {
    /// Creates a full bucket.
    ///
    /// `rate` must be finite and positive and `burst` non-zero.
    pub fn new(rate: f64, burst: u32) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(MistyError::InvalidOptions(format!(
                "request rate must be a positive number, got {rate}"
            )));
        }
        let burst_size = NonZeroU32::new(burst).ok_or_else(|| {
            MistyError::InvalidOptions("request burst must be at least 1".to_owned())
        })?;
        let period = Duration::try_from_secs_f64(1.0 / rate).map_err(|_| {
            MistyError::InvalidOptions(format!("request rate {rate} is too low"))
        })?;
        let quota = Quota::with_period(period)
            .ok_or_else(|| {
                MistyError::InvalidOptions(format!("request rate {rate} is too high"))
            })?
            .allow_burst(burst_size);

        Ok(Self {
            bucket: GovernorRateLimiter::direct(quota),
            queue: Mutex::new(()),
            rate,
            burst,
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Waits for one token.
    ///
    /// Fails without consuming a token if `ctx` has already fired, and gives
    /// up the wait as soon as it fires.
    pub async fn acquire(&self, ctx: &CallContext) -> Result<()> {
        ctx.run(async {
            let _turn = self.queue.lock().await;
            self.bucket.until_ready().await;
        })
        .await
    }

    /// Takes a token if one is available right now, ignoring queued waiters.
    #[cfg(test)]
    pub(crate) fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}
