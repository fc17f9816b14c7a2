//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::pacing::Sleeper;

/// Attempt budget and backoff curve.
///
/// The wait after failed attempt `n` (1-based) is
/// `base_delay * multiplier^(n-1)`, clamped to `[min_delay, max_delay]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Policy used for session renewal: 3 attempts, 4s..10s, doubling.
    pub const fn renewal() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }

    /// Wait before the attempt that follows failed attempt `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let raw = self.base_delay.as_secs_f64() * exp;
        let clamped = raw
            .min(self.max_delay.as_secs_f64())
            .max(self.min_delay.as_secs_f64());
        Duration::from_secs_f64(clamped)
    }

    /// Run `op` until it succeeds or the budget is spent.
    ///
    /// `op` receives the 1-based attempt number. On exhaustion the last error
    /// is returned with the number of attempts made.
    pub async fn run<T, E, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, (u32, E)>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= max_attempts => return Err((attempt, err)),
                Err(err) => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        ?delay,
                        error = %err,
                        "attempt failed, backing off"
                    );
                    sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::renewal()
    }
}
