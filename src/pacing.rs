//! Blocking pauses between attempts.

use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait. Swapped out in tests so nothing really sleeps.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Uniform window a reading pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingWindow {
    pub min: Duration,
    pub max: Duration,
}

impl PacingWindow {
    pub fn pick(&self) -> Duration {
        let span = self.max.saturating_sub(self.min);
        self.min + span.mul_f64(fastrand::f64())
    }
}

impl Default for PacingWindow {
    /// 25-35 seconds, roughly one page of reading.
    fn default() -> Self {
        Self {
            min: Duration::from_secs(25),
            max: Duration::from_secs(35),
        }
    }
}
