//! One-shot phase timer.
//!
//! Models the single hardware compare timer each node owns: it is armed for
//! one period, fires once, and must be re-armed explicitly for the next
//! period. While disarmed, waiting on it never completes, so it can sit in a
//! `select!` branch next to link I/O.

use std::future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::trace;

#[derive(Debug, Default)]
pub struct OneShotTimer {
    deadline: Option<Instant>,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for one period starting now, replacing any pending deadline.
    pub fn arm(&mut self, period: Duration) {
        trace!(period_ms = period.as_millis() as u64, "Timer armed");
        self.deadline = Some(Instant::now() + period);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait for the armed period to elapse, then disarm.
    ///
    /// Pends forever while disarmed. Cancel-safe: dropping the future leaves
    /// the deadline in place.
    pub async fn expired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
                trace!("Timer expired");
            }
            None => future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_period() {
        let mut timer = OneShotTimer::new();
        let start = Instant::now();

        timer.arm(Duration::from_millis(1000));
        assert!(timer.is_armed());
        timer.expired().await;

        assert_eq!(start.elapsed(), Duration::from_millis(1000));
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_never_fires() {
        let mut timer = OneShotTimer::new();
        timer.arm(Duration::from_millis(10));
        timer.disarm();

        let fired = tokio::time::timeout(Duration::from_secs(60), timer.expired()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_deadline() {
        let mut timer = OneShotTimer::new();
        let start = Instant::now();

        timer.arm(Duration::from_millis(100));
        timer.arm(Duration::from_millis(500));
        timer.expired().await;

        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }
}
