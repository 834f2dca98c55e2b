//! Bounded retry with exponential backoff
//!
//! Only the publication boundary retries; every other pipeline stage fails
//! fast because re-running a generation stage would change the creative
//! output.

use std::time::Duration;

use tracing::warn;

/// Retry schedule: `max_attempts` tries, delays growing from `base_delay`
/// by `multiplier` per attempt, capped at `cap`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub cap: Duration,
}

impl RetryPolicy {
    /// The content-store publication schedule: 3 attempts, 2s initial
    /// delay, doubling, capped at 10s.
    pub fn publication() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
            cap: Duration::from_secs(10),
        }
    }

    /// Delay before the retry following failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.cap.as_secs_f64()))
    }

    /// Run `op` until it succeeds, the error is not transient, or the
    /// attempt budget is exhausted.
    pub async fn run<T, E, Fut>(
        &self,
        mut op: impl FnMut() -> Fut,
        is_transient: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        E: std::fmt::Display,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) && attempt + 1 < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        retry_in_secs = delay.as_secs_f64(),
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            multiplier: 2.0,
            cap: Duration::from_millis(4),
        }
    }

    #[test]
    fn publication_delays_double_and_cap() {
        let policy = RetryPolicy::publication();
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
        // Anything past the doubling runway pins to the cap.
        assert_eq!(policy.delay_for(3), Duration::from_secs(10));
        assert_eq!(policy.delay_for(10), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = quick_policy()
            .run(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move { if n < 2 { Err("flaky".to_string()) } else { Ok(n) } }
                },
                |_| true,
            )
            .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_attempts_on_persistent_transient_failure() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = quick_policy()
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("still down".to_string()) }
                },
                |_| true,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = quick_policy()
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("bad request".to_string()) }
                },
                |_| false,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
