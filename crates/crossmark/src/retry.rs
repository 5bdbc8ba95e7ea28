//! Caller-directed retry for transient storage failures.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::CrossmarkError;

/// Exponential backoff with random jitter.
///
/// Only errors whose [`kind`](CrossmarkError::kind) is
/// `StorageUnavailable` are retried. A conflict or a rule rejection
/// comes straight back: re-running the same intent against a moved game
/// would be wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total tries including the first. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Delay before the second try; doubles on each further try.
    pub base_delay: Duration,
    /// Upper bound for the doubled delay, before jitter.
    pub max_delay: Duration,
    /// Up to this much random time is added to every delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            jitter: Duration::from_millis(25),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// The backoff after failed attempt number `attempt` (1-based),
    /// without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jitter(&self) -> Duration {
        let max = u64::try_from(self.jitter.as_micros()).unwrap_or(u64::MAX);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::rng().random_range(0..=max))
    }

    /// The full wait after failed attempt `attempt`, jitter included.
    fn backoff(&self, attempt: u32) -> Duration {
        self.delay_for(attempt).saturating_add(self.jitter())
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// the attempts run out. Returns the last error in the latter cases.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, CrossmarkError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CrossmarkError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(attempt, "retry succeeded");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = whole_millis(delay),
                        error = %e,
                        "storage unavailable, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// `d` in milliseconds, saturating at `u64::MAX`.
fn whole_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossmark_store::StoreError;

    fn unavailable() -> CrossmarkError {
        StoreError::Unavailable("offline".into()).into()
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn test_delay_for_doubles_then_caps() {
        let p = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            jitter: Duration::ZERO,
        };
        assert_eq!(p.delay_for(1), Duration::from_millis(100));
        assert_eq!(p.delay_for(2), Duration::from_millis(200));
        assert_eq!(p.delay_for(3), Duration::from_millis(400));
        assert_eq!(p.delay_for(4), Duration::from_millis(500));
        assert_eq!(p.delay_for(40), Duration::from_millis(500));
    }

    #[test]
    fn test_whole_millis_saturates_instead_of_truncating() {
        assert_eq!(whole_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(whole_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_backoff_with_huge_delays_saturates() {
        let p = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::MAX,
            max_delay: Duration::MAX,
            jitter: Duration::from_millis(10),
        };
        assert_eq!(p.backoff(1), Duration::MAX);
        assert_eq!(whole_millis(p.backoff(2)), u64::MAX);
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let p = RetryPolicy::default();
        for _ in 0..100 {
            assert!(p.jitter() <= p.jitter);
        }
        let p = RetryPolicy {
            jitter: Duration::ZERO,
            ..RetryPolicy::default()
        };
        assert_eq!(p.jitter(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_retries_unavailable_until_success() {
        let mut calls = 0;

        let result = policy(5)
            .run(|| {
                calls += 1;
                let n = calls;
                async move { if n < 3 { Err(unavailable()) } else { Ok(n) } }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_gives_up_after_max_attempts() {
        let mut calls = 0;

        let result: Result<(), _> = policy(3)
            .run(|| {
                calls += 1;
                async { Err(unavailable()) }
            })
            .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_does_not_retry_rule_rejections() {
        let mut calls = 0;

        let result: Result<(), _> = policy(5)
            .run(|| {
                calls += 1;
                async {
                    Err(CrossmarkError::from(crossmark_game::RuleError::NotReady))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_zero_attempts_still_tries_once() {
        let mut calls = 0;

        let result = policy(0)
            .run(|| {
                calls += 1;
                async { Ok::<_, CrossmarkError>(()) }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_deserialize_partial_policy_fills_defaults() {
        let p: RetryPolicy = serde_json::from_str(r#"{"max_attempts":7}"#).unwrap();
        assert_eq!(p.max_attempts, 7);
        assert_eq!(p.base_delay, RetryPolicy::default().base_delay);
    }
}
