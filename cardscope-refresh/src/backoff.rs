use async_trait::async_trait;
use cardscope_core::ProviderError;
use cardscope_store::app_config::RefreshConfig;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// How often and how far apart a timed-out fetch is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl BackoffPolicy {
    /// `max_attempts` counts the first call; zero is treated as one
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.retry_delay_seconds),
        )
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<T, ProviderError>,
    pub attempts: u32,
}

/// Call `op` until it succeeds, fails with a non-timeout error, or the policy
/// runs out of attempts. Cancellation during a pause returns the last error.
pub async fn run_with_retry<T, F, Fut>(
    policy: &BackoffPolicy,
    sleeper: &dyn Sleeper,
    cancel: &CancellationToken,
    mut op: F,
) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let err = match op(attempt).await {
            Ok(value) => {
                return RetryOutcome {
                    result: Ok(value),
                    attempts: attempt,
                }
            }
            Err(e) => e,
        };

        if !err.is_timeout() || attempt >= policy.max_attempts {
            return RetryOutcome {
                result: Err(err),
                attempts: attempt,
            };
        }

        warn!(
            attempt,
            max_attempts = policy.max_attempts,
            error = %err,
            "Provider call timed out, retrying"
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                warn!(attempt, "Retry abandoned, refresh cancelled");
                return RetryOutcome {
                    result: Err(err),
                    attempts: attempt,
                };
            }
            _ = sleeper.sleep(policy.delay) => {}
        }
    }
}
