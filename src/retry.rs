// src/retry.rs
use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{error, warn};

/// Bounded re-attempts with a fixed pause in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, including the first. Never less than one.
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

/// Run `op` until it succeeds, fails with an error `is_retryable` rejects,
/// or the policy's attempts are used up. The last error is returned as-is.
pub async fn retry<T, E, F, Fut, P>(policy: RetryPolicy, is_retryable: P, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let max = policy.attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max && is_retryable(&e) => {
                warn!(
                    attempt,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "Retrying"
                );
                sleep(policy.delay).await;
            }
            Err(e) => {
                if attempt > 1 {
                    error!(attempt, error = %e, "Exhausted retries");
                }
                return Err(e);
            }
        }
    }
}
