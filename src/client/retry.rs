//! Explicit retry wrapper for throttled operations
//!
//! Point operations surface `Throttled` unretried so latency accounting
//! stays honest. Callers who want automatic backoff opt in by wrapping the
//! operation:
//!
//! ```no_run
//! # use docstore::client::retry::{retry_throttled, RetryPolicy};
//! # use docstore::domain::{Document, Result};
//! # async fn example(create: impl Fn() -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Document>>>>) -> Result<Document> {
//! let policy = RetryPolicy::default();
//! retry_throttled(&policy, || create()).await
//! # }
//! ```

use crate::domain::{Result, StoreError};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff policy for retrying throttled operations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retries after the initial attempt
    pub max_retries: usize,
    /// Delay before the first retry, doubled on each subsequent one
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Runs an operation, retrying with exponential backoff on `Throttled`
///
/// The service's retry-after hint takes precedence over the computed delay
/// when present. Every other error, and `Throttled` once retries are spent,
/// propagates unchanged.
pub async fn retry_throttled<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        match operation().await {
            Err(StoreError::Throttled { retry_after }) if attempt < policy.max_retries => {
                let wait = retry_after.unwrap_or(delay).min(policy.max_delay);
                tracing::warn!(
                    attempt = attempt,
                    delay_ms = wait.as_millis() as u64,
                    "Throttled, retrying after delay"
                );
                sleep(wait).await;

                attempt += 1;
                delay = (delay * 2).min(policy.max_delay);
            }
            other => return other,
        }
    }
}
