//! Retry with backoff and model fallback
//!
//! Delays are computed by the pure [`RetryPolicy::delay_for`]; the async
//! helpers only sleep for whatever it returns. Retry and fallback are
//! independent and compose: wrap [`with_fallback_model`] in
//! [`with_retry`] to retry a primary-then-secondary attempt as a unit.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Growth of the delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// `base * attempt`
    #[default]
    Linear,
    /// `base * 2^(attempt - 1)`
    Exponential,
}

/// Retry policy for batch content generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay unit in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default)]
    pub backoff: Backoff,
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    1500
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            backoff: Backoff::Linear,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay to wait before retry number `attempt` (1-based)
    ///
    /// # Examples
    ///
    /// ```
    /// use astrai::resilience::{Backoff, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy { max_retries: 2, base_delay_ms: 1500, backoff: Backoff::Linear };
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(1500));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(3000));
    /// ```
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let millis = match self.backoff {
            Backoff::Linear => self.base_delay_ms.saturating_mul(u64::from(attempt)),
            Backoff::Exponential => {
                let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
                self.base_delay_ms.saturating_mul(factor)
            }
        };
        Duration::from_millis(millis)
    }
}

/// Run `op`, retrying every failure according to `policy`
///
/// `op` is called at most `max_retries + 1` times. The last error is
/// returned unmodified.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_retry_if(policy, op, |_| true).await
}

/// Run `op`, retrying only failures accepted by `should_retry`
///
/// A rejected failure is returned immediately.
pub async fn with_retry_if<T, F, Fut, P>(policy: &RetryPolicy, mut op: F, should_retry: P) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&anyhow::Error) -> bool,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries && should_retry(&e) => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Attempt {} failed, retrying in {}ms: {:#}",
                    attempt,
                    delay.as_millis(),
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run `op` against `primary`, falling back once to `secondary`
///
/// Only the secondary failure propagates.
pub async fn with_fallback_model<T, F, Fut>(primary: &str, secondary: &str, mut op: F) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op(primary.to_string()).await {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(
                "Model {} failed, falling back to {}: {:#}",
                primary,
                secondary,
                e
            );
            op(secondary.to_string()).await
        }
    }
}
