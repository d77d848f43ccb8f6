// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential-backoff retry policy for transient transport failures

use std::future::Future;
use std::time::Duration;

/// Retry-with-backoff wrapper for fallible transport operations.
///
/// The delay before retry attempt `k` (1-indexed) is `base_delay * 2^k`.
/// Errors the classifier rejects propagate immediately; after `retry_count`
/// retries the last error propagates unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    retry_count: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(retry_count: u32, base_delay: Duration) -> Self {
        Self {
            retry_count,
            base_delay,
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Run `op`, retrying transient failures with exponential backoff.
    ///
    /// `is_transient` classifies which errors are worth retrying; anything
    /// else is treated as permanent.
    pub async fn run<T, E, F, Fut, P>(&self, is_transient: P, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retry_count && is_transient(&err) => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
