//! Bounded-retry execution for network-facing operations.
//!
//! Encapsulates retry configuration and backoff logic independently of the
//! operations that use it (connection establishment, delivery-status
//! polling).

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};

/// Backoff strategy applied between attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    Linear,
    #[default]
    Exponential,
}

/// Executes an operation repeatedly until a caller-supplied acceptance
/// predicate succeeds or the attempt budget is exhausted.
///
/// `max_attempts` bounds the retries past the initial call: the default of 5
/// means up to 6 total invocations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryOrchestrator {
    #[serde(default)]
    pub strategy: Backoff,

    /// Maximum number of retries past the initial invocation.
    ///
    /// Default: 5
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Base delay in milliseconds for the backoff calculation.
    ///
    /// Default: 1000
    #[serde(default = "defaults::initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for RetryOrchestrator {
    fn default() -> Self {
        Self {
            strategy: Backoff::default(),
            max_attempts: defaults::max_attempts(),
            initial_delay_ms: defaults::initial_delay_ms(),
        }
    }
}

impl RetryOrchestrator {
    /// Default poll budget for [`wait_for`].
    ///
    /// [`wait_for`]: RetryOrchestrator::wait_for
    pub const DEFAULT_WAIT_ATTEMPTS: u32 = 500;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The wait before the `attempt`-th retry (0-indexed).
    ///
    /// Exponential strategy: `initial_delay × 2^attempt`. Linear strategy:
    /// `initial_delay × attempt`, so the first linear retry waits zero.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let millis = match self.strategy {
            Backoff::Exponential => self
                .initial_delay_ms
                .saturating_mul(2u64.saturating_pow(attempt)),
            Backoff::Linear => self.initial_delay_ms.saturating_mul(u64::from(attempt)),
        };

        Duration::from_millis(millis)
    }

    /// Invoke `operation` until `is_acceptable` approves its result or the
    /// attempt budget runs out, sleeping between attempts per the configured
    /// strategy. The final result is returned either way.
    ///
    /// Attempts run while `attempt <= max_attempts`, so a budget of 2 means
    /// exactly 3 invocations.
    ///
    /// # Errors
    ///
    /// An `Err` from `operation` propagates immediately without retry; only
    /// unacceptable `Ok` results are retried.
    pub async fn repeat_until<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        is_acceptable: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&T) -> bool,
    {
        let mut attempt = 0;

        loop {
            let result = operation().await?;

            if is_acceptable(&result) || attempt >= self.max_attempts {
                return Ok(result);
            }

            tokio::time::sleep(self.delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Poll a predicate with linearly increasing sleeps (`10 × attempt` ms)
    /// until it holds or `max_attempts` checks have been made. Returns
    /// whether the predicate was ever satisfied.
    ///
    /// Used to coordinate a single in-flight initialisation across
    /// overlapping callers.
    pub async fn wait_for<P>(mut predicate: P, max_attempts: u32) -> bool
    where
        P: FnMut() -> bool,
    {
        for attempt in 1..=u64::from(max_attempts) {
            if predicate() {
                return true;
            }

            tokio::time::sleep(Duration::from_millis(10 * attempt)).await;
        }

        false
    }
}

mod defaults {
    pub const fn max_attempts() -> u32 {
        5
    }

    pub const fn initial_delay_ms() -> u64 {
        1000
    }
}
