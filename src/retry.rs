//! Bounded-attempt polling of fallible operations.
//!
//! The driver runs one attempt at a time: attempt `n + 1` starts only after
//! attempt `n` has finished and its delay has fully elapsed. It never sleeps
//! after a success or after the final attempt.

use std::fmt;
use std::future::Future;

use tokio::time::sleep;

use crate::{ProbeError, Result, RetryBudget};

/// Calls `op` until it succeeds or `budget` runs out.
///
/// Every error is treated as retryable. On exhaustion the returned
/// [`ProbeError::BudgetExhausted`] carries `label` and the last error.
pub async fn retry<T, E, F, Fut>(label: &str, budget: &RetryBudget, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: fmt::Display,
{
    retry_with(label, budget, op, |_| false).await
}

/// Like [`retry`], but stops early when `is_fatal` returns `true`.
///
/// A fatal error ends the run with [`ProbeError::Fatal`] without waiting.
pub async fn retry_with<T, E, F, Fut, C>(
    label: &str,
    budget: &RetryBudget,
    mut op: F,
    is_fatal: C,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: fmt::Display,
    C: Fn(&E) -> bool,
{
    let max_attempts = budget.attempts();
    let mut attempt = 1usize;

    loop {
        match op().await {
            Ok(value) => {
                #[cfg(feature = "tracing")]
                tracing::info!(label, attempt, "ready");
                return Ok(value);
            }
            Err(err) => {
                if is_fatal(&err) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(label, attempt, error = %err, "fatal error, not retrying");
                    return Err(ProbeError::Fatal {
                        label: label.to_owned(),
                        attempt,
                        reason: err.to_string(),
                    });
                }

                if attempt >= max_attempts {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(label, attempts = attempt, error = %err, "retry budget exhausted");
                    return Err(ProbeError::BudgetExhausted {
                        label: label.to_owned(),
                        attempts: attempt,
                        last_error: err.to_string(),
                    });
                }

                let delay = budget.delay_after(attempt);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    label,
                    attempt,
                    max_attempts,
                    error = %err,
                    "not ready, retrying after {} ms",
                    delay.as_millis()
                );

                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
