use std::time::Duration;

use serde::Deserialize;

/// Per-attempt timeout used when a request does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// One probe target and the response it must produce to count as ready.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProbeRequest {
    /// Fully-qualified URL to GET.
    pub url: String,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    pub expected_status: u16,
    /// Substring the response body must contain.
    pub expected_substring: String,
    /// Message carried by [`crate::Verdict::Ready`].
    pub ready_message: String,
}

impl ProbeRequest {
    pub fn new(
        url: impl Into<String>,
        expected_status: u16,
        expected_substring: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let ready_message = format!("{url} is ready");
        Self {
            url,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            expected_status,
            expected_substring: expected_substring.into(),
            ready_message,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_ready_message(mut self, message: impl Into<String>) -> Self {
        self.ready_message = message.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Delay policy between attempts.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay between every pair of attempts.
    #[default]
    Fixed,
    /// Delay doubles after each failed attempt, capped at `max_delay_ms`.
    Exponential { max_delay_ms: u64 },
}

/// Bounds how long the retry driver keeps polling.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct RetryBudget {
    /// Maximum number of attempts including the first one. Zero counts as one.
    pub max_attempts: usize,
    /// Delay between attempts in milliseconds.
    pub delay_ms: u64,
    pub backoff: Backoff,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1_000,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryBudget {
    /// Fixed-delay budget.
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            backoff: Backoff::Fixed,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub(crate) fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let delay_ms = match self.backoff {
            Backoff::Fixed => self.delay_ms,
            Backoff::Exponential { max_delay_ms } => {
                let exp = attempt.saturating_sub(1).min(16) as u32;
                self.delay_ms
                    .saturating_mul(1u64 << exp)
                    .min(max_delay_ms)
            }
        };
        Duration::from_millis(delay_ms)
    }

    /// Upper bound on total wall time for a probe with the given timeout.
    ///
    /// Saturates at `Duration::MAX`.
    pub fn worst_case(&self, timeout: Duration) -> Duration {
        let attempts = self.attempts();
        let requests = timeout.saturating_mul(u32::try_from(attempts).unwrap_or(u32::MAX));
        (1..attempts)
            .map(|attempt| self.delay_after(attempt))
            .fold(requests, Duration::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Backoff, ProbeRequest, RetryBudget};

    #[test]
    fn fixed_backoff_never_changes_delay() {
        let budget = RetryBudget::new(30, Duration::from_secs(30));
        for attempt in 1..30 {
            assert_eq!(budget.delay_after(attempt), Duration::from_secs(30));
        }
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let budget = RetryBudget::new(6, Duration::from_millis(100))
            .with_backoff(Backoff::Exponential { max_delay_ms: 500 });
        let delays: Vec<u128> = (1..6)
            .map(|attempt| budget.delay_after(attempt).as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
    }

    #[test]
    fn worst_case_counts_sleeps_between_attempts_only() {
        let budget = RetryBudget::new(3, Duration::from_secs(1));
        assert_eq!(
            budget.worst_case(Duration::from_secs(10)),
            Duration::from_secs(32)
        );
        let single = RetryBudget::new(0, Duration::from_secs(5));
        assert_eq!(
            single.worst_case(Duration::from_secs(10)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn worst_case_saturates_instead_of_overflowing() {
        let huge_timeout = RetryBudget::new(2, Duration::from_millis(1));
        assert_eq!(huge_timeout.worst_case(Duration::MAX), Duration::MAX);

        let huge_delay = RetryBudget {
            max_attempts: 2_000,
            delay_ms: u64::MAX,
            backoff: Backoff::Fixed,
        };
        assert_eq!(huge_delay.worst_case(Duration::from_secs(10)), Duration::MAX);
    }

    #[test]
    fn probe_request_defaults() {
        let request = ProbeRequest::new("https://d111.cloudfront.net", 200, "deployed");
        assert_eq!(request.timeout(), Duration::from_secs(10));
        assert_eq!(request.ready_message, "https://d111.cloudfront.net is ready");
    }
}
