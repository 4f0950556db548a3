/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Retry budget ran out before the operation succeeded.
    #[error("{label}: not ready after {attempts} attempts: {last_error}")]
    BudgetExhausted {
        /// Label of the check that gave up.
        label: String,
        /// Number of attempts made, equal to the budget's attempt count.
        attempts: usize,
        /// Rendered reason of the final failed attempt.
        last_error: String,
    },
    /// Operation failed with an error the caller classified as non-retryable.
    #[error("{label}: fatal error on attempt {attempt}: {reason}")]
    Fatal {
        /// Label of the check that stopped.
        label: String,
        /// 1-based attempt that produced the error.
        attempt: usize,
        /// Rendered error of that attempt.
        reason: String,
    },
    /// Deployment collaborator failed to apply or destroy the stack.
    #[error("deployment error: {0}")]
    Deployment(String),
    /// Bucket assertion did not find the bucket.
    #[error("bucket {name} does not exist in {region}")]
    BucketMissing {
        /// Region that was searched.
        region: String,
        /// Bucket name passed to the deployment.
        name: String,
    },
    /// Deployment finished without the expected output value.
    #[error("deployment output '{0}' is missing or empty")]
    MissingOutput(String),
    /// Scenario failed and the stack could not be destroyed afterwards.
    #[error("{cause}; destroy also failed: {destroy}")]
    Teardown {
        /// Error that failed the scenario.
        cause: Box<ProbeError>,
        /// Error reported by the deployment's destroy step.
        destroy: String,
    },
}

/// Reason a single probe attempt was not ready.
///
/// Every variant is retryable within a budget.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum NotReady {
    /// DNS, connect, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response status differs from the expected one.
    #[error("expected status code {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },
    /// Response body does not contain the expected substring.
    #[error("expected content not found")]
    ContentMissing { expected: String },
}

impl NotReady {
    /// Builds a transport reason from a `reqwest` error and its source chain.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        let mut description = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            description.push_str(": ");
            description.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Transport(description)
    }

    /// Returns `true` for wrong-status and missing-content reasons.
    pub fn is_mismatch(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}
