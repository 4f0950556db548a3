//! `site-probe` checks that a deployed static site (bucket + CDN) is
//! reachable by polling it until it converges or a retry budget runs out.
//!
//! The building blocks:
//! - [`SiteProbe::check`] runs one bounded GET and returns a [`Verdict`]
//! - [`retry`] polls any fallible operation under a [`RetryBudget`]
//! - [`scenario::run_scenario`] sequences deploy, verify and teardown

mod error;
mod options;
mod probe;
mod retry;
mod types;
mod verdict;

pub mod scenario;

pub use error::{NotReady, ProbeError};
pub use options::{Backoff, ProbeRequest, RetryBudget, DEFAULT_TIMEOUT_MS};
pub use probe::SiteProbe;
pub use retry::{retry, retry_with};
pub use scenario::{verify_site, SiteChecks, SiteReport};
pub use types::{Response, Verdict};
pub use verdict::reduce;

pub type Result<T> = std::result::Result<T, ProbeError>;
