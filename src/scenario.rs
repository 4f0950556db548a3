//! Static site verification: deploy, check bucket, poll the CDN, tear down.
//!
//! Provisioning and cloud assertions are external; they plug in through
//! [`Deployment`] and [`BucketAssertions`].

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use crate::{ProbeError, ProbeRequest, Result, RetryBudget, SiteProbe, DEFAULT_TIMEOUT_MS};

/// Body marker served by the site's index page.
pub const CONTENT_MARKER: &str = "Static site successfully deployed";
/// Body marker served by the site's custom 404 page.
pub const NOT_FOUND_MARKER: &str = "Page Not Found";
pub const ERROR_PAGE_PATH: &str = "/nonexistent-page";
/// Deployment output holding the HTTPS base URL of the distribution.
pub const WEBSITE_URL_OUTPUT: &str = "website_url";
pub const BUCKET_NAME_VAR: &str = "bucket_name";
pub const DEFAULT_REGION: &str = "us-east-1";

/// URL of a page the site does not serve.
pub fn error_page_url(base_url: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{base}{ERROR_PAGE_PATH}")
}

/// Provisions and destroys the stack under test.
pub trait Deployment {
    /// Applies the stack with `vars` and returns its outputs.
    fn apply(
        &mut self,
        vars: &BTreeMap<String, String>,
    ) -> impl Future<Output = std::result::Result<BTreeMap<String, String>, String>>;

    fn destroy(&mut self) -> impl Future<Output = std::result::Result<(), String>>;
}

/// Cloud-side assertions. Expected to be immediately consistent, so never retried.
pub trait BucketAssertions {
    fn bucket_exists(&self, region: &str, name: &str) -> impl Future<Output = bool>;
}

/// Budgets and markers for the two site checks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SiteChecks {
    /// CDN distributions can take many minutes to converge.
    pub content_budget: RetryBudget,
    pub error_page_budget: RetryBudget,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    pub content_marker: String,
    pub not_found_marker: String,
}

impl Default for SiteChecks {
    fn default() -> Self {
        Self {
            content_budget: RetryBudget::new(30, Duration::from_secs(30)),
            error_page_budget: RetryBudget::new(10, Duration::from_secs(5)),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            content_marker: CONTENT_MARKER.to_owned(),
            not_found_marker: NOT_FOUND_MARKER.to_owned(),
        }
    }
}

impl SiteChecks {
    pub fn content_request(&self, base_url: &str) -> ProbeRequest {
        ProbeRequest::new(base_url, 200, self.content_marker.as_str())
            .with_timeout_ms(self.timeout_ms)
            .with_ready_message("Website is accessible")
    }

    pub fn error_page_request(&self, base_url: &str) -> ProbeRequest {
        ProbeRequest::new(error_page_url(base_url), 404, self.not_found_marker.as_str())
            .with_timeout_ms(self.timeout_ms)
            .with_ready_message("404 page is working")
    }
}

/// Ready messages of a fully verified site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SiteReport {
    pub base_url: String,
    pub content: String,
    pub error_page: String,
}

/// Polls the content page, then the error page.
///
/// The error page check only starts once the content check is ready; its
/// smaller budget assumes the distribution has already converged.
pub async fn verify_site(
    probe: &SiteProbe,
    base_url: &str,
    checks: &SiteChecks,
) -> Result<SiteReport> {
    let content = probe
        .wait_until_ready(
            "Validate website is accessible",
            &checks.content_budget,
            &checks.content_request(base_url),
        )
        .await?;

    let error_page = probe
        .wait_until_ready(
            "Validate 404 error page",
            &checks.error_page_budget,
            &checks.error_page_request(base_url),
        )
        .await?;

    Ok(SiteReport {
        base_url: base_url.to_owned(),
        content,
        error_page,
    })
}

/// Inputs for one end-to-end scenario run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScenarioConfig {
    pub bucket_name: String,
    pub region: String,
    pub checks: SiteChecks,
}

impl ScenarioConfig {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            region: DEFAULT_REGION.to_owned(),
            checks: SiteChecks::default(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_checks(mut self, checks: SiteChecks) -> Self {
        self.checks = checks;
        self
    }

    /// Creates a config from environment variables.
    ///
    /// Reads:
    /// - `SITE_BUCKET_NAME`: bucket the stack creates (required)
    /// - `AWS_DEFAULT_REGION`: region of the bucket (default `us-east-1`)
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket_name = lookup("SITE_BUCKET_NAME")
            .ok_or_else(|| "missing SITE_BUCKET_NAME environment variable".to_owned())?;
        if bucket_name.trim().is_empty() {
            return Err("SITE_BUCKET_NAME is set but empty".to_owned());
        }
        let config = Self::new(bucket_name.trim());
        match lookup("AWS_DEFAULT_REGION") {
            Some(region) if !region.trim().is_empty() => Ok(config.with_region(region.trim())),
            _ => Ok(config),
        }
    }
}

/// Deploys the stack, verifies it, and always destroys it.
///
/// When both the run and the teardown fail, the result is
/// [`ProbeError::Teardown`] carrying both errors.
pub async fn run_scenario<D, B>(
    deployment: &mut D,
    buckets: &B,
    probe: &SiteProbe,
    config: &ScenarioConfig,
) -> Result<SiteReport>
where
    D: Deployment,
    B: BucketAssertions,
{
    let outcome = deploy_and_verify(deployment, buckets, probe, config).await;

    #[cfg(feature = "tracing")]
    tracing::info!(bucket = %config.bucket_name, "destroying stack");

    let teardown = deployment.destroy().await;
    match (outcome, teardown) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(err)) => Err(ProbeError::Deployment(err)),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(destroy)) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %destroy, "destroy failed after scenario failure");
            Err(ProbeError::Teardown {
                cause: Box::new(err),
                destroy,
            })
        }
    }
}

async fn deploy_and_verify<D, B>(
    deployment: &mut D,
    buckets: &B,
    probe: &SiteProbe,
    config: &ScenarioConfig,
) -> Result<SiteReport>
where
    D: Deployment,
    B: BucketAssertions,
{
    let vars = BTreeMap::from([(BUCKET_NAME_VAR.to_owned(), config.bucket_name.clone())]);
    let outputs = deployment
        .apply(&vars)
        .await
        .map_err(ProbeError::Deployment)?;

    if !buckets
        .bucket_exists(&config.region, &config.bucket_name)
        .await
    {
        return Err(ProbeError::BucketMissing {
            region: config.region.clone(),
            name: config.bucket_name.clone(),
        });
    }

    let base_url = outputs
        .get(WEBSITE_URL_OUTPUT)
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ProbeError::MissingOutput(WEBSITE_URL_OUTPUT.to_owned()))?;

    #[cfg(feature = "tracing")]
    tracing::info!(%base_url, "stack deployed, polling site");

    verify_site(probe, base_url, &config.checks).await
}

#[cfg(test)]
mod tests {
    use super::{error_page_url, ScenarioConfig, SiteChecks};

    #[test]
    fn error_page_url_trims_one_trailing_slash() {
        assert_eq!(
            error_page_url("https://d111.cloudfront.net/"),
            "https://d111.cloudfront.net/nonexistent-page"
        );
        assert_eq!(
            error_page_url("https://d111.cloudfront.net"),
            "https://d111.cloudfront.net/nonexistent-page"
        );
    }

    #[test]
    fn default_checks_match_cdn_budgets() {
        let checks = SiteChecks::default();
        assert_eq!(checks.content_budget.max_attempts, 30);
        assert_eq!(checks.content_budget.delay_ms, 30_000);
        assert_eq!(checks.error_page_budget.max_attempts, 10);
        assert_eq!(checks.error_page_budget.delay_ms, 5_000);

        let request = checks.error_page_request("https://site.example/");
        assert_eq!(request.url, "https://site.example/nonexistent-page");
        assert_eq!(request.expected_status, 404);
        assert_eq!(request.expected_substring, "Page Not Found");
        assert_eq!(request.timeout_ms, 10_000);
    }

    fn lookup_from<'a>(
        vars: &'a [(&'a str, &'a str)],
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn config_lookup_requires_bucket_name() {
        assert_eq!(
            ScenarioConfig::from_lookup(lookup_from(&[])),
            Err("missing SITE_BUCKET_NAME environment variable".to_owned())
        );
        assert_eq!(
            ScenarioConfig::from_lookup(lookup_from(&[("SITE_BUCKET_NAME", "  ")])),
            Err("SITE_BUCKET_NAME is set but empty".to_owned())
        );
    }

    #[test]
    fn config_lookup_trims_values_and_reads_region() {
        let config = ScenarioConfig::from_lookup(lookup_from(&[
            ("SITE_BUCKET_NAME", " static-site-abc123 "),
            ("AWS_DEFAULT_REGION", "eu-west-1\n"),
        ]))
        .expect("config must load");
        assert_eq!(config.bucket_name, "static-site-abc123");
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn config_lookup_falls_back_to_default_region() {
        let config = ScenarioConfig::from_lookup(lookup_from(&[
            ("SITE_BUCKET_NAME", "static-site-abc123"),
            ("AWS_DEFAULT_REGION", ""),
        ]))
        .expect("config must load");
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn scenario_config_defaults_region() {
        let config = ScenarioConfig::new("static-site-abc123");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.checks, SiteChecks::default());
    }
}
