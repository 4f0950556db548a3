use std::time::Duration;

use site_probe::{retry, ProbeRequest, RetryBudget, SiteChecks, SiteProbe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("SITE_PROBE_URL")?;

    let probe = SiteProbe::new()?;

    // One attempt, no retries.
    let request = ProbeRequest::new(&url, 200, site_probe::scenario::CONTENT_MARKER);
    println!("single check: {:?}", probe.check(&request).await);

    // Full polling run with the default CDN budgets.
    let report = site_probe::verify_site(&probe, &url, &SiteChecks::default()).await?;
    println!("{}: {} / {}", report.base_url, report.content, report.error_page);

    // The driver accepts any fallible operation.
    let (probe, url) = (&probe, url.as_str());
    let headers = retry(
        "Read cache headers",
        &RetryBudget::new(5, Duration::from_secs(2)),
        move || async move {
            let response = probe.fetch(url, Duration::from_secs(10)).await?;
            response
                .header("x-cache")
                .map(str::to_owned)
                .ok_or_else(|| anyhow::anyhow!("x-cache header not present yet"))
        },
    )
    .await?;
    println!("x-cache: {headers}");

    Ok(())
}
