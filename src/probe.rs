use std::fmt;
use std::time::Duration;

use crate::{
    retry::retry, verdict::reduce_response, NotReady, ProbeError, ProbeRequest, Response, Result,
    RetryBudget, Verdict,
};

const USER_AGENT: &str = concat!("site-probe/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
/// Issues bounded GET requests and classifies the responses.
///
/// The inner `reqwest::Client` is a connection pool; clones share it, so one
/// probe can serve every attempt of every check against a stack.
pub struct SiteProbe {
    http: reqwest::Client,
}

impl fmt::Debug for SiteProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteProbe").finish_non_exhaustive()
    }
}

impl SiteProbe {
    /// Creates a probe with a fresh connection pool.
    ///
    /// Certificates are always verified against the bundled web PKI roots.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProbeError::Transport)?;
        Ok(Self { http })
    }

    /// Creates a probe around an existing transport.
    ///
    /// The caller owns the transport settings, including TLS configuration.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Performs one GET and reads the full body.
    ///
    /// The response is consumed here, which drains and releases the
    /// connection back to the pool before returning. Every failure is
    /// [`ProbeError::Transport`].
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<Response> {
        self.get(url, timeout).await.map_err(ProbeError::Transport)
    }

    async fn get(&self, url: &str, timeout: Duration) -> reqwest::Result<Response> {
        let response = self.http.get(url).timeout(timeout).send().await?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(Response::new(status, body, headers))
    }

    /// Runs one probe attempt. Transport failures become `NotReady`.
    pub async fn check(&self, request: &ProbeRequest) -> Verdict {
        match self.get(&request.url, request.timeout()).await {
            Ok(response) => reduce_response(&response, request),
            Err(err) => Verdict::NotReady(NotReady::from_transport(&err)),
        }
    }

    /// Polls `request` under `budget` until it is ready.
    pub async fn wait_until_ready(
        &self,
        label: &str,
        budget: &RetryBudget,
        request: &ProbeRequest,
    ) -> Result<String> {
        retry(label, budget, move || async move {
            self.check(request).await.into_result()
        })
        .await
    }
}
