use std::time::Duration;

use tracing::debug;

use super::{PageSource, PageSourceError, parse_http_url};

/// Fetches markup with a plain HTTP GET. No script execution.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, PageSourceError> {
        let client = build_client(user_agent, timeout)?;
        Ok(Self { client })
    }
}

/// Client shared by the fetcher and the search backends.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, PageSourceError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| PageSourceError::ClientBuild {
            reason: e.to_string(),
        })
}

#[async_trait::async_trait]
impl PageSource for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_html(&self, url: &str) -> Result<String, PageSourceError> {
        let parsed = parse_http_url(url)?;

        let resp = self.client.get(parsed).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PageSourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        debug!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
