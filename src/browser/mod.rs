//! Page sources: raw HTML for a URL.
//!
//! [`HttpFetcher`] performs a plain GET. [`BrowserSession`] drives a headless
//! Chrome over WebDriver so script-rendered pages come back populated; it holds
//! a single session and serializes navigations behind an async mutex.

pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod session;


pub use error::PageSourceError;
pub use http::HttpFetcher;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockPageSource;
pub use session::{BrowserOptions, BrowserSession};

use url::Url;

/// Something that can turn a URL into page markup.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_html(&self, url: &str) -> Result<String, PageSourceError>;
}

/// Parses `raw` and rejects anything that is not http(s).
pub fn parse_http_url(raw: &str) -> Result<Url, PageSourceError> {
    let url = Url::parse(raw.trim()).map_err(|e| PageSourceError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PageSourceError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
