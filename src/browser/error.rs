use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageSourceError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },

    #[error("request failed: {reason}")]
    Request { reason: String },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("webdriver command '{command}' failed: {message}")]
    WebDriver { command: String, message: String },

    #[error("browser session is closed")]
    SessionClosed,
}

impl From<reqwest::Error> for PageSourceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request {
            reason: e.to_string(),
        }
    }
}
