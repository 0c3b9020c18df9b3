use std::collections::HashMap;

use parking_lot::Mutex;

use super::{PageSource, PageSourceError};

/// Serves canned markup and records every requested URL.
///
/// Unknown URLs get the fallback page if one is set, otherwise a 404 error.
#[derive(Debug, Default)]
pub struct MockPageSource {
    pages: HashMap<String, String>,
    fallback: Option<String>,
    failing: bool,
    requested: Mutex<Vec<String>>,
}

impl MockPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn with_fallback(mut self, html: impl Into<String>) -> Self {
        self.fallback = Some(html.into());
        self
    }

    /// Every fetch fails as if the page could not be rendered.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait::async_trait]
impl PageSource for MockPageSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_html(&self, url: &str) -> Result<String, PageSourceError> {
        self.requested.lock().push(url.to_string());

        if self.failing {
            return Err(PageSourceError::Request {
                reason: format!("mock page source refused {url}"),
            });
        }

        self.pages
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| PageSourceError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
