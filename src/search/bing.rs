use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;

use crate::browser::PageSource;
use crate::extract::normalize_whitespace;

use super::{Candidate, SearchBackend, SearchError};

pub const BING_SEARCH_URL: &str = "https://cn.bing.com/search";

/// Scrapes the Bing results page rendered by a [`PageSource`].
pub struct BingBackend {
    source: Arc<dyn PageSource>,
    base_url: String,
}

impl std::fmt::Debug for BingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BingBackend")
            .field("source", &self.source.name())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BingBackend {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            base_url: BING_SEARCH_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn search_url(&self, query: &str) -> Result<Url, SearchError> {
        Url::parse_with_params(&self.base_url, &[("q", query)]).map_err(|e| {
            SearchError::NotConfigured {
                reason: format!("invalid Bing base url '{}': {e}", self.base_url),
            }
        })
    }
}

#[async_trait::async_trait]
impl SearchBackend for BingBackend {
    fn name(&self) -> &'static str {
        "bing"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Candidate>, SearchError> {
        tracing::trace!(query, "Bing search");

        let url = self.search_url(query)?;
        let html = self.source.fetch_html(url.as_str()).await?;

        tracing::trace!(bytes = html.len(), "Bing page received");

        parse_bing_html(&html, max_results)
    }
}

/// Parses a Bing results page into candidates, in page order.
///
/// Entries without a title or link are skipped. The caption becomes the
/// candidate content.
pub fn parse_bing_html(html: &str, max_results: usize) -> Result<Vec<Candidate>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector("li.b_algo")?;
    let title_sel = selector("h2")?;
    let link_sel = selector("a[href]")?;
    let caption_sel = selector(".b_caption, .b_lineclamp2")?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = normalize_whitespace(&title_el.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let url = title_el
            .select(&link_sel)
            .next()
            .or_else(|| element.select(&link_sel).next())
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .unwrap_or_default();
        if url.is_empty() {
            continue;
        }

        let content = element
            .select(&caption_sel)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        results.push(Candidate::new(title, url, content));
    }

    tracing::debug!(count = results.len(), "Bing results parsed");
    Ok(results)
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse {
        reason: format!("invalid selector '{css}': {e:?}"),
    })
}
