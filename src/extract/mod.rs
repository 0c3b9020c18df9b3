//! Readable-text extraction and the visit-URL flow.
//!
//! Markup comes from the active [`PageSource`]. Boilerplate subtrees (scripts,
//! navigation, footers and the like) are skipped, the main content container
//! is chosen, and whitespace is collapsed. An empty result is reported as
//! [`NO_TEXT_SENTINEL`] rather than an empty string.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Instant;

use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::browser::PageSource;
use crate::constants::NO_TEXT_SENTINEL;

/// Subtrees never considered content.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "template",
    "form", "button",
];

/// Elements that end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "li", "ul", "ol", "tr", "table", "h1", "h2", "h3",
    "h4", "h5", "h6", "blockquote", "pre", "br", "hr", "dd", "dt", "figcaption",
];

/// Content containers tried in order; the first with text wins.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Result of visiting a URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedContent {
    pub content: String,
    /// Seconds spent fetching and extracting.
    pub response_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetches a page through a [`PageSource`] and extracts its readable text.
#[derive(Clone)]
pub struct ContentExtractor {
    source: Arc<dyn PageSource>,
}

impl std::fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentExtractor")
            .field("source", &self.source.name())
            .finish()
    }
}

impl ContentExtractor {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self { source }
    }

    /// Never fails: render or extraction errors become the sentinel plus a
    /// diagnostic in `error`.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn visit(&self, url: &str) -> ExtractedContent {
        let start = Instant::now();

        let outcome = match self.source.fetch_html(url).await {
            Ok(html) => tokio::task::spawn_blocking(move || readable_text(&html))
                .await
                .map_err(|e| format!("extraction task failed: {e}")),
            Err(e) => Err(e.to_string()),
        };

        let (content, error) = match outcome {
            Ok(text) if text.is_empty() => {
                debug!("No readable text extracted");
                (NO_TEXT_SENTINEL.to_string(), None)
            }
            Ok(text) => (text, None),
            Err(reason) => {
                warn!(error = %reason, "Visit failed");
                (NO_TEXT_SENTINEL.to_string(), Some(reason))
            }
        };

        let response_time = start.elapsed().as_secs_f64();
        debug!(chars = content.len(), response_time, "Visit complete");

        ExtractedContent {
            content,
            response_time,
            error,
        }
    }
}

/// Extracts the readable text of an HTML document. Empty when nothing is found.
pub fn readable_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for css in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let mut raw = String::new();
            collect_text(element, &mut raw);
            let text = normalize_paragraphs(&raw);
            if !text.is_empty() {
                return text;
            }
        }
    }

    String::new()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source line breaks inside text are not paragraph breaks.
            Node::Text(text) => out.extend(text.chars().map(|c| match c {
                '\n' | '\r' => ' ',
                other => other,
            })),
            Node::Element(el) => {
                let name = el.name();
                if BOILERPLATE_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Collapses every whitespace run to one space and trims.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses whitespace within lines and keeps at most one blank line between
/// paragraphs.
pub fn normalize_paragraphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;

    for line in text.lines() {
        let line = normalize_whitespace(line);
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 1 { "\n\n" } else { "\n" });
        }
        out.push_str(&line);
        blank_run = 0;
    }

    out
}
