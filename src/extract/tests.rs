use super::*;

use crate::browser::MockPageSource;

const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Example</title><style>body { color: red; }</style></head>
<body>
  <header><h1>Site Header</h1></header>
  <nav><a href="/">Home</a> <a href="/about">About</a></nav>
  <article>
    <h1>Article title</h1>
    <p>First paragraph with
       a wrapped line.</p>
    <script>var tracking = true;</script>
    <p>Second   paragraph.</p>
  </article>
  <footer>Copyright</footer>
</body>
</html>"#;

#[test]
fn test_readable_text_prefers_article() {
    let text = readable_text(ARTICLE_HTML);

    assert!(text.contains("Article title"));
    assert!(text.contains("First paragraph with a wrapped line."));
    assert!(text.contains("Second paragraph."));
    assert!(!text.contains("Site Header"));
    assert!(!text.contains("Home"));
    assert!(!text.contains("tracking"));
    assert!(!text.contains("Copyright"));
    assert!(!text.contains("color: red"));
}

#[test]
fn test_readable_text_falls_back_to_body() {
    let html = "<html><body><div>Plain <b>body</b> text</div><script>x()</script></body></html>";
    assert_eq!(readable_text(html), "Plain body text");
}

#[test]
fn test_readable_text_skips_empty_article() {
    let html = "<html><body><article><script>x()</script></article><p>Body text</p></body></html>";
    assert_eq!(readable_text(html), "Body text");
}

#[test]
fn test_readable_text_empty_markup() {
    assert_eq!(readable_text(""), "");
    assert_eq!(
        readable_text("<html><body><script>only()</script>  \n </body></html>"),
        ""
    );
}

#[test]
fn test_normalize_whitespace() {
    assert_eq!(normalize_whitespace("  a \t b\n\nc  "), "a b c");
    assert_eq!(normalize_whitespace(" \n\t "), "");
}

#[test]
fn test_normalize_paragraphs() {
    assert_eq!(normalize_paragraphs("a  b\n\n\n\nc\nd"), "a b\n\nc\nd");
    assert_eq!(normalize_paragraphs("\n\n  x  \n\n"), "x");
}

#[tokio::test]
async fn test_visit_extracts_text() {
    let source = MockPageSource::new().with_page("https://a.test/", ARTICLE_HTML);
    let extractor = ContentExtractor::new(Arc::new(source));

    let result = extractor.visit("https://a.test/").await;
    assert!(result.content.contains("Second paragraph."));
    assert!(result.error.is_none());
    assert!(result.response_time >= 0.0);
}

#[tokio::test]
async fn test_visit_empty_page_returns_sentinel() {
    let source = MockPageSource::new().with_page("https://a.test/", "<html><body></body></html>");
    let extractor = ContentExtractor::new(Arc::new(source));

    let result = extractor.visit("https://a.test/").await;
    assert_eq!(result.content, NO_TEXT_SENTINEL);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_visit_page_error_returns_sentinel_with_diagnostic() {
    let extractor = ContentExtractor::new(Arc::new(MockPageSource::failing()));

    let result = extractor.visit("https://a.test/").await;
    assert_eq!(result.content, NO_TEXT_SENTINEL);
    assert!(result.error.unwrap().contains("refused"));
}

#[test]
fn test_extracted_content_serialization() {
    let ok = ExtractedContent {
        content: "text".to_string(),
        response_time: 0.5,
        error: None,
    };
    let value = serde_json::to_value(&ok).unwrap();
    assert_eq!(value["content"], "text");
    assert!(value.get("error").is_none());
}
