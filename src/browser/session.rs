use std::time::Duration;

use reqwest::Method;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::http::build_client;
use super::{PageSource, PageSourceError, parse_http_url};

/// Hides the automation flag some sites check before serving content.
pub const MASK_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Launch settings for the headless Chrome session.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Base URL of the WebDriver endpoint (e.g. chromedriver).
    pub webdriver_url: String,
    pub user_agent: String,
    /// Per-command HTTP timeout; page loads count against it.
    pub timeout: Duration,
}

impl BrowserOptions {
    pub fn chrome_args(&self) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            format!("--user-agent={}", self.user_agent),
        ]
    }

    fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": self.chrome_args() }
                }
            }
        })
    }
}

/// A single WebDriver session shared by every caller.
///
/// The session id lives behind a `tokio::sync::Mutex`. The guard is held across
/// each navigate-then-read sequence.
pub struct BrowserSession {
    client: reqwest::Client,
    endpoint: String,
    session_id: Mutex<Option<String>>,
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl BrowserSession {
    /// Creates the session and applies the masking script. Failure is startup-fatal.
    pub async fn start(options: &BrowserOptions) -> Result<Self, PageSourceError> {
        let client = build_client(&options.user_agent, options.timeout)?;
        let endpoint = options.webdriver_url.trim_end_matches('/').to_string();

        let value = send(
            &client,
            Method::POST,
            &format!("{endpoint}/session"),
            Some(options.capabilities()),
            "new session",
        )
        .await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| PageSourceError::WebDriver {
                command: "new session".to_string(),
                message: "response carried no sessionId".to_string(),
            })?
            .to_string();

        send(
            &client,
            Method::POST,
            &format!("{endpoint}/session/{session_id}/execute/sync"),
            Some(json!({ "script": MASK_WEBDRIVER_SCRIPT, "args": [] })),
            "execute script",
        )
        .await?;

        info!(endpoint = %endpoint, session_id = %session_id, "Browser session started");

        Ok(Self {
            client,
            endpoint,
            session_id: Mutex::new(Some(session_id)),
        })
    }

    /// Ends the session. Later fetches fail with [`PageSourceError::SessionClosed`].
    pub async fn close(&self) -> Result<(), PageSourceError> {
        let mut guard = self.session_id.lock().await;
        let Some(id) = guard.take() else {
            return Ok(());
        };

        send(
            &self.client,
            Method::DELETE,
            &format!("{}/session/{id}", self.endpoint),
            None,
            "delete session",
        )
        .await?;

        info!(session_id = %id, "Browser session closed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl PageSource for BrowserSession {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch_html(&self, url: &str) -> Result<String, PageSourceError> {
        let target = parse_http_url(url)?;

        let guard = self.session_id.lock().await;
        let id = guard.as_deref().ok_or(PageSourceError::SessionClosed)?;

        send(
            &self.client,
            Method::POST,
            &format!("{}/session/{id}/url", self.endpoint),
            Some(json!({ "url": target.as_str() })),
            "navigate",
        )
        .await?;

        let source = send(
            &self.client,
            Method::GET,
            &format!("{}/session/{id}/source", self.endpoint),
            None,
            "get page source",
        )
        .await?;

        match source {
            Value::String(html) => {
                debug!(url, bytes = html.len(), "Rendered page");
                Ok(html)
            }
            other => Err(PageSourceError::WebDriver {
                command: "get page source".to_string(),
                message: format!("expected a string, got {other}"),
            }),
        }
    }
}

/// Issues one WebDriver command and unwraps the `value` envelope.
async fn send(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    command: &str,
) -> Result<Value, PageSourceError> {
    let mut req = client.request(method, url);
    if let Some(body) = body {
        req = req.json(&body);
    }

    let resp = req.send().await.map_err(|e| PageSourceError::WebDriver {
        command: command.to_string(),
        message: e.to_string(),
    })?;
    let status = resp.status();

    let mut payload: Value = resp.json().await.map_err(|e| PageSourceError::WebDriver {
        command: command.to_string(),
        message: format!("invalid response body: {e}"),
    })?;
    let value = payload.get_mut("value").map(Value::take).unwrap_or(Value::Null);

    if !status.is_success() {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| value.get("error").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}"));
        warn!(command, %status, message = %message, "WebDriver command failed");
        return Err(PageSourceError::WebDriver {
            command: command.to_string(),
            message,
        });
    }

    Ok(value)
}
