//! Test server harness.

use scout::gateway::{HandlerState, create_router_with_state};
use scout::{
    Candidate, ChatLog, ContentExtractor, MockPageSource, MockScorer, MockSearchBackend,
    MockTokenizer, RankingPipeline, RankingPolicy,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub const ARTICLE_URL: &str = "https://example.com/article";

pub const ARTICLE_HTML: &str = r#"<html><head><title>Rust</title><script>var x = 1;</script></head>
<body><nav>Home | About</nav><article><h1>Rust language</h1>
<p>Rust is a systems programming language focused on safety.</p></article>
<footer>copyright</footer></body></html>"#;

pub struct TestServerConfig {
    pub candidates: Vec<Candidate>,
    pub scorer: MockScorer,
    pub policy: RankingPolicy,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            scorer: MockScorer::new()
                .with_score("borrow checker", 0.9)
                .with_score("cargo", 0.6)
                .with_score("gardening", 0.1),
            policy: RankingPolicy::default(),
        }
    }
}

pub fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new(
            "Gardening tips",
            "https://example.com/garden",
            "gardening in the spring",
        ),
        Candidate::new(
            "Ownership",
            "https://example.com/ownership",
            "the borrow checker enforces ownership rules",
        ),
        Candidate::new(
            "Cargo",
            "https://example.com/cargo",
            "cargo builds and tests rust crates",
        ),
        Candidate::new(
            "Macros",
            "https://example.com/macros",
            "declarative macros expand at compile time",
        ),
    ]
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub chatlog: ChatLog,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns the full router on an ephemeral port with every collaborator mocked.
///
/// Tokenizer, scorer, search backend and page source are in-process mocks. The
/// chat log is a real SQLite file inside a temporary directory that lives as
/// long as the returned [`TestServer`].
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let temp_dir = TempDir::new()?;
    let chatlog = ChatLog::open(&temp_dir.path().join("logs").join("chat.db"))
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let tokenizer = Arc::new(MockTokenizer::new());
    let pipeline = RankingPipeline::new(
        Arc::new(MockSearchBackend::new(config.candidates)),
        tokenizer.clone(),
        Arc::new(config.scorer),
    )
    .with_policy(config.policy)
    .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let pages = MockPageSource::new().with_page(ARTICLE_URL, ARTICLE_HTML);
    let extractor = ContentExtractor::new(Arc::new(pages));

    let state = HandlerState::new(tokenizer, pipeline, extractor, chatlog.clone());
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        chatlog,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}
