//! Scout HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use scout::browser::http::build_client;
use scout::config::{Config, PageSourceKind, SearchBackendKind};
use scout::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use scout::gateway::{HandlerState, create_router_with_state};
use scout::{
    BingBackend, BrowserOptions, BrowserSession, ChatLog, ContentExtractor, CrossEncoderScorer,
    HfTokenizer, HttpFetcher, PageSource, QueryPolicy, RankingPipeline, RankingPolicy,
    RerankerConfig, SearchBackend, TavilyBackend, TextTokenizer,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        search_backend = %config.search_backend,
        page_source = %config.page_source,
        "Scout starting"
    );

    let timeout = Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS);

    let tokenizer: Arc<dyn TextTokenizer> = Arc::new(
        HfTokenizer::load(&config.tokenizer_path).context("failed to load tokenizer")?,
    );
    let scorer = Arc::new(
        CrossEncoderScorer::new(RerankerConfig::new(&config.reranker_path))
            .context("failed to load reranker")?,
    );

    let mut browser: Option<Arc<BrowserSession>> = None;
    let page_source: Arc<dyn PageSource> = match config.page_source {
        PageSourceKind::Http => Arc::new(HttpFetcher::new(&config.user_agent, timeout)?),
        PageSourceKind::Browser => {
            tracing::info!(webdriver_url = %config.webdriver_url, "Starting browser session...");
            let session = Arc::new(
                BrowserSession::start(&BrowserOptions {
                    webdriver_url: config.webdriver_url.clone(),
                    user_agent: config.user_agent.clone(),
                    timeout,
                })
                .await
                .context("failed to start browser session")?,
            );
            browser = Some(session.clone());
            session
        }
    };

    let backend: Arc<dyn SearchBackend> = match config.search_backend {
        SearchBackendKind::Tavily => {
            let api_key = config
                .tavily_api_key
                .clone()
                .context("Tavily backend selected without an API key")?;
            Arc::new(TavilyBackend::new(
                build_client(&config.user_agent, timeout)?,
                api_key,
            )?)
        }
        SearchBackendKind::Bing => Arc::new(BingBackend::new(page_source.clone())),
    };

    let query_policy = QueryPolicy::new(
        config
            .query_min_chars
            .unwrap_or_else(|| backend.min_query_chars()),
        config.query_suffix.clone(),
    );
    let pipeline = RankingPipeline::new(backend, tokenizer.clone(), scorer)
        .with_policy(RankingPolicy {
            top_k: config.top_k,
            token_budget: config.token_budget,
            oversample: config.oversample,
        })?
        .with_query_policy(query_policy);

    tracing::info!(
        backend = pipeline.backend_name(),
        policy = ?pipeline.policy(),
        query_policy = ?pipeline.query_policy(),
        "Ranking pipeline ready"
    );

    let extractor = ContentExtractor::new(page_source);
    let chatlog = ChatLog::open(&config.db_path).context("failed to open conversation log")?;

    let state = HandlerState::new(tokenizer, pipeline, extractor, chatlog);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(browser))
        .await?;

    tracing::info!("Scout shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = ["SCOUT_PORT", "PORT"]
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .and_then(|p| p.trim().parse::<u16>().ok())
        .unwrap_or(3020);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal(browser: Option<Arc<BrowserSession>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    if let Some(browser) = browser {
        tracing::info!("Closing browser session...");
        if let Err(e) = browser.close().await {
            tracing::error!("Failed to close browser session: {}", e);
        }
    }
}
