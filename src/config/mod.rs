//! Environment-backed configuration.
//!
//! Model locations, the listening port and search credentials are required;
//! everything else has a default. Each `SCOUT_*` variable also accepts the
//! unprefixed name used by older deployments (e.g. `TOKENIZER_PATH`).

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_OVERSAMPLE, DEFAULT_QUERY_SUFFIX, DEFAULT_TOKEN_BUDGET, DEFAULT_TOP_K,
    DEFAULT_USER_AGENT,
};

/// Which search provider feeds the ranking pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackendKind {
    /// Tavily search API (requires an API key).
    Tavily,
    /// Bing results page, scraped through the active page source.
    Bing,
}

impl FromStr for SearchBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tavily" => Ok(Self::Tavily),
            "bing" => Ok(Self::Bing),
            other => Err(format!("expected 'tavily' or 'bing', got '{other}'")),
        }
    }
}

impl fmt::Display for SearchBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tavily => write!(f, "tavily"),
            Self::Bing => write!(f, "bing"),
        }
    }
}

/// How raw page markup is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSourceKind {
    /// Plain HTTP GET, no script execution.
    Http,
    /// Headless browser driven over WebDriver.
    Browser,
}

impl FromStr for PageSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "browser" => Ok(Self::Browser),
            other => Err(format!("expected 'http' or 'browser', got '{other}'")),
        }
    }
}

impl fmt::Display for PageSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Browser => write!(f, "browser"),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Required.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// `tokenizer.json` file or a directory containing one. Required.
    pub tokenizer_path: PathBuf,

    /// Cross-encoder directory (`config.json`, `model.safetensors`, `tokenizer.json`). Required.
    pub reranker_path: PathBuf,

    /// Active search provider. Default: Tavily.
    pub search_backend: SearchBackendKind,

    /// Tavily API key. Required when `search_backend` is Tavily.
    pub tavily_api_key: Option<String>,

    /// Active page source for Bing scraping and visit-URL. Default: HTTP.
    pub page_source: PageSourceKind,

    /// WebDriver endpoint used when `page_source` is Browser.
    pub webdriver_url: String,

    /// SQLite file for the conversation log. Default: `./db.sqlite3`.
    pub db_path: PathBuf,

    /// Queries shorter than this (in chars) get `query_suffix`. `None` means backend default.
    pub query_min_chars: Option<usize>,

    /// Suffix appended to short queries.
    pub query_suffix: String,

    /// Results returned per search. Default: `3`.
    pub top_k: usize,

    /// Token budget per candidate passage. Default: `200`.
    pub token_budget: usize,

    /// Candidates requested from the backend. Default: `10`.
    pub oversample: usize,

    /// User agent for outbound fetches and the browser session.
    pub user_agent: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("tokenizer_path", &self.tokenizer_path)
            .field("reranker_path", &self.reranker_path)
            .field("search_backend", &self.search_backend)
            .field("tavily_api_key", &self.tavily_api_key.as_ref().map(|_| "<redacted>"))
            .field("page_source", &self.page_source)
            .field("webdriver_url", &self.webdriver_url)
            .field("db_path", &self.db_path)
            .field("query_min_chars", &self.query_min_chars)
            .field("query_suffix", &self.query_suffix)
            .field("top_k", &self.top_k)
            .field("token_budget", &self.token_budget)
            .field("oversample", &self.oversample)
            .finish()
    }
}

/// Default WebDriver URL (a local `chromedriver`).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3020,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            tokenizer_path: PathBuf::new(),
            reranker_path: PathBuf::new(),
            search_backend: SearchBackendKind::Tavily,
            tavily_api_key: None,
            page_source: PageSourceKind::Http,
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            db_path: PathBuf::from("./db.sqlite3"),
            query_min_chars: None,
            query_suffix: DEFAULT_QUERY_SUFFIX.to_string(),
            top_k: DEFAULT_TOP_K,
            token_budget: DEFAULT_TOKEN_BUDGET,
            oversample: DEFAULT_OVERSAMPLE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    const ENV_PORT: &'static [&'static str] = &["SCOUT_PORT", "PORT"];
    const ENV_BIND_ADDR: &'static [&'static str] = &["SCOUT_BIND_ADDR"];
    const ENV_TOKENIZER_PATH: &'static [&'static str] = &["SCOUT_TOKENIZER_PATH", "TOKENIZER_PATH"];
    const ENV_RERANKER_PATH: &'static [&'static str] =
        &["SCOUT_RERANKER_PATH", "RERANKER_MODEL_PATH"];
    const ENV_SEARCH_BACKEND: &'static [&'static str] = &["SCOUT_SEARCH_BACKEND"];
    const ENV_TAVILY_API_KEY: &'static [&'static str] = &["SCOUT_TAVILY_API_KEY", "TAVILY_API_KEY"];
    const ENV_PAGE_SOURCE: &'static [&'static str] = &["SCOUT_PAGE_SOURCE"];
    const ENV_WEBDRIVER_URL: &'static [&'static str] = &["SCOUT_WEBDRIVER_URL"];
    const ENV_DB_PATH: &'static [&'static str] = &["SCOUT_DB_PATH"];
    const ENV_QUERY_MIN_CHARS: &'static [&'static str] = &["SCOUT_QUERY_MIN_CHARS"];
    const ENV_QUERY_SUFFIX: &'static [&'static str] = &["SCOUT_QUERY_SUFFIX"];
    const ENV_TOP_K: &'static [&'static str] = &["SCOUT_TOP_K"];
    const ENV_TOKEN_BUDGET: &'static [&'static str] = &["SCOUT_TOKEN_BUDGET"];
    const ENV_OVERSAMPLE: &'static [&'static str] = &["SCOUT_OVERSAMPLE"];
    const ENV_USER_AGENT: &'static [&'static str] = &["SCOUT_USER_AGENT"];

    /// Loads configuration from environment variables.
    ///
    /// Fails when a required variable is missing or any value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env()?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let tokenizer_path = Self::required(Self::ENV_TOKENIZER_PATH).map(PathBuf::from)?;
        let reranker_path = Self::required(Self::ENV_RERANKER_PATH).map(PathBuf::from)?;

        let search_backend =
            Self::parse_from_env(Self::ENV_SEARCH_BACKEND)?.unwrap_or(defaults.search_backend);
        let tavily_api_key = Self::lookup(Self::ENV_TAVILY_API_KEY);
        if search_backend == SearchBackendKind::Tavily && tavily_api_key.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_TAVILY_API_KEY[0],
            });
        }

        let page_source =
            Self::parse_from_env(Self::ENV_PAGE_SOURCE)?.unwrap_or(defaults.page_source);
        let webdriver_url = Self::lookup(Self::ENV_WEBDRIVER_URL).unwrap_or(defaults.webdriver_url);
        let db_path = Self::lookup(Self::ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let query_min_chars = Self::parse_from_env(Self::ENV_QUERY_MIN_CHARS)?;
        // Not trimmed: the suffix usually starts with a space.
        let query_suffix = Self::ENV_QUERY_SUFFIX
            .iter()
            .find_map(|name| env::var(name).ok())
            .unwrap_or(defaults.query_suffix);

        let top_k = Self::parse_from_env(Self::ENV_TOP_K)?.unwrap_or(defaults.top_k);
        let token_budget =
            Self::parse_from_env(Self::ENV_TOKEN_BUDGET)?.unwrap_or(defaults.token_budget);
        let oversample = Self::parse_from_env(Self::ENV_OVERSAMPLE)?.unwrap_or(defaults.oversample);
        let user_agent = Self::lookup(Self::ENV_USER_AGENT).unwrap_or(defaults.user_agent);

        Ok(Self {
            port,
            bind_addr,
            tokenizer_path,
            reranker_path,
            search_backend,
            tavily_api_key,
            page_source,
            webdriver_url,
            db_path,
            query_min_chars,
            query_suffix,
            top_k,
            token_budget,
            oversample,
            user_agent,
        })
    }

    /// Validates paths and ranking invariants (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tokenizer_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.tokenizer_path.clone(),
            });
        }

        if !self.reranker_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.reranker_path.clone(),
            });
        }
        if !self.reranker_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.reranker_path.clone(),
            });
        }

        if self.db_path.is_dir() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_DB_PATH[0],
                value: self.db_path.display().to_string(),
                reason: "expected a file path, found a directory".to_string(),
            });
        }

        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOP_K[0],
                value: self.top_k.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.oversample < self.top_k {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_OVERSAMPLE[0],
                value: self.oversample.to_string(),
                reason: format!("must be >= top_k ({})", self.top_k),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// First non-empty value among `names`, trimmed.
    fn lookup(names: &[&'static str]) -> Option<String> {
        names.iter().find_map(|name| {
            env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
    }

    fn required(names: &[&'static str]) -> Result<String, ConfigError> {
        Self::lookup(names).ok_or(ConfigError::MissingEnvVar { name: names[0] })
    }

    fn parse_port_from_env() -> Result<u16, ConfigError> {
        let value = Self::required(Self::ENV_PORT)?;
        let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
            value: value.clone(),
            source: e,
        })?;

        if port == 0 {
            return Err(ConfigError::InvalidPort { value });
        }

        Ok(port)
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match Self::lookup(Self::ENV_BIND_ADDR) {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            None => Ok(default),
        }
    }

    fn parse_from_env<T>(names: &[&'static str]) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match Self::lookup(names) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: names[0],
                    reason: e.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }
}
