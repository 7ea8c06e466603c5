use crate::error::{FetchError, Result};
use crate::target::Target;
use reqwest::header::COOKIE;
use reqwest::{Client, Proxy};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
const USER_AGENT: &str = concat!("oto/", env!("CARGO_PKG_VERSION"));

/// Where the `Cookie` header value comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CookieSource {
    #[default]
    None,
    /// Sent verbatim.
    Inline(String),
    /// File content, trimmed, sent verbatim.
    File(PathBuf),
}

impl CookieSource {
    /// Inline cookies win over a cookie file.
    pub fn from_options(cookie: Option<String>, cookie_file: Option<PathBuf>) -> Self {
        match (cookie, cookie_file) {
            (Some(cookie), _) if !cookie.is_empty() => CookieSource::Inline(cookie),
            (_, Some(path)) => CookieSource::File(path),
            _ => CookieSource::None,
        }
    }

    /// Resolve to the header value. No cookie syntax validation is done.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            CookieSource::None => Ok(None),
            CookieSource::Inline(cookie) => Ok(Some(cookie.clone())),
            CookieSource::File(path) => read_cookie_file(path).map(Some),
        }
    }
}

fn read_cookie_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map(|content| content.trim().to_string())
        .map_err(|source| FetchError::CookieFile {
            path: path.display().to_string(),
            source,
        })
}

/// Transport settings shared by every request in a run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub cookie: Option<String>,
    pub cookie_jar: bool,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy: None,
            cookie: None,
            cookie_jar: true,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_cookie_jar(mut self, enabled: bool) -> Self {
        self.cookie_jar = enabled;
        self
    }
}

/// A successful retrieval. Non-2xx statuses are passed through as-is.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status_code: u16,
    pub body: Vec<u8>,
    pub response_time: Duration,
}

impl FetchedPage {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub type FetchOutcome = Result<FetchedPage>;

/// One shared HTTP client per run. Clones share the connection pool and
/// cookie jar.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    cookie: Option<String>,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            // recon targets are often staging boxes with self-signed certs
            .danger_accept_invalid_certs(true)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(config.cookie_jar);

        if let Some(ref proxy) = config.proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str()).map_err(FetchError::ClientBuild)?);
        }

        let client = builder.build().map_err(FetchError::ClientBuild)?;

        Ok(Self {
            client,
            cookie: config.cookie.clone(),
        })
    }

    /// Fetch an address and read its whole body.
    pub async fn fetch(&self, target: &Target) -> FetchOutcome {
        self.fetch_str(target.as_str()).await
    }

    /// Like [`Fetcher::fetch`] for addresses that have not been validated
    /// yet. Missing scheme or host is reported without touching the network.
    pub async fn fetch_str(&self, url: &str) -> FetchOutcome {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidTarget(format!("{}: {}", url, e)))?;
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(FetchError::InvalidTarget(format!("{}: missing host", url)));
        }

        debug!("Fetching {}", url);

        let mut request = self.client.get(parsed);
        if let Some(ref cookie) = self.cookie {
            request = request.header(COOKIE, cookie.as_str());
        }

        let start = Instant::now();
        let response = request.send().await.map_err(FetchError::Transport)?;

        let status_code = response.status().as_u16();

        let body = response.bytes().await.map_err(FetchError::Read)?;

        Ok(FetchedPage {
            status_code,
            body: body.to_vec(),
            response_time: start.elapsed(),
        })
    }
}
