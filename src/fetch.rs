//! Page retrieval
//!
//! One blocking GET per code. No retries, no backoff, no caching: the batch
//! runner calls this strictly sequentially.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://gesund.bund.de/ops-code-suche/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; OPSWeb/1.0)";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Classified fetch failure. The `Display` form is what ends up in a
/// record's error field.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("HTTP {status}")]
    Http { status: u16 },
    /// DNS, connect, TLS, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),
    #[error("invalid URL {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },
    #[error("{0}")]
    Client(String),
}

impl FetchError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::Http {
                status: status.as_u16(),
            };
        }
        if err.is_builder() {
            return FetchError::Client(describe(&err));
        }
        FetchError::Network(describe(&err))
    }
}

/// reqwest hides the interesting part (refused, timed out, ...) in the
/// source chain, so flatten it into one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Request settings for [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Origin plus path prefix; slugs are resolved relative to it
    pub base_url: String,
    pub user_agent: String,
    /// Extra headers, applied over the default user agent
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: vec![],
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Raw markup plus the URL it was finally served from (after redirects)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    pub url: String,
}

/// Anything that can turn a slug into page markup.
pub trait PageFetcher {
    fn fetch(&self, slug: &str) -> Result<FetchedPage, FetchError>;
}

/// [`PageFetcher`] backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let base = Url::parse(&options.base_url).map_err(|source| FetchError::InvalidUrl {
            input: options.base_url.clone(),
            source,
        })?;

        let client = Client::builder()
            .default_headers(build_headers(options)?)
            .timeout(options.timeout)
            .build()
            .map_err(FetchError::from_reqwest)?;

        Ok(Self { client, base })
    }

    /// Resolve a slug against the base URL. An absolute slug replaces the
    /// base entirely.
    pub fn target_url(&self, slug: &str) -> Result<Url, FetchError> {
        self.base.join(slug).map_err(|source| FetchError::InvalidUrl {
            input: slug.to_string(),
            source,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, slug: &str) -> Result<FetchedPage, FetchError> {
        let url = self.target_url(slug)?;
        debug!(%url, "fetching OPS page");

        let response = self.client.get(url.clone()).send().map_err(|e| {
            let err = FetchError::from_reqwest(e);
            warn!(%url, error = %err, "request failed");
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "non-success status");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let resolved = response.url().to_string();
        let html = response.text().map_err(FetchError::from_reqwest)?;
        debug!(url = %resolved, bytes = html.len(), "fetched OPS page");

        Ok(FetchedPage {
            html,
            url: resolved,
        })
    }
}

fn build_headers(options: &FetchOptions) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(&options.user_agent).map_err(|_| {
        FetchError::InvalidHeader {
            name: USER_AGENT.to_string(),
        }
    })?;
    headers.insert(USER_AGENT, agent);

    for (name, value) in &options.headers {
        let invalid = || FetchError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
