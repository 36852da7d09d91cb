//! Outbound fetching.
//!
//! [`PageFetcher`] is the seam between the relay loop and the network: the
//! loop only ever sees a fully buffered [`FetchAttempt`], so tests can drive
//! it with a mock instead of a socket. [`HttpFetcher`] is the real
//! implementation on top of reqwest, which follows transport-level (HTTP 3xx)
//! redirects on its own.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::config::RelayConfig;
use crate::errors::RelayError;

/// Result of one network fetch, fully buffered.
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    /// Final URL after any transport-level redirects.
    pub final_url: Url,
    /// Numeric HTTP status code.
    pub status: u16,
    /// Reason phrase, `"Unknown"` for non-standard codes.
    pub status_text: String,
    /// `Content-Type` response header, if present.
    pub content_type: Option<String>,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl FetchAttempt {
    /// Whether the fetch succeeded (2xx status).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Protocol for fetching a page on behalf of the relay.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issues a GET for `url` and buffers the response.
    async fn fetch(&self, url: &str) -> Result<FetchAttempt, RelayError>;
}

/// The reqwest-backed fetcher used in production.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the configured user agent and timeout.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchAttempt, RelayError> {
        let response = self.client.get(url).send().await?;

        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        // Buffer the whole body; streaming is out of scope.
        let body = response.bytes().await?.to_vec();

        Ok(FetchAttempt {
            final_url,
            status,
            status_text,
            content_type,
            body,
        })
    }
}
