//! Upstream blob store client
//!
//! One GET per call against a fixed URL. No retries; the client's own
//! defaults decide connect and redirect behavior.

use hyper::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::UpstreamConfig;
use crate::error::FetchError;

/// Body and content type of a successful upstream response
#[derive(Debug, Clone)]
pub struct UpstreamBody {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Shared fetcher for the configured blob URL
#[derive(Debug, Clone)]
pub struct BlobFetcher {
    client: Client,
    url: String,
}

impl BlobFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the blob. Any non-2xx status is an error.
    pub async fn fetch(&self) -> Result<UpstreamBody, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let bytes = response.bytes().await?;

        tracing::debug!(url = %self.url, bytes = bytes.len(), "upstream fetch complete");

        Ok(UpstreamBody {
            bytes,
            content_type,
        })
    }
}
