use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::app::{NewsumError, Result};
use crate::fetcher::{Fetcher, RawResponse};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest-backed transport.
///
/// Only connection setup is time-limited here. How long a whole request may
/// take is up to the caller, through the cancellation token.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_connect_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("newsum/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    async fn send(&self, url: &Url) -> Result<RawResponse> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        tracing::debug!(%url, status, "Response received");

        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &Url, cancel: &CancellationToken) -> Result<RawResponse> {
        tracing::info!(%url, "Fetching");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(%url, "Request cancelled");
                Err(NewsumError::Cancelled)
            }
            result = self.send(url) => {
                if let Err(e) = &result {
                    tracing::warn!(%url, error = %e, "Network transport failed");
                }
                result
            }
        }
    }
}
