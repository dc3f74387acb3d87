//! Sources bind one endpoint to one decoder so the orchestrator can load
//! them as a unit.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::app::Result;
use crate::decoder::Decoder;
use crate::domain::{Headline, NewsSummary};
use crate::fetcher::{expect_ok, Endpoint, Fetcher};

#[async_trait]
pub trait Source: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Fetch and decode one batch. Must return
    /// [`NewsumError::Cancelled`](crate::app::NewsumError::Cancelled) when
    /// `cancel` fires first.
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<Self::Item>>;
}

async fn fetch_body(
    fetcher: &(dyn Fetcher + Send + Sync),
    url: &Url,
    cancel: &CancellationToken,
) -> Result<Vec<u8>> {
    let response = fetcher.get(url, cancel).await?;
    tracing::debug!(%url, status = response.status, bytes = response.body.len(), "Got response");
    expect_ok(response)
}

pub struct HeadlineClient {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    url: Url,
    decoder: Decoder,
}

impl HeadlineClient {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, endpoint: &Endpoint) -> Result<Self> {
        Ok(Self {
            fetcher,
            url: endpoint.headlines()?,
            decoder: Decoder::new(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Source for HeadlineClient {
    type Item = Headline;

    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<Headline>> {
        let body = fetch_body(self.fetcher.as_ref(), &self.url, cancel).await?;
        let headlines = self.decoder.decode_headlines(&body)?;
        tracing::info!(count = headlines.len(), "Decoded headlines");
        Ok(headlines)
    }
}

pub struct SummaryClient {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    url: Url,
    decoder: Decoder,
}

impl SummaryClient {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, endpoint: &Endpoint) -> Result<Self> {
        Ok(Self {
            fetcher,
            url: endpoint.latest()?,
            decoder: Decoder::new(),
        })
    }
}

#[async_trait]
impl Source for SummaryClient {
    type Item = NewsSummary;

    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<NewsSummary>> {
        let body = fetch_body(self.fetcher.as_ref(), &self.url, cancel).await?;
        let summaries = self.decoder.decode_summaries(&body)?;
        tracing::info!(count = summaries.len(), "Decoded summaries");
        Ok(summaries)
    }
}
