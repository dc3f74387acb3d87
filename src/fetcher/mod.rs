pub mod http_fetcher;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::app::{NewsumError, Result};

pub const HEADLINES_PATH: &str = "summary/headlines";
pub const LATEST_PATH: &str = "summary/latest";

/// Status and body exactly as the server sent them
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Fetcher {
    /// Issue a single GET. Implementations must return
    /// [`NewsumError::Cancelled`] when `cancel` fires before the response is
    /// complete, and must not retry.
    async fn get(&self, url: &Url, cancel: &CancellationToken) -> Result<RawResponse>;
}

/// Accept only `200 OK`; everything else is an invalid response.
pub fn expect_ok(response: RawResponse) -> Result<Vec<u8>> {
    if response.status == 200 {
        return Ok(response.body);
    }

    let body = String::from_utf8(response.body)
        .ok()
        .filter(|b| !b.trim().is_empty());

    if let Some(text) = &body {
        tracing::warn!(status = response.status, body = %text, "Error response body");
    }

    Err(NewsumError::InvalidResponse {
        status: response.status,
        body,
    })
}

/// API base URL, validated once so that a bad configuration fails before
/// any request goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn new(base: &str) -> Result<Self> {
        let trimmed = base.trim();
        if trimmed.is_empty() {
            return Err(NewsumError::InvalidEndpoint("empty base URL".into()));
        }

        let mut base = Url::parse(trimmed)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(NewsumError::InvalidEndpoint(format!(
                "unsupported scheme: {}",
                base.scheme()
            )));
        }
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(NewsumError::InvalidEndpoint(format!("not a base URL: {}", trimmed)));
        }

        // Url::join drops the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub fn headlines(&self) -> Result<Url> {
        self.resolve(HEADLINES_PATH)
    }

    pub fn latest(&self) -> Result<Url> {
        self.resolve(LATEST_PATH)
    }
}
