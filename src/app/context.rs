use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::Result;
use crate::client::{HeadlineClient, SummaryClient};
use crate::config::{Config, Preferences};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::{Endpoint, Fetcher};
use crate::orchestrator::{Orchestrator, RefreshPolicy};

/// Wires config, transport and endpoint together and hands out
/// orchestrators.
pub struct AppContext {
    pub config: Config,
    pub endpoint: Endpoint,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    preferences_path: Option<PathBuf>,
}

impl AppContext {
    /// `base_url` overrides `[api] base_url` from the config.
    pub fn new(config: Config, base_url: Option<&str>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::with_connect_timeout(config.api.connect_timeout())?);
        let preferences_path = match Preferences::default_path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "Preferences will not be persisted");
                None
            }
        };

        Self::with_fetcher(config, base_url, fetcher, preferences_path)
    }

    pub fn with_fetcher(
        config: Config,
        base_url: Option<&str>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        preferences_path: Option<PathBuf>,
    ) -> Result<Self> {
        let endpoint = Endpoint::new(base_url.unwrap_or(&config.api.base_url))?;
        tracing::debug!(base = %endpoint.base(), "Using API endpoint");

        Ok(Self {
            config,
            endpoint,
            fetcher,
            preferences_path,
        })
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.config.refresh_policy()
    }

    pub fn headlines(&self) -> Result<Orchestrator<HeadlineClient>> {
        let client = HeadlineClient::new(self.fetcher.clone(), &self.endpoint)?;
        Ok(Orchestrator::new(client, self.policy()))
    }

    pub fn latest(&self) -> Result<Orchestrator<SummaryClient>> {
        let client = SummaryClient::new(self.fetcher.clone(), &self.endpoint)?;
        Ok(Orchestrator::new(client, self.policy()))
    }

    /// Falls back to defaults when the file is unreadable.
    pub fn load_preferences(&self) -> Preferences {
        let Some(path) = &self.preferences_path else {
            return Preferences::default();
        };

        Preferences::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable preferences");
            Preferences::default()
        })
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        if let Some(path) = &self.preferences_path {
            preferences.save(path)?;
        }
        Ok(())
    }
}
