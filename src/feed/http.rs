use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

use super::retry::{retry_async, RetryConfig};
use super::{CatalogError, CatalogSource};
use crate::catalog::{parse_catalog, CatalogDocument};
use crate::config::Config;

/// GETs the whitelisted-schemes data endpoint.
pub struct HttpCatalog {
    client: Client,
    url: Url,
    retry: RetryConfig,
}

impl HttpCatalog {
    pub fn new(url: Url, timeout: Duration, retry: RetryConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CatalogError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(Self { client, url, retry })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            cfg.data_url()?,
            Duration::from_secs(cfg.catalog_timeout_secs),
            RetryConfig::attempts(cfg.catalog_retries, cfg.catalog_retry_base_ms),
        )?)
    }

    async fn fetch_once(&self) -> Result<CatalogDocument, CatalogError> {
        let transport = |source| CatalogError::Transport {
            url: self.url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(transport)?;
        Ok(parse_catalog(&body)?)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<CatalogDocument, CatalogError> {
        retry_async(&self.retry, "fetch_catalog", CatalogError::is_retryable, || {
            self.fetch_once()
        })
        .await
    }
}
