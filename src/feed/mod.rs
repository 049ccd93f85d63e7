//! Catalog sources: where the scheme list comes from.

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{parse_catalog, CatalogDocument};

pub mod http;
pub mod retry;

pub use http::HttpCatalog;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("catalog body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot read catalog file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Worth another attempt: connection trouble or a transient server status.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Transport { source, .. } => retry::is_retryable_network_error(source),
            CatalogError::Status { status, .. } => retry::is_retryable_http_error(*status),
            CatalogError::Decode(_) | CatalogError::File { .. } => false,
        }
    }
}

#[async_trait]
pub trait CatalogSource {
    /// Where the list is read from, for logs.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<CatalogDocument, CatalogError>;
}

/// In-memory payload, used for fixtures and offline runs.
pub struct StaticCatalog {
    body: Vec<u8>,
}

impl StaticCatalog {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    fn describe(&self) -> String {
        "static".to_string()
    }

    async fn fetch(&self) -> Result<CatalogDocument, CatalogError> {
        Ok(parse_catalog(&self.body)?)
    }
}

/// A JSON export of the data endpoint saved on disk.
pub struct FileCatalog {
    path: std::path::PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<CatalogDocument, CatalogError> {
        let body = tokio::fs::read(&self.path)
            .await
            .map_err(|source| CatalogError::File {
                path: self.describe(),
                source,
            })?;
        Ok(parse_catalog(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_decodes() {
        let src = StaticCatalog::new(r#"{"schemes":[{"name":"A","provider":"P"}]}"#);
        let doc = src.fetch().await.unwrap();
        assert_eq!(doc.schemes.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_typed_error() {
        let src = FileCatalog::new("/nonexistent/schemes.json");
        let err = src.fetch().await.unwrap_err();
        assert!(matches!(err, CatalogError::File { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn status_retryability() {
        let busy = CatalogError::Status {
            url: "u".to_string(),
            status: 503,
        };
        let missing = CatalogError::Status {
            url: "u".to_string(),
            status: 404,
        };
        assert!(busy.is_retryable());
        assert!(!missing.is_retryable());
    }
}
