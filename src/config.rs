use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_DATA_PATH: &str = "/pms/whitelisted/data/";

#[derive(Clone, Debug)]
pub struct Config {
    pub portal_base: String,
    /// Overrides `portal_base` + `DEFAULT_DATA_PATH` when set.
    pub data_url: Option<String>,
    pub catalog_timeout_secs: u64,
    pub catalog_retries: u32,
    pub catalog_retry_base_ms: u64,
    pub csrf_cookie: String,
    pub highlight_count: usize,
    pub notice_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_base: "http://127.0.0.1:8000".to_string(),
            data_url: None,
            catalog_timeout_secs: 15,
            catalog_retries: 0,
            catalog_retry_base_ms: 250,
            csrf_cookie: "csrftoken".to_string(),
            highlight_count: 6,
            notice_secs: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            portal_base: std::env::var("PORTAL_BASE_URL").unwrap_or(d.portal_base),
            data_url: std::env::var("PMS_DATA_URL").ok().filter(|v| !v.trim().is_empty()),
            catalog_timeout_secs: std::env::var("CATALOG_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.catalog_timeout_secs),
            catalog_retries: std::env::var("CATALOG_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(d.catalog_retries),
            catalog_retry_base_ms: std::env::var("CATALOG_RETRY_BASE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.catalog_retry_base_ms),
            csrf_cookie: std::env::var("CSRF_COOKIE").unwrap_or(d.csrf_cookie),
            highlight_count: std::env::var("HIGHLIGHT_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.highlight_count),
            notice_secs: std::env::var("NOTICE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.notice_secs),
        }
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.portal_base)
            .with_context(|| format!("invalid PORTAL_BASE_URL: {}", self.portal_base))
    }

    /// Resolves the scheme data endpoint. A relative `PMS_DATA_URL` is joined
    /// onto the portal base, the way a browser resolves it against the page.
    pub fn data_url(&self) -> Result<Url> {
        let base = self.base_url()?;
        let raw = self.data_url.as_deref().unwrap_or(DEFAULT_DATA_PATH);
        base.join(raw)
            .with_context(|| format!("invalid data url: {}", raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_data_url_is_under_portal_base() {
        let cfg = Config {
            portal_base: "https://portal.example.com".to_string(),
            ..Config::default()
        };
        assert_eq!(
            cfg.data_url().unwrap().as_str(),
            "https://portal.example.com/pms/whitelisted/data/"
        );
    }

    #[test]
    fn absolute_data_url_wins() {
        let cfg = Config {
            data_url: Some("https://cdn.example.com/schemes.json".to_string()),
            ..Config::default()
        };
        assert_eq!(cfg.data_url().unwrap().host_str(), Some("cdn.example.com"));
    }

    #[test]
    fn bad_base_is_an_error() {
        let cfg = Config {
            portal_base: "not a url".to_string(),
            ..Config::default()
        };
        assert!(cfg.base_url().is_err());
    }
}
