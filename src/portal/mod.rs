//! Client side of the portal's user flows: OTP login and registration for
//! the three roles, profile file management and small page-state holders.
//! Each call is an isolated request/response; nothing here shares state with
//! the catalog viewer.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::redirect::Policy;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::config::Config;

pub mod csrf;
pub mod layout;
pub mod notice;
pub mod otp;
pub mod profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Customer,
    Broker,
    Employee,
}

impl Role {
    pub fn slug(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Broker => "broker",
            Role::Employee => "employee",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "customer" => Some(Role::Customer),
            "broker" => Some(Role::Broker),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PortalError {
    /// Client-side check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid portal url: {0}")]
    Url(#[from] url::ParseError),
}

pub struct PortalClient {
    client: Client,
    /// Same cookie jar, redirects left to the caller.
    manual: Client,
    jar: Arc<Jar>,
    base: Url,
    csrf_cookie: String,
}

impl PortalClient {
    pub fn new(base: Url, csrf_cookie: &str) -> Result<Self, PortalError> {
        let jar = Arc::new(Jar::default());
        let transport = |source| PortalError::Transport {
            url: base.to_string(),
            source,
        };
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .map_err(transport)?;
        let manual = Client::builder()
            .cookie_provider(jar.clone())
            .redirect(Policy::none())
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            manual,
            jar,
            base,
            csrf_cookie: csrf_cookie.to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(cfg.base_url()?, &cfg.csrf_cookie)?)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Client that returns 3xx responses instead of following them.
    pub(crate) fn http_manual(&self) -> &Client {
        &self.manual
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `/users/<role>/<leaf>` under the portal base.
    pub fn role_url(&self, role: Role, leaf: &str) -> Result<Url, PortalError> {
        Ok(self.base.join(&format!("/users/{}/{}", role.slug(), leaf))?)
    }

    /// Seeds the cookie jar, e.g. with a `csrftoken=...` obtained elsewhere.
    pub fn add_cookie(&self, raw: &str) {
        self.jar.add_cookie_str(raw, &self.base);
    }

    /// Current CSRF token from the cookie jar.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let cookies = header.to_str().ok()?;
        csrf::cookie_value(cookies, &self.csrf_cookie)
    }

    /// GETs the role's login page so the server sets the CSRF cookie.
    pub async fn prime_session(&self, role: Role) -> Result<(), PortalError> {
        let url = self.role_url(role, "login/")?;
        self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| PortalError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(())
    }

    pub(crate) fn transport(url: &Url) -> impl Fn(reqwest::Error) -> PortalError + '_ {
        move |source| PortalError::Transport {
            url: url.to_string(),
            source,
        }
    }
}
