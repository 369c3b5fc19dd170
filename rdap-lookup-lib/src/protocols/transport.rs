//! HTTP transport used by the RDAP query engine.
//!
//! The engine only needs "GET this URL and tell me the status, the redirect
//! target and the body". Keeping that behind a trait lets tests script
//! registry behaviour without a network.

use crate::error::RdapLookupError;
use async_trait::async_trait;
use reqwest::header::{HeaderName, ACCEPT, CONTENT_TYPE, LOCATION};
use std::time::Duration;

/// Media type requested from RDAP servers.
pub const RDAP_ACCEPT: &str = "application/rdap+json, application/json;q=0.9";

/// A response as seen by the query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// `Location` header, if any
    pub location: Option<String>,
    /// `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a JSON response with the given status.
    pub fn json<B: Into<Vec<u8>>>(status: u16, body: B) -> Self {
        Self {
            status,
            location: None,
            content_type: Some("application/rdap+json".to_string()),
            body: body.into(),
        }
    }

    /// Build a redirect response pointing at `location`.
    pub fn redirect<L: Into<String>>(status: u16, location: L) -> Self {
        Self {
            status,
            location: Some(location.into()),
            content_type: None,
            body: Vec::new(),
        }
    }
}

/// Something that can perform a single HTTP GET without following redirects.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue one GET request.
    ///
    /// Implementations must not follow redirects themselves; 3xx responses
    /// are returned as-is so the engine can bound the chain.
    async fn get(&self, url: &str) -> Result<HttpResponse, RdapLookupError>;
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct ReqwestTransport {
    /// HTTP client with automatic redirects disabled
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Optional per-request timeout; `None` keeps reqwest's default
    /// * `user_agent` - User-Agent header value
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self, RdapLookupError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(user_agent);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder.build().map_err(|e| {
            RdapLookupError::network("", "Failed to create RDAP HTTP client", e.to_string())
        })?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, RdapLookupError> {
        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, RDAP_ACCEPT)
            .send()
            .await
            .map_err(RdapLookupError::from)?;

        let status = response.status().as_u16();
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let location = header(LOCATION);
        let content_type = header(CONTENT_TYPE);

        let body = response.bytes().await.map_err(RdapLookupError::from)?;

        Ok(HttpResponse {
            status,
            location,
            content_type,
            body: body.to_vec(),
        })
    }
}

impl From<reqwest::Error> for RdapLookupError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        let message = if err.is_timeout() {
            "Request timed out"
        } else if err.is_connect() {
            "Connection failed"
        } else if err.is_body() || err.is_decode() {
            "Failed to read response body"
        } else {
            "HTTP request failed"
        };
        Self::network(url, message, err.to_string())
    }
}
