//! RDAP (Registration Data Access Protocol) query engine.
//!
//! This module sends domain queries to the candidate servers of a TLD,
//! follows redirects and in-body referrals up to a bound, and classifies
//! every failure into a distinct error kind.

use crate::error::RdapLookupError;
use crate::protocols::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use crate::types::{LookupConfig, RawRdapResponse};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// RDAP client for querying domain registration data.
///
/// The client is cheap to clone and holds no per-lookup state, so one
/// instance can serve any number of concurrent lookups.
#[derive(Clone)]
pub struct RdapClient {
    /// Transport performing the individual GET requests
    transport: Arc<dyn HttpTransport>,
    /// Maximum redirect/referral hops per server
    max_redirects: usize,
}

impl RdapClient {
    /// Create a new RDAP client with default settings.
    pub fn new() -> Result<Self, RdapLookupError> {
        Self::with_config(&LookupConfig::default())
    }

    /// Create a new RDAP client using the `reqwest` transport.
    pub fn with_config(config: &LookupConfig) -> Result<Self, RdapLookupError> {
        let transport = ReqwestTransport::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_transport(Arc::new(transport), config.max_redirects))
    }

    /// Create a client on top of a custom transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>, max_redirects: usize) -> Self {
        Self {
            transport,
            max_redirects,
        }
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Query the RDAP servers of a TLD for a domain.
    ///
    /// Servers are tried in order. A 404 is authoritative and ends the
    /// lookup at once; any other failure moves on to the next server, and
    /// the last failure is returned once all servers are exhausted.
    ///
    /// # Arguments
    ///
    /// * `domain` - Normalized domain name (e.g., "eib.org")
    /// * `servers` - Base URLs in preference order
    ///
    /// # Errors
    ///
    /// * `DomainNotFound` if a server answered 404
    /// * `TooManyRedirects` if a redirect chain exceeded the bound
    /// * `InvalidResponse` if a success response did not carry RDAP JSON
    /// * `NetworkOrServer` for transport failures and other error statuses
    /// * `UnsupportedTld` if `servers` is empty
    pub async fn query(
        &self,
        domain: &str,
        servers: &[String],
    ) -> Result<RawRdapResponse, RdapLookupError> {
        let mut last_error = None;

        for (index, base_url) in servers.iter().enumerate() {
            match self.query_server(domain, base_url).await {
                Ok(json) => return Ok(json),
                Err(e) if e.is_not_found() => return Err(e),
                Err(e) => {
                    if index + 1 < servers.len() {
                        warn!(domain = %domain, server = %base_url, error = %e, "RDAP server failed, trying next");
                    } else {
                        debug!(domain = %domain, server = %base_url, error = %e, "RDAP server failed");
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            let tld = domain.rsplit('.').next().unwrap_or(domain);
            RdapLookupError::unsupported_tld(tld)
        }))
    }

    /// Query one server, following its redirect chain.
    async fn query_server(
        &self,
        domain: &str,
        base_url: &str,
    ) -> Result<RawRdapResponse, RdapLookupError> {
        let mut url = domain_url(base_url, domain);
        let mut hops = 0usize;

        loop {
            debug!(url = %url, hop = hops, "Querying RDAP");
            let response = self.transport.get(&url).await?;
            debug!(url = %url, status = response.status, "RDAP response");

            let next = match response.status {
                300..=399 => {
                    let location = response
                        .location
                        .as_deref()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .ok_or_else(|| {
                            RdapLookupError::server_status(
                                &url,
                                "Redirect without Location header",
                                response.status,
                            )
                        })?;
                    resolve_location(&url, location)
                }
                404 => return Err(RdapLookupError::not_found(domain, &url)),
                200..=299 => {
                    let json = parse_body(domain, &url, &response)?;
                    match referral_target(&json, &url) {
                        Some(target) => {
                            debug!(from = %url, to = %target, "Following RDAP referral");
                            target
                        }
                        None => return Ok(json),
                    }
                }
                status => {
                    return Err(RdapLookupError::server_status(
                        &url,
                        format!("RDAP server returned error: {}", status_reason(status)),
                        status,
                    ))
                }
            };

            hops += 1;
            if hops > self.max_redirects {
                return Err(RdapLookupError::too_many_redirects(
                    domain,
                    self.max_redirects,
                    next,
                ));
            }
            url = next;
        }
    }
}

/// Build the canonical domain query URL for a server base URL.
pub fn domain_url(base_url: &str, domain: &str) -> String {
    format!("{}/domain/{}", base_url.trim_end_matches('/'), domain)
}

/// Resolve a (possibly relative) redirect target against the current URL.
fn resolve_location(current: &str, location: &str) -> String {
    Url::parse(current)
        .and_then(|base| base.join(location))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| location.to_string())
}

/// Human-readable reason for an HTTP status.
fn status_reason(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("{} {}", status, reason),
        None => status.to_string(),
    }
}

/// Parse a success body as an RDAP JSON object.
fn parse_body(domain: &str, url: &str, response: &HttpResponse) -> Result<Value, RdapLookupError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(RdapLookupError::invalid_response(domain, url, "empty body"));
    }

    let json: Value = serde_json::from_slice(&response.body).map_err(|e| {
        RdapLookupError::invalid_response(
            domain,
            url,
            format!("body is {}, not JSON ({})", describe_body(response), e),
        )
    })?;

    if !json.is_object() {
        return Err(RdapLookupError::invalid_response(
            domain,
            url,
            format!("JSON body is {}, expected an RDAP object", json_kind(&json)),
        ));
    }

    Ok(json)
}

/// Describe what a non-JSON body looks like.
fn describe_body(response: &HttpResponse) -> String {
    let kind = match std::str::from_utf8(&response.body) {
        Ok(text) if text.trim_start().starts_with('<') => "an HTML/XML document",
        Ok(_) => "plain text",
        Err(_) => "binary data",
    };

    match &response.content_type {
        Some(content_type) => format!("{} ({})", kind, content_type),
        None => kind.to_string(),
    }
}

fn json_kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Find an in-body referral to another RDAP server.
///
/// Only bodies that are not themselves domain objects are considered; the
/// referral is a `related` link pointing at RDAP JSON or a domain path.
fn referral_target(json: &Value, current_url: &str) -> Option<String> {
    let is_domain_object = json
        .get("objectClassName")
        .and_then(Value::as_str)
        .map_or(false, |c| c.eq_ignore_ascii_case("domain"))
        || json.get("ldhName").is_some();
    if is_domain_object {
        return None;
    }

    json.get("links")?
        .as_array()?
        .iter()
        .filter(|link| {
            link.get("rel")
                .and_then(Value::as_str)
                .map_or(false, |rel| rel.eq_ignore_ascii_case("related"))
        })
        .filter_map(|link| {
            let href = link.get("href").and_then(Value::as_str)?.trim();
            let is_rdap = link
                .get("type")
                .and_then(Value::as_str)
                .map_or(false, |t| t.contains("rdap+json"))
                || href.contains("/domain/");
            is_rdap.then(|| resolve_location(current_url, href))
        })
        .find(|target| target != current_url)
}
