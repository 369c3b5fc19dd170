//! Core data types for RDAP lookups.
//!
//! This module defines the standardized record returned by every lookup,
//! the parsed form of user input, and the configuration options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// RDAP JSON document exactly as returned by a registry server.
pub type RawRdapResponse = serde_json::Value;

/// Normalized registration data for one domain.
///
/// Every registry's RDAP response is mapped onto this shape. Optional fields
/// are omitted from serialized output when the registry did not provide them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizedRecord {
    /// The queried domain name, lowercase ASCII (e.g., "eib.org")
    pub domain_name: String,

    /// When the domain was first registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Last change of the registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// When the registration expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Sponsoring registrar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<RegistrarInfo>,

    /// Registrant contact, often redacted by the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrant: Option<RegistrantInfo>,

    /// Nameserver hostnames in registry order
    #[serde(default)]
    pub nameservers: Vec<String>,

    /// Status phrases (e.g., "client transfer prohibited")
    #[serde(default)]
    pub status: Vec<String>,

    /// The registry response exactly as received
    pub raw: RawRdapResponse,
}

/// Registrar identity extracted from the `registrar` entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// IANA registrar ID (e.g., "292")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iana_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RegistrarInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.iana_id.is_none() && self.url.is_none()
    }
}

/// Registrant contact extracted from the `registrant` entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RegistrantInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.organization.is_none() && self.email.is_none()
    }
}

/// A user-supplied domain after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedDomain {
    /// Lowercase ASCII domain without a leading `www.` (e.g., "example.co.uk")
    pub domain: String,

    /// Last label of the domain (e.g., "uk")
    pub tld: String,
}

impl ParsedDomain {
    /// Candidate registry keys, longest dotted suffix first.
    ///
    /// For `a.example.co.uk` this yields `example.co.uk`, `co.uk`, `uk`. The
    /// full name is never a candidate since at least one label must remain
    /// in front of the TLD.
    pub fn tld_candidates(&self) -> Vec<&str> {
        let mut candidates = Vec::new();
        let mut rest = self.domain.as_str();
        while let Some(pos) = rest.find('.') {
            rest = &rest[pos + 1..];
            candidates.push(rest);
        }
        candidates
    }
}

/// Configuration options for lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    /// Maximum redirect/referral hops per server
    /// Default: 5
    pub max_redirects: usize,

    /// Request timeout for each HTTP request
    /// Default: none (transport default applies)
    pub timeout: Option<Duration>,

    /// User-Agent header sent to registry servers
    pub user_agent: String,

    /// Bootstrap snapshot to load instead of the embedded one
    pub bootstrap_file: Option<PathBuf>,
}

/// Default bound on redirect/referral hops.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout: None,
            user_agent: format!("rdap-lookup/{}", crate::VERSION),
            bootstrap_file: None,
        }
    }
}

impl LookupConfig {
    /// Set the redirect/referral bound.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Load the bootstrap registry from a file instead of the embedded snapshot.
    pub fn with_bootstrap_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.bootstrap_file = Some(path.into());
        self
    }
}
