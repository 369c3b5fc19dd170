//! RDAP bootstrap registry.
//!
//! This module maps TLDs to the base URLs of their authoritative RDAP
//! servers. The data follows IANA's published bootstrap format (RFC 9224) and
//! is shipped with the crate as a snapshot; it is parsed once and never
//! modified afterwards.

use crate::error::RdapLookupError;
use crate::types::ParsedDomain;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Bootstrap snapshot compiled into the library.
pub const EMBEDDED_SNAPSHOT: &str = include_str!("../../data/dns.json");

lazy_static::lazy_static! {
    static ref EMBEDDED_REGISTRY: Result<Arc<BootstrapRegistry>, RdapLookupError> =
        BootstrapRegistry::from_json(EMBEDDED_SNAPSHOT).map(Arc::new);
}

/// On-disk shape of an IANA bootstrap file.
#[derive(Debug, Deserialize)]
struct BootstrapFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    publication: Option<String>,
    services: Vec<(Vec<String>, Vec<String>)>,
}

/// Immutable TLD -> RDAP server mapping.
///
/// Construct it once at startup and share it (it is cheap to wrap in an
/// `Arc`); lookups only read from it.
#[derive(Debug, Clone)]
pub struct BootstrapRegistry {
    /// Lowercase TLD -> base URLs in preference order
    servers: HashMap<String, Vec<String>>,
    version: Option<String>,
    publication: Option<String>,
}

impl BootstrapRegistry {
    /// Parse a registry from IANA bootstrap JSON.
    ///
    /// A TLD listed by several services accumulates their URLs in file order.
    /// Within each TLD, `https` URLs are moved in front of plain `http` ones.
    ///
    /// # Errors
    ///
    /// Returns `RdapLookupError::BootstrapLoad` if the document is not valid
    /// bootstrap JSON.
    pub fn from_json(json: &str) -> Result<Self, RdapLookupError> {
        let file: BootstrapFile = serde_json::from_str(json).map_err(|e| {
            RdapLookupError::bootstrap(format!("Invalid bootstrap JSON: {}", e))
        })?;

        let mut servers: HashMap<String, Vec<String>> = HashMap::new();

        for (tlds, urls) in &file.services {
            for tld in tlds {
                let key = tld.trim().trim_start_matches('.').to_lowercase();
                if key.is_empty() {
                    continue;
                }

                let entry = servers.entry(key).or_default();
                for url in urls {
                    let url = url.trim();
                    if !url.is_empty() && !entry.iter().any(|u| u == url) {
                        entry.push(url.to_string());
                    }
                }
            }
        }

        for urls in servers.values_mut() {
            // Stable sort keeps file order within each scheme
            urls.sort_by_key(|u| !u.to_ascii_lowercase().starts_with("https://"));
        }

        Ok(Self {
            servers,
            version: file.version,
            publication: file.publication,
        })
    }

    /// Load a registry from a bootstrap file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RdapLookupError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RdapLookupError::bootstrap(format!(
                "Failed to read bootstrap file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse the snapshot shipped with the library.
    pub fn embedded() -> Result<Self, RdapLookupError> {
        Self::from_json(EMBEDDED_SNAPSHOT)
    }

    /// Shared handle to the embedded snapshot, parsed once per process.
    pub fn shared() -> Result<Arc<Self>, RdapLookupError> {
        (*EMBEDDED_REGISTRY).clone()
    }

    /// Look up the RDAP base URLs for a TLD.
    ///
    /// # Arguments
    ///
    /// * `tld` - The TLD, case-insensitive, with or without a leading dot
    ///
    /// # Returns
    ///
    /// The base URLs in preference order, or `UnsupportedTld` if the
    /// registry has no server for it.
    pub fn lookup_servers(&self, tld: &str) -> Result<&[String], RdapLookupError> {
        let key = tld.trim().trim_start_matches('.').to_lowercase();

        match self.servers.get(&key) {
            Some(urls) if !urls.is_empty() => Ok(urls.as_slice()),
            _ => Err(RdapLookupError::unsupported_tld(key)),
        }
    }

    /// Find the servers for a parsed domain.
    ///
    /// Dotted registry keys take precedence: every suffix of the domain is
    /// tried longest first before the last label alone.
    ///
    /// # Returns
    ///
    /// The matching registry key together with its base URLs.
    pub fn servers_for_domain<'a>(
        &'a self,
        parsed: &'a ParsedDomain,
    ) -> Result<(&'a str, &'a [String]), RdapLookupError> {
        for candidate in parsed.tld_candidates() {
            if let Ok(urls) = self.lookup_servers(candidate) {
                return Ok((candidate, urls));
            }
        }

        Err(RdapLookupError::unsupported_tld(parsed.tld.clone()))
    }

    /// All TLDs with at least one server, sorted alphabetically.
    pub fn tlds(&self) -> Vec<&str> {
        let mut tlds: Vec<&str> = self
            .servers
            .iter()
            .filter(|(_, urls)| !urls.is_empty())
            .map(|(tld, _)| tld.as_str())
            .collect();
        tlds.sort_unstable();
        tlds
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Format version declared by the snapshot.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Publication timestamp declared by the snapshot.
    pub fn publication(&self) -> Option<&str> {
        self.publication.as_deref()
    }
}
