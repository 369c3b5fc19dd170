//! Error handling for RDAP lookup operations.
//!
//! This module defines a single error type covering every way a lookup can
//! fail, from unusable input to misbehaving registry servers. Each failure is
//! a distinct variant so callers can branch on it.

use std::fmt;

/// Main error type for RDAP lookup operations.
///
/// The first six variants are the per-lookup failures; the remaining ones
/// come from setting the library up (bootstrap snapshot, configuration).
#[derive(Debug, Clone)]
pub enum RdapLookupError {
    /// The input has no extractable domain or TLD
    InvalidInput { input: String, reason: String },

    /// The TLD is not present in the bootstrap registry
    UnsupportedTld { tld: String },

    /// The authoritative server answered 404
    DomainNotFound { domain: String, url: String },

    /// The redirect/referral chain exceeded the configured bound
    TooManyRedirects {
        domain: String,
        limit: usize,
        last_url: String,
    },

    /// A successful response whose body is not usable RDAP JSON
    InvalidResponse {
        domain: String,
        url: String,
        message: String,
    },

    /// Transport failure (DNS, connect, timeout) or a non-404 error status
    NetworkOrServer {
        url: String,
        message: String,
        status_code: Option<u16>,
        source: Option<String>,
    },

    /// The bootstrap snapshot is missing or corrupt
    BootstrapLoad { message: String },

    /// Configuration errors (invalid settings, unparseable files)
    ConfigError { message: String },

    /// File I/O errors when reading configuration, snapshots or domain lists
    FileError { path: String, message: String },
}

impl RdapLookupError {
    /// Create a new invalid input error.
    pub fn invalid_input<I: Into<String>, R: Into<String>>(input: I, reason: R) -> Self {
        Self::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new unsupported TLD error.
    pub fn unsupported_tld<T: Into<String>>(tld: T) -> Self {
        Self::UnsupportedTld { tld: tld.into() }
    }

    /// Create a new domain-not-found error.
    pub fn not_found<D: Into<String>, U: Into<String>>(domain: D, url: U) -> Self {
        Self::DomainNotFound {
            domain: domain.into(),
            url: url.into(),
        }
    }

    /// Create a new redirect-bound error.
    pub fn too_many_redirects<D: Into<String>, U: Into<String>>(
        domain: D,
        limit: usize,
        last_url: U,
    ) -> Self {
        Self::TooManyRedirects {
            domain: domain.into(),
            limit,
            last_url: last_url.into(),
        }
    }

    /// Create a new invalid response error.
    pub fn invalid_response<D: Into<String>, U: Into<String>, M: Into<String>>(
        domain: D,
        url: U,
        message: M,
    ) -> Self {
        Self::InvalidResponse {
            domain: domain.into(),
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a new network error with the underlying cause.
    pub fn network<U: Into<String>, M: Into<String>, S: Into<String>>(
        url: U,
        message: M,
        source: S,
    ) -> Self {
        Self::NetworkOrServer {
            url: url.into(),
            message: message.into(),
            status_code: None,
            source: Some(source.into()),
        }
    }

    /// Create a new server error for an HTTP error status.
    pub fn server_status<U: Into<String>, M: Into<String>>(
        url: U,
        message: M,
        status_code: u16,
    ) -> Self {
        Self::NetworkOrServer {
            url: url.into(),
            message: message.into(),
            status_code: Some(status_code),
            source: None,
        }
    }

    /// Create a new bootstrap load error.
    pub fn bootstrap<M: Into<String>>(message: M) -> Self {
        Self::BootstrapLoad {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::UnsupportedTld { .. } => "unsupported_tld",
            Self::DomainNotFound { .. } => "domain_not_found",
            Self::TooManyRedirects { .. } => "too_many_redirects",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::NetworkOrServer { .. } => "network_or_server",
            Self::BootstrapLoad { .. } => "bootstrap_load",
            Self::ConfigError { .. } => "config",
            Self::FileError { .. } => "file",
        }
    }

    /// Check if the registry authoritatively reported the domain as unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DomainNotFound { .. })
    }

    /// Check if the failure happened because no RDAP server serves the TLD.
    pub fn is_unsupported_tld(&self) -> bool {
        matches!(self, Self::UnsupportedTld { .. })
    }
}

impl fmt::Display for RdapLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { input, reason } => {
                write!(f, "Invalid input '{}': {}", input, reason)
            }
            Self::UnsupportedTld { tld } => {
                write!(f, "TLD '{}' is not supported by any known RDAP server", tld)
            }
            Self::DomainNotFound { domain, url } => {
                write!(f, "Domain '{}' not found (404 from {})", domain, url)
            }
            Self::TooManyRedirects {
                domain,
                limit,
                last_url,
            } => {
                write!(
                    f,
                    "Too many redirects for '{}' (limit {}, last URL {})",
                    domain, limit, last_url
                )
            }
            Self::InvalidResponse {
                domain,
                url,
                message,
            } => {
                write!(f, "Invalid RDAP response for '{}' from {}: {}", domain, url, message)
            }
            Self::NetworkOrServer {
                url,
                message,
                status_code,
                source,
            } => match (status_code, source) {
                (Some(code), _) => write!(f, "Server error from {} (HTTP {}): {}", url, code, message),
                (None, Some(source)) => {
                    write!(f, "Network error for {}: {} (source: {})", url, message, source)
                }
                (None, None) => write!(f, "Network error for {}: {}", url, message),
            },
            Self::BootstrapLoad { message } => {
                write!(f, "Failed to load RDAP bootstrap registry: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for RdapLookupError {}

impl From<std::io::Error> for RdapLookupError {
    fn from(err: std::io::Error) -> Self {
        Self::FileError {
            path: String::new(),
            message: format!("I/O error: {}", err),
        }
    }
}
