//! Protocol implementations for RDAP lookups.
//!
//! This module contains the bootstrap registry, the HTTP transport, the RDAP
//! query engine and the response normalizer.

/// RDAP (Registration Data Access Protocol) query engine
pub mod rdap;

/// Bootstrap registry mapping TLDs to RDAP servers
pub mod registry;

/// HTTP transport abstraction
pub mod transport;

/// Mapping of raw RDAP JSON onto the standardized record
pub mod normalize;

// Re-export commonly used functions and types
pub use normalize::{normalize, normalize_status, parse_rdap_date};
pub use rdap::{domain_url, RdapClient};
pub use registry::BootstrapRegistry;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
