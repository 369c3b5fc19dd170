//! # RDAP Lookup Library
//!
//! A library for looking up domain registration data over RDAP and returning
//! it in one normalized shape, whichever registry answered.
//!
//! A lookup extracts the domain from the input, finds the TLD's RDAP servers
//! in the IANA bootstrap registry, queries them (following redirects and
//! referrals up to a bound) and normalizes the response.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rdap_lookup_lib::lookup_domain;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let record = lookup_domain("eib.org").await?;
//!
//!     println!("Domain: {} - Expires: {:?}", record.domain_name, record.expires_at);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Bootstrap Registry**: IANA snapshot compiled in, overridable from a file
//! - **Redirect Handling**: HTTP redirects and in-body referrals, bounded
//! - **Classified Errors**: every failure kind is a distinct variant
//! - **Normalization**: dates, registrar, registrant, nameservers, status
//! - **Batch Lookups**: concurrent fan-out with collect-all or fail-fast policy

// Re-export main public API types and functions
// This makes them available as rdap_lookup_lib::TypeName
pub use checker::RdapLookup;
pub use concurrent::{BatchPolicy, BatchResult};
pub use config::{
    load_env_config, parse_timeout_string, BootstrapConfig, ConfigManager, EnvConfig, FileConfig,
    OutputConfig, QueryConfig, MAX_REDIRECTS_LIMIT,
};
pub use error::RdapLookupError;
pub use protocols::{
    domain_url, normalize, normalize_status, parse_rdap_date, BootstrapRegistry, HttpResponse,
    HttpTransport, RdapClient, ReqwestTransport,
};
pub use types::{
    LookupConfig, ParsedDomain, RawRdapResponse, RegistrantInfo, RegistrarInfo,
    StandardizedRecord, DEFAULT_MAX_REDIRECTS,
};
pub use utils::{extract_domain, parse_domain_list, read_domain_file};

// Internal modules - these are not part of the public API
mod checker;
mod concurrent;
mod config;
mod error;
mod protocols;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RdapLookupError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Look up one domain with the embedded registry and default settings.
///
/// # Arguments
///
/// * `input` - A domain or URL (e.g., "eib.org", "https://www.eib.org/")
///
/// # Errors
///
/// Any [`RdapLookupError`] kind; see [`RdapLookup::lookup`].
pub async fn lookup_domain(input: &str) -> Result<StandardizedRecord> {
    RdapLookup::new()?.lookup(input).await
}
