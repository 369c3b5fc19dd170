//! Main lookup service.
//!
//! This module provides the `RdapLookup` struct that ties the pipeline
//! together: extract the domain, find its RDAP servers, query them and
//! normalize the answer.

use crate::concurrent::{collect_all, fail_fast, BatchPolicy, BatchResult};
use crate::error::RdapLookupError;
use crate::protocols::{normalize, BootstrapRegistry, RdapClient};
use crate::types::{LookupConfig, StandardizedRecord};
use crate::utils::extract_domain;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// Lookup service holding the bootstrap registry and the RDAP client.
///
/// The service keeps no per-lookup state; one instance can run any number
/// of lookups concurrently.
///
/// # Example
///
/// ```rust,no_run
/// use rdap_lookup_lib::RdapLookup;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let lookup = RdapLookup::new()?;
///     let record = lookup.lookup("eib.org").await?;
///     println!("Registrar: {:?}", record.registrar);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RdapLookup {
    config: LookupConfig,
    registry: Arc<BootstrapRegistry>,
    client: RdapClient,
}

impl RdapLookup {
    /// Create a lookup service with the embedded registry and default settings.
    pub fn new() -> Result<Self, RdapLookupError> {
        Self::with_config(LookupConfig::default())
    }

    /// Create a lookup service with custom configuration.
    ///
    /// The registry comes from `config.bootstrap_file` when set, otherwise
    /// from the embedded snapshot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rdap_lookup_lib::{LookupConfig, RdapLookup};
    /// use std::time::Duration;
    ///
    /// let config = LookupConfig::default()
    ///     .with_max_redirects(3)
    ///     .with_timeout(Duration::from_secs(10));
    ///
    /// let lookup = RdapLookup::with_config(config).unwrap();
    /// assert_eq!(lookup.config().max_redirects, 3);
    /// ```
    pub fn with_config(config: LookupConfig) -> Result<Self, RdapLookupError> {
        let registry = match &config.bootstrap_file {
            Some(path) => Arc::new(BootstrapRegistry::from_file(path)?),
            None => BootstrapRegistry::shared()?,
        };
        let client = RdapClient::with_config(&config)?;

        Ok(Self {
            config,
            registry,
            client,
        })
    }

    /// Assemble a lookup service from an existing registry and client.
    pub fn with_parts(registry: Arc<BootstrapRegistry>, client: RdapClient) -> Self {
        let config = LookupConfig::default().with_max_redirects(client.max_redirects());
        Self {
            config,
            registry,
            client,
        }
    }

    /// Look up one domain.
    ///
    /// # Arguments
    ///
    /// * `input` - A domain or URL (e.g., "eib.org", "https://www.eib.org/en")
    ///
    /// # Errors
    ///
    /// `InvalidInput` and `UnsupportedTld` are raised before any request is
    /// made; see [`RdapClient::query`] for the network-side errors.
    pub async fn lookup(&self, input: &str) -> Result<StandardizedRecord, RdapLookupError> {
        let parsed = extract_domain(input)?;
        let (key, servers) = self.registry.servers_for_domain(&parsed)?;
        debug!(domain = %parsed.domain, tld = %key, servers = servers.len(), "Resolved RDAP servers");

        let raw = self.client.query(&parsed.domain, servers).await?;
        Ok(normalize(&parsed.domain, &raw))
    }

    /// Look up several domains concurrently, reporting every outcome.
    ///
    /// Results are in input order.
    pub async fn lookup_all(&self, inputs: &[String]) -> Vec<BatchResult> {
        let results = collect_all(inputs.iter().map(|input| self.lookup(input))).await;

        inputs
            .iter()
            .cloned()
            .zip(results)
            .map(|(input, result)| BatchResult { input, result })
            .collect()
    }

    /// Look up several domains concurrently, failing on the first error.
    ///
    /// Lookups still in flight when an error arrives are cancelled.
    pub async fn try_lookup_all(
        &self,
        inputs: &[String],
    ) -> Result<Vec<StandardizedRecord>, RdapLookupError> {
        fail_fast(inputs.iter().map(|input| self.lookup(input))).await
    }

    /// Run a batch under the given policy.
    ///
    /// With `CollectAll` this never fails; with `FailFast` the first error is
    /// returned instead of the per-input results.
    pub async fn lookup_batch(
        &self,
        inputs: &[String],
        policy: BatchPolicy,
    ) -> Result<Vec<BatchResult>, RdapLookupError> {
        match policy {
            BatchPolicy::CollectAll => Ok(self.lookup_all(inputs).await),
            BatchPolicy::FailFast => {
                let records = self.try_lookup_all(inputs).await?;
                Ok(inputs
                    .iter()
                    .cloned()
                    .zip(records)
                    .map(|(input, record)| BatchResult {
                        input,
                        result: Ok(record),
                    })
                    .collect())
            }
        }
    }

    /// Look up domains one after another, yielding each outcome as it lands.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use futures::StreamExt;
    /// use rdap_lookup_lib::RdapLookup;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let lookup = RdapLookup::new()?;
    ///     let domains = vec!["eib.org".to_string(), "example.com".to_string()];
    ///
    ///     let mut stream = lookup.lookup_stream(&domains);
    ///     while let Some(entry) = stream.next().await {
    ///         match entry.result {
    ///             Ok(record) => println!("{}: {:?}", entry.input, record.expires_at),
    ///             Err(e) => println!("{}: {}", entry.input, e),
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn lookup_stream(
        &self,
        inputs: &[String],
    ) -> Pin<Box<dyn Stream<Item = BatchResult> + Send + '_>> {
        let inputs = inputs.to_vec();
        let stream = futures::stream::iter(inputs).then(move |input| async move {
            let result = self.lookup(&input).await;
            BatchResult { input, result }
        });

        Box::pin(stream)
    }

    /// The registry this service resolves TLDs with.
    pub fn registry(&self) -> &BootstrapRegistry {
        &self.registry
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }
}
