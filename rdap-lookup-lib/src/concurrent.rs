//! Batch fan-out for independent lookups.
//!
//! Each lookup in a batch is its own future; nothing is shared between them
//! except the read-only bootstrap registry. Results always come back in input
//! order, whichever lookup finished first.

use crate::error::RdapLookupError;
use crate::types::StandardizedRecord;
use futures::future::{join_all, try_join_all};
use std::future::Future;

/// How a batch reacts to a failing lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Run every lookup to completion and report each outcome
    #[default]
    CollectAll,
    /// Abort the batch on the first failure; in-flight lookups are dropped
    FailFast,
}

/// Outcome of one lookup within a batch.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// The input exactly as supplied
    pub input: String,
    pub result: Result<StandardizedRecord, RdapLookupError>,
}

impl BatchResult {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Await all tasks, keeping every outcome in input order.
pub async fn collect_all<I, F, T>(tasks: I) -> Vec<Result<T, RdapLookupError>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, RdapLookupError>>,
{
    join_all(tasks).await
}

/// Await all tasks, stopping at the first error.
pub async fn fail_fast<I, F, T>(tasks: I) -> Result<Vec<T>, RdapLookupError>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, RdapLookupError>>,
{
    try_join_all(tasks).await
}
