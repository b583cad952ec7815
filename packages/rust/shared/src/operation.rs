//! The uniform async unit every fetcher and enricher implements.

use async_trait::async_trait;

use crate::error::Result;

/// An asynchronous operation: one input, one output, failing with
/// [`CamaraError`](crate::CamaraError).
///
/// Fetchers and enrichers are both operations, so the aggregator composes
/// them without knowing which is which.
#[async_trait]
pub trait Operation: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Stable name used in log fields and partial-failure reports.
    fn name(&self) -> &'static str;

    async fn run(&self, input: Self::Input) -> Result<Self::Output>;
}
