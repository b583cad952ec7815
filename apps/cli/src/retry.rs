//! Bounded exponential backoff around remote calls.

use std::future::Future;
use std::time::Duration;

use camara_shared::{CamaraError, Result};
use tracing::warn;

const BASE_DELAY_MS: u64 = 1_000;
const MAX_DELAY_MS: u64 = 30_000;

/// `min(1000 * 2^attempt, 30000)` milliseconds.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(BASE_DELAY_MS.saturating_mul(factor).min(MAX_DELAY_MS))
}

/// Remote failures are retried; local ones (config, validation) are not.
fn is_retryable(error: &CamaraError) -> bool {
    matches!(
        error,
        CamaraError::Fetch { .. } | CamaraError::Network(_) | CamaraError::Generation(_)
    )
}

/// Run `op`, retrying up to `retries` more times on remote failures.
pub(crate) async fn with_retries<T, F, Fut>(retries: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retries && is_retryable(&e) => {
                let delay = backoff_delay(attempt);
                warn!(
                    error = %e,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "remote call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
