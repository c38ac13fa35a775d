use anyhow::{Result, anyhow};
use std::time::Duration;

/// Run a blocking call on the blocking pool, giving up after `timeout`.
///
/// The call itself cannot be interrupted; on timeout it keeps running in the
/// background and its result is dropped.
pub async fn run_with_timeout<T, F>(timeout: Duration, f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(f);

    match tokio::time::timeout(timeout, handle).await {
        Ok(joined) => joined.map_err(|e| anyhow!("Blocking task failed: {}", e)),
        Err(_) => Err(anyhow!("Timed out after {:?}", timeout)),
    }
}
