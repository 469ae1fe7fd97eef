//! Scoped connections
//!
//! A connection is opened for exactly one operation and disconnected on every
//! exit path, whether the operation succeeded, was rejected, or failed.

use super::config::ConnectionConfig;
use super::database::DataSource;
use super::error::Result;
use std::future::Future;
use std::pin::Pin;

/// Connect with `config`, run `f`, then always disconnect
///
/// # Example
/// ```ignore
/// let tables = with_source(&config, |source| {
///     Box::pin(async move { source.list_tables().await })
/// })
/// .await?;
/// ```
pub async fn with_source<F, T>(config: &ConnectionConfig, f: F) -> Result<T>
where
    F: for<'a> FnOnce(
            &'a dyn DataSource,
        ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>
        + Send,
    T: Send,
{
    let source = crate::backends::open(config).await?;
    let result = f(&*source).await;

    if let Err(e) = source.disconnect().await {
        tracing::warn!(error = %e, "disconnect failed");
    }
    result
}
