use std::future::Future;
use std::time::Duration;

use futures::stream;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::warn;

use crate::Result;
use crate::TimeoutError;

/// Runs `task` for every item with at most `pool_size` in flight.
///
/// Every outcome is returned in input order; one failure never cancels or
/// hides its siblings.
pub(crate) async fn run_bounded<I, T, F, Fut>(
    pool_size: usize,
    items: Vec<I>,
    task: F,
) -> Vec<Result<T>>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut indexed: Vec<(usize, Result<T>)> = stream::iter(items.into_iter().enumerate())
        .map(|(i, item)| {
            let fut = task(item);
            async move { (i, fut.await) }
        })
        .buffer_unordered(pool_size.max(1))
        .collect()
        .await;

    indexed.sort_by_key(|(i, _)| *i);
    indexed.into_iter().map(|(_, r)| r).collect()
}

/// Bounds one coordination round trip. Elapsing is a timeout error, never retried.
pub(crate) async fn with_timeout<T, Fut>(
    node: &str,
    operation: &'static str,
    duration: Duration,
    fut: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match timeout(duration, fut).await {
        Ok(r) => r,
        Err(_) => {
            warn!("{} on node {} timed out after {:?}", operation, node, duration);
            Err(TimeoutError::Protocol {
                node: node.to_string(),
                operation,
                timeout: duration,
            }
            .into())
        }
    }
}
