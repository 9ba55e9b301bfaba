//! Coordination-protocol client seam.
//!
//! The harness never speaks the ZooKeeper wire protocol itself. It opens
//! sessions through a [`ClientConnector`] and issues the handful of calls the
//! convergence probe needs through [`CoordinationClient`]:
//!
//! ```ignore
//! let client = connector.connect(&node, Duration::from_secs(30)).await?;
//! client.create("/test_node", b"somedata1").await?;
//! client.sync("/test_node").await?;
//! assert!(client.exists("/test_node").await?);
//! client.close().await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Node;
use crate::Result;

/// A ZooKeeper-protocol session bound to one node
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CoordinationClient: Send + Sync {
    /// Creates a persistent znode at `path` holding `payload`
    async fn create(
        &self,
        path: &str,
        payload: &[u8],
    ) -> Result<()>;

    /// Whether `path` is visible to this session
    async fn exists(
        &self,
        path: &str,
    ) -> Result<bool>;

    /// Brings this session's view up to the leader's latest committed state for `path`
    async fn sync(
        &self,
        path: &str,
    ) -> Result<()>;

    /// Ends the session
    async fn close(&self) -> Result<()>;
}

/// Opens [`CoordinationClient`] sessions against cluster nodes
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClientConnector: Send + Sync + 'static {
    /// # Errors
    /// Implementations report transport failures as `SystemError::Client`.
    /// The caller bounds the whole call by `timeout` as well.
    async fn connect(
        &self,
        node: &Node,
        timeout: Duration,
    ) -> Result<Box<dyn CoordinationClient>>;
}
