//! Cluster members as seen by the harness.
//!
//! A [`Node`] pairs the member's identity (name, coordination endpoint,
//! consensus state directory) and its lifecycle state with the
//! [`NodeHandle`] used to drive it. Whatever actually runs the server
//! (a container runtime, a local process) lives behind that trait.

mod local_node;
pub use local_node::*;

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use parking_lot::RwLock;

use crate::LogPattern;
use crate::NodeConfig;
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NodeHandle: Send + Sync + 'static {
    /// Copies a file from the harness host onto the node
    async fn copy_config_file(
        &self,
        local_path: &Path,
        remote_path: &Path,
    ) -> Result<()>;

    /// Replaces every occurrence of `find` with `replace` in a node file
    async fn patch_config_file(
        &self,
        remote_path: &Path,
        find: &str,
        replace: &str,
    ) -> Result<()>;

    /// Runs `argv` on the node and returns its stdout
    ///
    /// # Errors
    /// A non-zero exit is reported as `SystemError::CommandFailed`.
    async fn exec_command(
        &self,
        argv: &[String],
    ) -> Result<String>;

    /// Launches the coordination server process
    async fn start(&self) -> Result<()>;

    /// Stops the coordination server process. Stopping a stopped node is a no-op.
    async fn stop(&self) -> Result<()>;

    /// Blocks until one of the last `look_back_lines` log lines matches `pattern`
    ///
    /// # Errors
    /// `TimeoutError::LogMarker` once `timeout` elapses without a match.
    async fn wait_for_log_line(
        &self,
        pattern: &LogPattern,
        look_back_lines: usize,
        timeout: Duration,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Stopped,
    Starting,
    Running,
    Failed,
}

impl fmt::Display for NodeState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            NodeState::Stopped => "Stopped",
            NodeState::Starting => "Starting",
            NodeState::Running => "Running",
            NodeState::Failed => "Failed",
        };
        f.write_str(s)
    }
}

pub struct Node {
    name: String,
    endpoint: SocketAddr,
    state_dir: PathBuf,
    handle: Arc<dyn NodeHandle>,
    /// Written only by the lifecycle controller
    state: RwLock<NodeState>,
}

impl Node {
    /// Nodes begin `Stopped`; the first `start_all` brings them up.
    pub fn new(
        name: impl Into<String>,
        endpoint: SocketAddr,
        state_dir: impl Into<PathBuf>,
        handle: Arc<dyn NodeHandle>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint,
            state_dir: state_dir.into(),
            handle,
            state: RwLock::new(NodeState::Stopped),
        }
    }

    pub fn from_config(
        config: &NodeConfig,
        handle: Arc<dyn NodeHandle>,
    ) -> Self {
        Self::new(
            config.name.clone(),
            config.endpoint,
            config.state_dir.clone(),
            handle,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn handle(&self) -> &Arc<dyn NodeHandle> {
        &self.handle
    }

    pub fn state(&self) -> NodeState {
        *self.state.read()
    }

    pub(crate) fn set_state(
        &self,
        state: NodeState,
    ) {
        *self.state.write() = state;
    }
}

impl fmt::Debug for Node {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("state_dir", &self.state_dir)
            .field("state", &self.state())
            .finish()
    }
}
