use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::async_task::run_bounded;
use crate::net::wait_until_reachable;
use crate::ClusterState;
use crate::Error;
use crate::Node;
use crate::NodeState;
use crate::Result;
use crate::SetupError;
use crate::TimeoutConfig;

/// Drives cluster-wide stop/start transitions.
///
/// The only component allowed to change a node's [`NodeState`].
pub struct ClusterLifecycleController {
    cluster: Arc<ClusterState>,
    timeouts: TimeoutConfig,
    pool_size: usize,
}

impl ClusterLifecycleController {
    /// The start pool defaults to one worker per node.
    pub fn new(
        cluster: Arc<ClusterState>,
        timeouts: TimeoutConfig,
    ) -> Self {
        let pool_size = cluster.len();
        Self {
            cluster,
            timeouts,
            pool_size,
        }
    }

    pub fn with_pool_size(
        mut self,
        pool_size: usize,
    ) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn cluster(&self) -> &Arc<ClusterState> {
        &self.cluster
    }

    /// Stops every node in order, then wipes each node's consensus state.
    ///
    /// A failing stop (including a node that is already down) is logged and
    /// the remaining nodes are still stopped. Failing to clear a state
    /// directory is fatal: a restart must never see a previous term, snapshot
    /// or peer-trust decision.
    pub async fn stop_all(&self) -> Result<()> {
        for node in self.cluster.nodes() {
            if let Err(e) = node.handle().stop().await {
                warn!("[{}] stop failed ({}), continuing", node.name(), e);
            }
            node.set_state(NodeState::Stopped);
        }

        let mut first_failure = None;
        for node in self.cluster.nodes() {
            if let Err(e) = self.clear_state(node).await {
                error!("{}", e);
                first_failure.get_or_insert(e);
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => {
                info!("all {} nodes stopped, consensus state cleared", self.cluster.len());
                Ok(())
            }
        }
    }

    /// Starts every node concurrently, then waits until each is reachable.
    ///
    /// Nodes are launched together so their peer handshakes overlap; a serial
    /// start would leave early nodes timing out on peers not yet launched.
    ///
    /// # Errors
    /// `SetupError::ClusterStartFailed` listing every node that failed to
    /// start or to become reachable.
    pub async fn start_all(&self) -> Result<()> {
        let nodes = self.cluster.nodes().to_vec();

        let started = run_bounded(self.pool_size, nodes.clone(), |node| async move {
            self.launch(&node).await
        })
        .await;

        // Nodes that did launch are still awaited, so none is left in `Starting`
        let mut failures = Vec::new();
        let mut launched = Vec::new();
        for (node, result) in nodes.into_iter().zip(started) {
            match result {
                Ok(()) => launched.push(node),
                Err(e) => failures.push(e),
            }
        }

        let reachable = run_bounded(self.pool_size, launched, |node| async move {
            self.await_reachable(&node).await
        })
        .await;
        failures.extend(reachable.into_iter().filter_map(|r| r.err()));

        if !failures.is_empty() {
            return Err(SetupError::ClusterStartFailed(failures).into());
        }

        info!("all {} nodes running", self.cluster.len());
        Ok(())
    }

    /// Starts a single node and waits until it is reachable.
    pub async fn start_one(
        &self,
        node: &Node,
    ) -> Result<()> {
        self.launch(node).await?;
        self.await_reachable(node).await
    }

    /// Harness teardown: stops every node, keeping whatever state is on disk.
    pub async fn shutdown(&self) {
        for node in self.cluster.nodes() {
            if let Err(e) = node.handle().stop().await {
                warn!("[{}] stop during shutdown failed: {}", node.name(), e);
            }
            node.set_state(NodeState::Stopped);
        }
        info!("cluster shut down");
    }

    async fn launch(
        &self,
        node: &Node,
    ) -> Result<()> {
        node.set_state(NodeState::Starting);
        debug!("[{}] starting", node.name());

        if let Err(e) = node.handle().start().await {
            node.set_state(NodeState::Failed);
            error!("[{}] start failed: {}", node.name(), e);
            return Err(match e {
                Error::Setup(_) => e,
                other => SetupError::NodeStartFailed {
                    node: node.name().to_string(),
                    reason: other.to_string(),
                }
                .into(),
            });
        }
        Ok(())
    }

    async fn await_reachable(
        &self,
        node: &Node,
    ) -> Result<()> {
        let result = wait_until_reachable(
            node.name(),
            node.endpoint(),
            self.timeouts.reachability_timeout(),
            self.timeouts.reachability_poll_interval(),
        )
        .await;

        match &result {
            Ok(()) => node.set_state(NodeState::Running),
            Err(e) => {
                error!("{}", e);
                node.set_state(NodeState::Failed);
            }
        }
        result
    }

    async fn clear_state(
        &self,
        node: &Node,
    ) -> Result<()> {
        let argv = vec![
            "rm".to_string(),
            "-rf".to_string(),
            node.state_dir().display().to_string(),
        ];
        node.handle().exec_command(&argv).await.map(|_| ()).map_err(|e| {
            SetupError::StateNotCleared {
                node: node.name().to_string(),
                path: node.state_dir().to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
