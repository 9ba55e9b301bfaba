//! Entry point wiring configuration, nodes and the scenario runner together.
//!
//! ```ignore
//! let config = HarnessConfig::new()?.validate()?;
//! let harness = Harness::from_local_config(config, connector)?;
//! secure_raft_works(harness.runner()).await?;
//! secure_raft_works_with_password(harness.runner()).await?;
//! harness.shutdown().await;
//! ```

use std::sync::Arc;

use tracing::info;

use crate::ClientConnector;
use crate::ClusterState;
use crate::ConfigurationScenarioRunner;
use crate::Error;
use crate::HarnessConfig;
use crate::LocalNode;
use crate::Node;
use crate::NodeHandle;
use crate::Result;

pub struct Harness {
    cluster: Arc<ClusterState>,
    runner: ConfigurationScenarioRunner,
}

impl Harness {
    /// Builds the cluster from `config.cluster.nodes`, pairing each node with
    /// the handle at the same position in `handles`.
    ///
    /// Expects an already validated config.
    pub fn new(
        config: HarnessConfig,
        handles: Vec<Arc<dyn NodeHandle>>,
        connector: Arc<dyn ClientConnector>,
    ) -> Result<Self> {
        if handles.len() != config.cluster.nodes.len() {
            return Err(Error::Fatal(format!(
                "{} node handles for {} configured nodes",
                handles.len(),
                config.cluster.nodes.len()
            )));
        }

        let nodes = config
            .cluster
            .nodes
            .iter()
            .zip(handles)
            .map(|(node, handle)| Node::from_config(node, handle))
            .collect();
        let cluster = Arc::new(ClusterState::new(nodes)?);
        let runner = ConfigurationScenarioRunner::new(cluster.clone(), &config, connector);

        info!(
            "harness ready: {} nodes, observer {}",
            cluster.len(),
            cluster.observer().name()
        );
        Ok(Self { cluster, runner })
    }

    /// Every node must carry a `local` section; each becomes a [`LocalNode`].
    pub fn from_local_config(
        config: HarnessConfig,
        connector: Arc<dyn ClientConnector>,
    ) -> Result<Self> {
        let handles = config
            .cluster
            .nodes
            .iter()
            .map(|node| match &node.local {
                Some(local) => {
                    let handle: Arc<dyn NodeHandle> = Arc::new(
                        LocalNode::new(node.name.clone(), local)
                            .with_log_poll_interval(config.timeouts.log_poll_interval()),
                    );
                    Ok(handle)
                }
                None => Err(Error::Fatal(format!(
                    "node {} has no local launch settings",
                    node.name
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(config, handles, connector)
    }

    pub fn cluster(&self) -> &Arc<ClusterState> {
        &self.cluster
    }

    pub fn runner(&self) -> &ConfigurationScenarioRunner {
        &self.runner
    }

    /// Stops every node. Errors are logged, never returned.
    pub async fn shutdown(&self) {
        self.runner.lifecycle().shutdown().await;
    }
}
