//! The cluster under test, shared by every harness component.
//!
//! One [`ClusterState`] is built at harness setup and handed out as
//! `Arc<ClusterState>`. Nodes are reused across scenarios; only the
//! [`ClusterLifecycleController`] changes their lifecycle state.

mod lifecycle;
pub use lifecycle::*;

use std::collections::HashSet;
use std::sync::Arc;

use config::ConfigError;

use crate::Error;
use crate::Node;
use crate::NodeState;
use crate::Result;
use crate::SetupError;

#[derive(Debug)]
pub struct ClusterState {
    nodes: Vec<Arc<Node>>,
}

impl ClusterState {
    /// # Errors
    /// Fails when `nodes` is empty or two nodes share a name.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "cluster must contain at least one node".into(),
            )));
        }

        let mut names = HashSet::new();
        for node in &nodes {
            if !names.insert(node.name().to_string()) {
                return Err(Error::Config(ConfigError::Message(format!(
                    "Duplicate node name {}",
                    node.name()
                ))));
            }
        }

        Ok(Self {
            nodes: nodes.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node whose log is watched for scenario markers
    pub fn observer(&self) -> &Arc<Node> {
        &self.nodes[0]
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Result<&Arc<Node>> {
        self.nodes
            .iter()
            .find(|n| n.name() == name)
            .ok_or_else(|| SetupError::UnknownNode(name.to_string()).into())
    }

    /// Snapshot of every node's lifecycle state, in cluster order
    pub fn states(&self) -> Vec<(String, NodeState)> {
        self.nodes.iter().map(|n| (n.name().to_string(), n.state())).collect()
    }

    pub fn all_in(
        &self,
        state: NodeState,
    ) -> bool {
        self.nodes.iter().all(|n| n.state() == state)
    }
}
