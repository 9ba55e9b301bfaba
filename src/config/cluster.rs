use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::COORDINATION_STATE_DIR;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    /// Cluster members; the first one is the log observer
    #[serde(default = "default_nodes")]
    pub nodes: Vec<NodeConfig>,

    /// Size of the node start pool. 0 means one worker per node.
    #[serde(default)]
    pub start_parallelism: usize,
}

/// One cluster member
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NodeConfig {
    pub name: String,

    /// Coordination (client protocol) endpoint, probed for reachability
    pub endpoint: SocketAddr,

    /// Persisted consensus log/snapshot directory on the node
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Launch settings when the node runs as a local process
    #[serde(default)]
    pub local: Option<LocalNodeConfig>,
}

/// Settings for [`crate::LocalNode`]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocalNodeConfig {
    /// Directory that stands in for the node's filesystem root
    pub root_dir: PathBuf,

    /// File receiving the node process' stdout and stderr
    pub log_file: PathBuf,

    /// Program and arguments launching the coordination server
    pub start_command: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            start_parallelism: 0,
        }
    }
}

impl ClusterConfig {
    /// Validates cluster configuration consistency
    /// # Errors
    /// Returns `Error::Config` when the node list is empty, names or endpoints
    /// repeat, or a local launch command is empty.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(invalid("cluster.nodes must contain at least one node".into()));
        }

        let mut names = HashSet::new();
        let mut endpoints = HashSet::new();
        for node in &self.nodes {
            if node.name.trim().is_empty() {
                return Err(invalid("node name cannot be empty".into()));
            }
            if !names.insert(node.name.as_str()) {
                return Err(invalid(format!("Duplicate node name {}", node.name)));
            }
            if !endpoints.insert(node.endpoint) {
                return Err(invalid(format!(
                    "Duplicate endpoint {} (node {})",
                    node.endpoint, node.name
                )));
            }
            if node.endpoint.port() == 0 {
                return Err(invalid(format!(
                    "Node {} endpoint must specify a non-zero port",
                    node.name
                )));
            }
            if node.state_dir.as_os_str().is_empty() {
                return Err(invalid(format!("Node {} state_dir cannot be empty", node.name)));
            }
            if let Some(local) = &node.local {
                if local.start_command.is_empty() {
                    return Err(invalid(format!(
                        "Node {} local.start_command cannot be empty",
                        node.name
                    )));
                }
            }
        }

        Ok(())
    }
}

fn invalid(msg: String) -> Error {
    Error::Config(ConfigError::Message(msg))
}

fn default_nodes() -> Vec<NodeConfig> {
    (1..=3)
        .map(|i| NodeConfig {
            name: format!("node{i}"),
            endpoint: SocketAddr::from(([127, 0, 0, 1], 9180 + i)),
            state_dir: default_state_dir(),
            local: None,
        })
        .collect()
}
fn default_state_dir() -> PathBuf {
    PathBuf::from(COORDINATION_STATE_DIR)
}
