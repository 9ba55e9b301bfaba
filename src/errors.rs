//! Harness Error Hierarchy
//!
//! Errors are grouped by how a scenario failed, so a report can tell a broken
//! TLS setup apart from a consensus bug:
//! - setup: nodes that cannot be started, stopped or reset
//! - timeout: a log marker or protocol response that never arrived
//! - convergence: a committed write that is not observable everywhere
//!
//! Cleanup failures never surface here; they are logged and swallowed.

use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cluster or node failed to start, stop or reset
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// Expected log marker or protocol response missed its deadline
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// A write was committed but not observable on every node
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),

    /// Harness configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Infrastructure-level failures (I/O, commands, client transport)
    #[error(transparent)]
    System(#[from] SystemError),

    /// A scenario failed; carries the TLS variant that was active
    #[error("Scenario [{scenario}] failed: {source}")]
    Scenario {
        scenario: String,
        #[source]
        source: Box<Error>,
    },

    /// Unrecoverable harness misuse
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Node {node} failed to start: {reason}")]
    NodeStartFailed { node: String, reason: String },

    #[error("Node {node} failed to stop: {reason}")]
    NodeStopFailed { node: String, reason: String },

    /// Coordination endpoint never accepted a connection
    #[error("Node {node} ({addr}) did not become reachable within {timeout:?}")]
    NodeUnreachable {
        node: String,
        addr: String,
        timeout: Duration,
    },

    /// Persisted consensus state could not be removed
    #[error("Failed to clear consensus state of node {node} at {path}: {reason}")]
    StateNotCleared {
        node: String,
        path: PathBuf,
        reason: String,
    },

    /// Every failure observed while bringing the cluster up
    #[error("{} node(s) failed during cluster start: {}", .0.len(), join_errors(.0))]
    ClusterStartFailed(Vec<Error>),

    #[error("Unknown node: {0}")]
    UnknownNode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    #[error("Log line matching '{pattern}' not found on node {node} within {timeout:?} (look-back {look_back_lines} lines)")]
    LogMarker {
        node: String,
        pattern: String,
        look_back_lines: usize,
        timeout: Duration,
    },

    #[error("{operation} on node {node} timed out after {timeout:?}")]
    Protocol {
        node: String,
        operation: &'static str,
        timeout: Duration,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConvergenceError {
    /// Path created on the first node but missing elsewhere after sync
    #[error("Path {path} is not observable on node(s) [{}] after sync", .nodes.join(", "))]
    NotObservable { path: String, nodes: Vec<String> },

    #[error("Convergence probe requires at least one node")]
    NoNodes,
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("I/O error at path {path}: {source}")]
    PathError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Command exited unsuccessfully on a node
    #[error("Command {argv:?} on node {node} exited with {status}: {stderr}")]
    CommandFailed {
        node: String,
        argv: Vec<String>,
        status: String,
        stderr: String,
    },

    /// Coordination client transport failures
    #[error("Client {operation} on node {node} failed: {reason}")]
    Client {
        node: String,
        operation: &'static str,
        reason: String,
    },

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Scenario { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    pub fn is_convergence(&self) -> bool {
        match self {
            Error::Convergence(_) => true,
            Error::Scenario { source, .. } => source.is_convergence(),
            _ => false,
        }
    }

    pub fn is_setup(&self) -> bool {
        match self {
            Error::Setup(_) => true,
            Error::Scenario { source, .. } => source.is_setup(),
            _ => false,
        }
    }
}

fn join_errors(errors: &[Error]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

// ============== Conversion Implementations ============== //
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::System(SystemError::Io(e))
    }
}

impl From<JoinError> for Error {
    fn from(e: JoinError) -> Self {
        Error::System(SystemError::TaskFailed(e))
    }
}
