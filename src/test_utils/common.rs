use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::ClusterState;
use crate::Node;
use crate::NodeHandle;

pub(crate) const STATE_DIR: &str = "/var/lib/clickhouse/coordination";

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Listener standing in for a node's coordination endpoint
pub(crate) async fn bound_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// An address nothing listens on
pub(crate) async fn unused_addr() -> SocketAddr {
    let (listener, addr) = bound_listener().await;
    drop(listener);
    addr
}

pub(crate) fn node_with(
    name: &str,
    endpoint: SocketAddr,
    handle: impl NodeHandle,
) -> Node {
    Node::new(name, endpoint, STATE_DIR, Arc::new(handle))
}

pub(crate) fn cluster_of(nodes: Vec<Node>) -> Arc<ClusterState> {
    Arc::new(ClusterState::new(nodes).unwrap())
}
