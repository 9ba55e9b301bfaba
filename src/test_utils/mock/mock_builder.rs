use std::sync::Arc;

use crate::test_utils::unused_addr;
use crate::test_utils::STATE_DIR;
use crate::CoordinationClient;
use crate::MockClientConnector;
use crate::MockCoordinationClient;
use crate::MockNodeHandle;
use crate::Node;

/// Node whose handle must not be touched
pub(crate) async fn idle_node(name: &str) -> Arc<Node> {
    Arc::new(Node::new(name, unused_addr().await, STATE_DIR, Arc::new(MockNodeHandle::new())))
}

pub(crate) async fn idle_nodes(names: &[&str]) -> Vec<Arc<Node>> {
    let mut nodes = Vec::with_capacity(names.len());
    for name in names {
        nodes.push(idle_node(name).await);
    }
    nodes
}

/// Connector handing out one prepared client per node name, once each
pub(crate) fn connector_for(clients: Vec<(&str, Box<dyn CoordinationClient>)>) -> MockClientConnector {
    let mut connector = MockClientConnector::new();
    for (name, client) in clients {
        let expected = name.to_string();
        connector
            .expect_connect()
            .withf(move |node, _| node.name() == expected)
            .times(1)
            .return_once(move |_, _| Ok(client));
    }
    connector
}

/// Session on the writer node of a healthy cluster
pub(crate) fn writer_client(
    path: &'static str,
    payload: &'static [u8],
) -> MockCoordinationClient {
    let mut client = MockCoordinationClient::new();
    client
        .expect_create()
        .withf(move |p, data| p == path && data == payload)
        .times(1)
        .returning(|_, _| Ok(()));
    client.expect_sync().never();
    client.expect_exists().times(1).returning(|_| Ok(true));
    client.expect_close().times(1).returning(|| Ok(()));
    client
}

/// Session on a follower; `visible` is what `exists` reports after sync
pub(crate) fn follower_client(
    path: &'static str,
    visible: bool,
) -> MockCoordinationClient {
    let mut client = MockCoordinationClient::new();
    client.expect_create().never();
    client.expect_sync().withf(move |p| p == path).times(1).returning(|_| Ok(()));
    client.expect_exists().times(1).returning(move |_| Ok(visible));
    client.expect_close().times(1).returning(|| Ok(()));
    client
}

/// Handle accepting any number of stop / rm -rf / template writes.
/// `start` and `wait_for_log_line` are left to the caller.
pub(crate) fn reconfigurable_handle() -> MockNodeHandle {
    let mut handle = MockNodeHandle::new();
    handle.expect_stop().returning(|| Ok(()));
    handle.expect_exec_command().returning(|_| Ok(String::new()));
    handle.expect_copy_config_file().returning(|_, _| Ok(()));
    handle.expect_patch_config_file().returning(|_, _, _| Ok(()));
    handle
}
