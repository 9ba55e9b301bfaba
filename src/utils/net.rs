use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;
use tracing::debug;
use tracing::trace;

use crate::Result;
use crate::SetupError;

pub(crate) async fn is_server_ready(addr: SocketAddr) -> bool {
    TcpStream::connect(addr).await.is_ok()
}

/// Polls `addr` until it accepts a TCP connection.
///
/// Only the process needs to be up; the consensus layer may still be
/// negotiating with its peers.
pub(crate) async fn wait_until_reachable(
    node: &str,
    addr: SocketAddr,
    timeout: Duration,
    retry_interval: Duration,
) -> Result<()> {
    let result = time::timeout(timeout, async {
        loop {
            if is_server_ready(addr).await {
                return;
            }
            trace!("Node({}) at {} not reachable yet, retrying...", node, addr);
            time::sleep(retry_interval).await;
        }
    })
    .await;

    match result {
        Ok(()) => {
            debug!("Node({}) at {} is reachable", node, addr);
            Ok(())
        }
        Err(_) => Err(SetupError::NodeUnreachable {
            node: node.to_string(),
            addr: addr.to_string(),
            timeout,
        }
        .into()),
    }
}
