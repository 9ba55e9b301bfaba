//! Write-then-sync-then-read convergence check across the cluster.


use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::async_task::with_timeout;
use crate::ClientConnector;
use crate::ConvergenceError;
use crate::CoordinationClient;
use crate::Node;
use crate::ProbeConfig;
use crate::Result;
use crate::TimeoutConfig;

/// Confirms that a write on the first node becomes visible on every node
/// once each session has synced.
///
/// Only run after the readiness marker was seen; it never overlaps cluster
/// startup.
pub struct ConvergenceProbe {
    connector: Arc<dyn ClientConnector>,
    probe: ProbeConfig,
    timeouts: TimeoutConfig,
}

/// Sessions opened so far, closed however the probe ends
struct OpenClients(Vec<(String, Box<dyn CoordinationClient>)>);

impl ConvergenceProbe {
    pub fn new(
        connector: Arc<dyn ClientConnector>,
        probe: ProbeConfig,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            connector,
            probe,
            timeouts,
        }
    }

    /// # Errors
    /// - `TimeoutError::Protocol` when a connect or round trip misses its deadline
    /// - `ConvergenceError::NotObservable` naming every node that cannot see the path
    pub async fn run(
        &self,
        nodes: &[Arc<Node>],
    ) -> Result<()> {
        if nodes.is_empty() {
            return Err(ConvergenceError::NoNodes.into());
        }

        let mut clients = OpenClients(Vec::with_capacity(nodes.len()));
        let result = self.check(nodes, &mut clients).await;
        self.close_all(clients).await;

        if result.is_ok() {
            info!("{} observable on all {} nodes", self.probe.path, nodes.len());
        }
        result
    }

    async fn check(
        &self,
        nodes: &[Arc<Node>],
        clients: &mut OpenClients,
    ) -> Result<()> {
        let connect_timeout = self.timeouts.client_connect_timeout();
        for node in nodes {
            let client = with_timeout(
                node.name(),
                "connect",
                connect_timeout,
                self.connector.connect(node, connect_timeout),
            )
            .await?;
            clients.0.push((node.name().to_string(), client));
        }

        let path = self.probe.path.as_str();
        let request_timeout = self.timeouts.client_request_timeout();

        let (writer_name, writer) = &clients.0[0];
        with_timeout(
            writer_name,
            "create",
            request_timeout,
            writer.create(path, self.probe.payload.as_bytes()),
        )
        .await?;
        debug!("created {} on {}", path, writer_name);

        for (name, client) in clients.0.iter().skip(1) {
            with_timeout(name, "sync", request_timeout, client.sync(path)).await?;
        }

        let mut missing = Vec::new();
        for (name, client) in &clients.0 {
            if !with_timeout(name, "exists", request_timeout, client.exists(path)).await? {
                warn!("{} not observable on {}", path, name);
                missing.push(name.clone());
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConvergenceError::NotObservable {
                path: path.to_string(),
                nodes: missing,
            }
            .into())
        }
    }

    /// Close failures are logged; they must not mask the probe's outcome.
    async fn close_all(
        &self,
        clients: OpenClients,
    ) {
        let request_timeout = self.timeouts.client_request_timeout();
        for (name, client) in clients.0 {
            if let Err(e) = with_timeout(&name, "close", request_timeout, client.close()).await {
                warn!("closing client on {} failed: {}", name, e);
            }
        }
    }
}
