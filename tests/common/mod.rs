//! In-memory stand-in for a three-node coordination cluster.
//!
//! Every simulated node keeps its files, log and replicated znodes in a shared
//! [`SimWorld`]. Starting a node binds a real TCP listener on its endpoint, so
//! reachability checks go through the network stack. The node then reads its
//! TLS config the way the real server does: the Raft listener always comes
//! up, but a private key that cannot be loaded makes every peer handshake fail.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use keeper_tls_harness::ClientConnector;
use keeper_tls_harness::CoordinationClient;
use keeper_tls_harness::Harness;
use keeper_tls_harness::HarnessConfig;
use keeper_tls_harness::LogPattern;
use keeper_tls_harness::Node;
use keeper_tls_harness::NodeHandle;
use keeper_tls_harness::Result;
use keeper_tls_harness::SystemError;
use keeper_tls_harness::TimeoutConfig;
use keeper_tls_harness::TimeoutError;
use parking_lot::Mutex;
use tokio::time;

pub const STATE_DIR: &str = "/var/lib/clickhouse/coordination";
pub const TLS_CONFIG: &str = "/etc/clickhouse-server/config.d/ssl_conf.yml";
pub const READINESS_LINE: &str = "<Information> RaftInstance: Raft ASIO listener initiated on :::9234, SSL enabled";

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for integration test.");
}

pub fn get_available_ports(count: usize) -> Vec<u16> {
    let mut ports = Vec::new();
    let mut listeners = Vec::new();

    for _ in 0..count {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        ports.push(listener.local_addr().unwrap().port());
        listeners.push(listener);
    }
    ports
}

#[derive(Default)]
pub struct SimNodeState {
    pub endpoint: Option<SocketAddr>,
    listener: Option<TcpListener>,
    pub files: BTreeMap<PathBuf, String>,
    pub log: Vec<String>,
    pub znodes: BTreeMap<String, Vec<u8>>,
    pub state_dir_exists: bool,
    pub key_loaded: bool,
    pub starts: usize,
    pub commands: Vec<Vec<String>>,
    /// Never receives replicated writes
    pub lagging: bool,
    refused_peers: HashSet<String>,
}

impl SimNodeState {
    pub fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    fn healthy(&self) -> bool {
        self.is_running() && self.key_loaded
    }
}

/// Every simulated node, in cluster order
#[derive(Default)]
pub struct SimWorld {
    pub nodes: Vec<(String, SimNodeState)>,
}

impl SimWorld {
    pub fn node(
        &self,
        name: &str,
    ) -> &SimNodeState {
        &self.nodes.iter().find(|(n, _)| n == name).unwrap().1
    }

    fn node_mut(
        &mut self,
        name: &str,
    ) -> &mut SimNodeState {
        &mut self.nodes.iter_mut().find(|(n, _)| n == name).unwrap().1
    }

    /// One round of outbound peer connections from `name`
    fn connect_peers(
        &mut self,
        name: &str,
    ) {
        if !self.node(name).is_running() {
            return;
        }
        let self_ok = self.node(name).key_loaded;
        let failed: Vec<(usize, String, Option<SocketAddr>)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, (peer, state))| peer != name && !(self_ok && state.healthy()))
            .map(|(i, (peer, state))| (i + 1, peer.clone(), state.endpoint))
            .collect();

        let node = self.node_mut(name);
        for (id, peer, endpoint) in failed {
            if node.refused_peers.insert(peer) {
                let addr = endpoint.map(|e| e.to_string()).unwrap_or_default();
                node.log.push(format!(
                    "<Warning> RaftInstance: failed to connect to peer {id} ({addr}): Connection refused"
                ));
            }
        }
    }

    fn quorum(&self) -> bool {
        let healthy = self.nodes.iter().filter(|(_, s)| s.healthy()).count();
        healthy * 2 > self.nodes.len()
    }
}

/// Whether the server could load the private key named by `tls_config`
fn key_loads(tls_config: &str) -> bool {
    if tls_config.contains("WithoutPassPhrase.key") {
        return true;
    }
    tls_config.contains("WithPassPhrase.key") && configured_passphrase(tls_config) == Some("test")
}

fn configured_passphrase(tls_config: &str) -> Option<&str> {
    if !tls_config.contains("privateKeyPassphraseHandler") {
        return None;
    }
    let start = tls_config.find("password: '")? + "password: '".len();
    let len = tls_config[start..].find('\'')?;
    Some(&tls_config[start..start + len])
}

pub struct SimNode {
    name: String,
    world: Arc<Mutex<SimWorld>>,
}

impl SimNode {
    pub fn new(
        name: &str,
        endpoint: SocketAddr,
        world: Arc<Mutex<SimWorld>>,
    ) -> Self {
        world.lock().nodes.push((
            name.to_string(),
            SimNodeState {
                endpoint: Some(endpoint),
                ..Default::default()
            },
        ));
        Self {
            name: name.to_string(),
            world,
        }
    }
}

#[async_trait]
impl NodeHandle for SimNode {
    async fn copy_config_file(
        &self,
        local_path: &Path,
        remote_path: &Path,
    ) -> Result<()> {
        let content = tokio::fs::read_to_string(local_path).await?;
        self.world
            .lock()
            .node_mut(&self.name)
            .files
            .insert(remote_path.to_path_buf(), content);
        Ok(())
    }

    async fn patch_config_file(
        &self,
        remote_path: &Path,
        find: &str,
        replace: &str,
    ) -> Result<()> {
        let mut world = self.world.lock();
        match world.node_mut(&self.name).files.get_mut(remote_path) {
            Some(content) => {
                *content = content.replace(find, replace);
                Ok(())
            }
            None => Err(SystemError::PathError {
                path: remote_path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .into()),
        }
    }

    async fn exec_command(
        &self,
        argv: &[String],
    ) -> Result<String> {
        let mut world = self.world.lock();
        let node = world.node_mut(&self.name);
        node.commands.push(argv.to_vec());

        if argv.len() == 3 && argv[0] == "rm" && argv[1] == "-rf" && argv[2] == STATE_DIR {
            node.state_dir_exists = false;
            node.znodes.clear();
            return Ok(String::new());
        }
        Err(SystemError::CommandFailed {
            node: self.name.clone(),
            argv: argv.to_vec(),
            status: "exit status: 127".to_string(),
            stderr: "command not found".to_string(),
        }
        .into())
    }

    async fn start(&self) -> Result<()> {
        let mut world = self.world.lock();
        let node = world.node_mut(&self.name);
        if node.is_running() {
            return Ok(());
        }
        let endpoint = node.endpoint.unwrap();
        node.listener = Some(TcpListener::bind(endpoint)?);
        node.starts += 1;
        node.state_dir_exists = true;
        node.refused_peers.clear();
        node.key_loaded = node.files.get(Path::new(TLS_CONFIG)).map(|c| key_loads(c)).unwrap_or(false);
        node.log.push(READINESS_LINE.to_string());
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.world.lock().node_mut(&self.name).listener = None;
        Ok(())
    }

    async fn wait_for_log_line(
        &self,
        pattern: &LogPattern,
        look_back_lines: usize,
        timeout: Duration,
    ) -> Result<()> {
        let found = time::timeout(timeout, async {
            loop {
                {
                    let mut world = self.world.lock();
                    world.connect_peers(&self.name);
                    let log = world.node(&self.name).log.join("\n");
                    if pattern.scan_recent(&log, look_back_lines) {
                        return;
                    }
                }
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        found.map_err(|_| {
            TimeoutError::LogMarker {
                node: self.name.clone(),
                pattern: pattern.to_string(),
                look_back_lines,
                timeout,
            }
            .into()
        })
    }
}

/// Opens sessions on running simulated nodes and counts them
pub struct SimConnector {
    world: Arc<Mutex<SimWorld>>,
    pub connects: Arc<AtomicUsize>,
}

impl SimConnector {
    pub fn new(world: Arc<Mutex<SimWorld>>) -> Self {
        Self {
            world,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ClientConnector for SimConnector {
    async fn connect(
        &self,
        node: &Node,
        _timeout: Duration,
    ) -> Result<Box<dyn CoordinationClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.world.lock().node(node.name()).is_running() {
            return Err(SystemError::Client {
                node: node.name().to_string(),
                operation: "connect",
                reason: "Connection refused".to_string(),
            }
            .into());
        }
        Ok(Box::new(SimClient {
            node: node.name().to_string(),
            world: self.world.clone(),
        }))
    }
}

pub struct SimClient {
    node: String,
    world: Arc<Mutex<SimWorld>>,
}

#[async_trait]
impl CoordinationClient for SimClient {
    async fn create(
        &self,
        path: &str,
        payload: &[u8],
    ) -> Result<()> {
        {
            let mut world = self.world.lock();
            if world.node(&self.node).znodes.contains_key(path) {
                return Err(SystemError::Client {
                    node: self.node.clone(),
                    operation: "create",
                    reason: format!("Node exists: {path}"),
                }
                .into());
            }
            if world.quorum() {
                for (_, state) in world.nodes.iter_mut() {
                    if state.healthy() && !state.lagging {
                        state.znodes.insert(path.to_string(), payload.to_vec());
                    }
                }
                return Ok(());
            }
        }
        // Without a quorum the write is never acknowledged
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn exists(
        &self,
        path: &str,
    ) -> Result<bool> {
        Ok(self.world.lock().node(&self.node).znodes.contains_key(path))
    }

    async fn sync(
        &self,
        _path: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

pub struct SimCluster {
    pub harness: Harness,
    pub world: Arc<Mutex<SimWorld>>,
    pub connects: Arc<AtomicUsize>,
}

pub fn test_timeouts() -> TimeoutConfig {
    TimeoutConfig {
        reachability_timeout_ms: 2_000,
        reachability_poll_interval_ms: 20,
        log_marker_timeout_ms: 1_000,
        log_poll_interval_ms: 20,
        client_connect_timeout_ms: 500,
        client_request_timeout_ms: 300,
        ..Default::default()
    }
}

/// Three simulated nodes on free ports, wired into a validated harness
pub fn sim_cluster() -> SimCluster {
    let ports = get_available_ports(3);
    let mut config = HarnessConfig {
        timeouts: test_timeouts(),
        ..Default::default()
    };
    for (node, port) in config.cluster.nodes.iter_mut().zip(&ports) {
        node.endpoint = SocketAddr::from(([127, 0, 0, 1], *port));
    }
    let config = config.validate().unwrap();

    let world = Arc::new(Mutex::new(SimWorld::default()));
    let handles: Vec<Arc<dyn NodeHandle>> = config
        .cluster
        .nodes
        .iter()
        .map(|node| Arc::new(SimNode::new(&node.name, node.endpoint, world.clone())) as Arc<dyn NodeHandle>)
        .collect();
    let connector = SimConnector::new(world.clone());
    let connects = connector.connects.clone();

    let harness = Harness::new(config, handles, Arc::new(connector)).unwrap();
    SimCluster {
        harness,
        world,
        connects,
    }
}
