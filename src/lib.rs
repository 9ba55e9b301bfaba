//! Verification harness for mutual TLS on a coordination cluster's Raft
//! transport.
//!
//! The harness rewrites each node's TLS configuration (certificate pair and
//! optional key passphrase), restarts the cluster and checks the result:
//! valid configurations must yield a cluster that replicates a write to every
//! node; invalid ones must leave peers refusing each other's handshakes.
//!
//! Nodes are driven through [`NodeHandle`] and coordination sessions through
//! [`ClientConnector`], so the harness itself is independent of how the
//! servers are deployed.

mod client;
mod cluster;
mod config;
mod constants;
mod errors;
mod harness;
mod node;
mod probe;
mod scenario;
mod tls;
pub mod utils;

pub use client::*;
pub use cluster::*;
pub use self::config::*;
pub use errors::*;
pub use harness::*;
pub use node::*;
pub use probe::*;
pub use scenario::*;
pub use tls::*;
pub use utils::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
