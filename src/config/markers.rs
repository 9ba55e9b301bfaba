use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::PEER_REJECTION_MARKER;
use crate::constants::PROBE_PATH;
use crate::constants::PROBE_PAYLOAD;
use crate::constants::READINESS_MARKER;
use crate::Error;
use crate::LogPattern;
use crate::Result;

/// Log lines the scenarios block on
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarkerConfig {
    /// Secure Raft listener started
    #[serde(default = "default_readiness")]
    pub readiness: String,

    /// Peer handshake refused; fragments separated by `.*`
    #[serde(default = "default_peer_rejection")]
    pub peer_rejection: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            readiness: default_readiness(),
            peer_rejection: default_peer_rejection(),
        }
    }
}

impl MarkerConfig {
    pub fn readiness_pattern(&self) -> LogPattern {
        LogPattern::new(&self.readiness)
    }

    pub fn peer_rejection_pattern(&self) -> LogPattern {
        LogPattern::new(&self.peer_rejection)
    }

    pub fn validate(&self) -> Result<()> {
        if self.readiness_pattern().is_empty() || self.peer_rejection_pattern().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "log markers cannot be empty".into(),
            )));
        }
        Ok(())
    }
}

/// The znode written by the convergence probe
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_path")]
    pub path: String,

    #[serde(default = "default_probe_payload")]
    pub payload: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            path: default_probe_path(),
            payload: default_probe_payload(),
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(Error::Config(ConfigError::Message(format!(
                "probe.path '{}' must be an absolute, non-root znode path",
                self.path
            ))));
        }
        if self.path.ends_with('/') {
            return Err(Error::Config(ConfigError::Message(format!(
                "probe.path '{}' must not end with '/'",
                self.path
            ))));
        }
        Ok(())
    }
}

fn default_readiness() -> String {
    READINESS_MARKER.into()
}
fn default_peer_rejection() -> String {
    PEER_REJECTION_MARKER.into()
}
fn default_probe_path() -> String {
    PROBE_PATH.into()
}
fn default_probe_payload() -> String {
    PROBE_PAYLOAD.into()
}
