use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_LOOK_BACK_LINES;
use crate::Error;
use crate::Result;

/// Deadlines for every blocking wait in a scenario. None of them is retried.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TimeoutConfig {
    /// Max wait for a node's coordination endpoint to accept connections
    #[serde(default = "default_reachability_timeout_ms")]
    pub reachability_timeout_ms: u64,

    /// Delay between reachability attempts
    #[serde(default = "default_reachability_poll_interval_ms")]
    pub reachability_poll_interval_ms: u64,

    /// Max wait for a log marker to appear
    #[serde(default = "default_log_marker_timeout_ms")]
    pub log_marker_timeout_ms: u64,

    /// Delay between log scans
    #[serde(default = "default_log_poll_interval_ms")]
    pub log_poll_interval_ms: u64,

    /// Trailing log lines scanned for a marker
    #[serde(default = "default_look_back_lines")]
    pub look_back_lines: usize,

    /// Max wait for a coordination client session to be established
    #[serde(default = "default_client_connect_timeout_ms")]
    pub client_connect_timeout_ms: u64,

    /// Max wait for one create/sync/exists/close round trip
    #[serde(default = "default_client_request_timeout_ms")]
    pub client_request_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            reachability_timeout_ms: default_reachability_timeout_ms(),
            reachability_poll_interval_ms: default_reachability_poll_interval_ms(),
            log_marker_timeout_ms: default_log_marker_timeout_ms(),
            log_poll_interval_ms: default_log_poll_interval_ms(),
            look_back_lines: default_look_back_lines(),
            client_connect_timeout_ms: default_client_connect_timeout_ms(),
            client_request_timeout_ms: default_client_request_timeout_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn reachability_timeout(&self) -> Duration {
        Duration::from_millis(self.reachability_timeout_ms)
    }

    pub fn reachability_poll_interval(&self) -> Duration {
        Duration::from_millis(self.reachability_poll_interval_ms)
    }

    pub fn log_marker_timeout(&self) -> Duration {
        Duration::from_millis(self.log_marker_timeout_ms)
    }

    pub fn log_poll_interval(&self) -> Duration {
        Duration::from_millis(self.log_poll_interval_ms)
    }

    pub fn client_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.client_connect_timeout_ms)
    }

    pub fn client_request_timeout(&self) -> Duration {
        Duration::from_millis(self.client_request_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let deadlines = [
            ("reachability_timeout_ms", self.reachability_timeout_ms),
            ("log_marker_timeout_ms", self.log_marker_timeout_ms),
            ("client_connect_timeout_ms", self.client_connect_timeout_ms),
            ("client_request_timeout_ms", self.client_request_timeout_ms),
        ];
        for (name, value) in deadlines {
            if value == 0 {
                return Err(Error::Config(ConfigError::Message(format!(
                    "timeouts.{name} must be greater than 0"
                ))));
            }
        }

        if self.reachability_poll_interval_ms >= self.reachability_timeout_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "reachability_poll_interval_ms ({}) must be below reachability_timeout_ms ({})",
                self.reachability_poll_interval_ms, self.reachability_timeout_ms
            ))));
        }

        if self.log_poll_interval_ms >= self.log_marker_timeout_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "log_poll_interval_ms ({}) must be below log_marker_timeout_ms ({})",
                self.log_poll_interval_ms, self.log_marker_timeout_ms
            ))));
        }

        if self.look_back_lines == 0 {
            return Err(Error::Config(ConfigError::Message(
                "timeouts.look_back_lines must be greater than 0".into(),
            )));
        }

        Ok(())
    }
}

fn default_reachability_timeout_ms() -> u64 {
    60_000
}
fn default_reachability_poll_interval_ms() -> u64 {
    500
}
fn default_log_marker_timeout_ms() -> u64 {
    30_000
}
fn default_log_poll_interval_ms() -> u64 {
    200
}
fn default_look_back_lines() -> usize {
    DEFAULT_LOOK_BACK_LINES
}
fn default_client_connect_timeout_ms() -> u64 {
    30_000
}
fn default_client_request_timeout_ms() -> u64 {
    10_000
}
