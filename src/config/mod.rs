//! Configuration management for the secure Raft test harness.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`HARNESS__` prefix)
//! - Component-wise validation
mod cluster;
mod markers;
mod timeouts;
mod tls;
pub use cluster::*;
pub use markers::*;
pub use timeouts::*;
pub use tls::*;

use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for the harness
///
/// Combines all section configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct HarnessConfig {
    /// Cluster members under test
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// TLS template locations and placeholders
    #[serde(default)]
    pub tls: TlsConfig,
    /// Deadlines for every blocking wait
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Log markers the scenarios wait for
    #[serde(default)]
    pub markers: MarkerConfig,
    /// Convergence probe znode
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Debug for HarnessConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("cluster", &self.cluster)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl HarnessConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `HARNESS__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred so further overrides can be layered with
    /// `with_override_config()`. Callers MUST call `validate()` before use.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("HARNESS__TIMEOUTS__LOOK_BACK_LINES", "1000");
    /// let cfg = HarnessConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.cluster.validate()?;
        self.tls.validate()?;
        self.timeouts.validate()?;
        self.markers.validate()?;
        self.probe.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("HARNESS")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
