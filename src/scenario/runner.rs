use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::ClientConnector;
use crate::ClusterLifecycleController;
use crate::ClusterState;
use crate::ConvergenceProbe;
use crate::Error;
use crate::ExpectedOutcome;
use crate::HarnessConfig;
use crate::LogPattern;
use crate::Node;
use crate::Result;
use crate::Scenario;
use crate::TimeoutConfig;
use crate::TlsConfigurationApplier;
use crate::TlsVariant;

/// Drives one certificate scenario at a time against the shared cluster.
pub struct ConfigurationScenarioRunner {
    cluster: Arc<ClusterState>,
    lifecycle: ClusterLifecycleController,
    applier: TlsConfigurationApplier,
    probe: ConvergenceProbe,
    readiness: LogPattern,
    peer_rejection: LogPattern,
    timeouts: TimeoutConfig,
    /// Scenarios share one cluster and must never interleave
    gate: Mutex<()>,
}

impl ConfigurationScenarioRunner {
    pub fn new(
        cluster: Arc<ClusterState>,
        config: &HarnessConfig,
        connector: Arc<dyn ClientConnector>,
    ) -> Self {
        let pool_size = match config.cluster.start_parallelism {
            0 => cluster.len(),
            n => n,
        };

        Self {
            lifecycle: ClusterLifecycleController::new(cluster.clone(), config.timeouts)
                .with_pool_size(pool_size),
            applier: TlsConfigurationApplier::new(config.tls.clone()),
            probe: ConvergenceProbe::new(connector, config.probe.clone(), config.timeouts),
            readiness: config.markers.readiness_pattern(),
            peer_rejection: config.markers.peer_rejection_pattern(),
            timeouts: config.timeouts,
            gate: Mutex::new(()),
            cluster,
        }
    }

    pub fn cluster(&self) -> &Arc<ClusterState> {
        &self.cluster
    }

    pub fn lifecycle(&self) -> &ClusterLifecycleController {
        &self.lifecycle
    }

    /// Runs `scenario` and checks the outcome it expects.
    ///
    /// # Errors
    /// `Error::Scenario` wrapping the first failure, tagged with the variant.
    pub async fn run(
        &self,
        scenario: &Scenario,
    ) -> Result<()> {
        match scenario.expected {
            ExpectedOutcome::Valid => self.run_valid(&scenario.variant).await,
            ExpectedOutcome::Invalid => self.run_invalid(&scenario.variant).await,
        }
    }

    /// stop_all → apply → start_all → readiness marker → convergence probe
    pub async fn run_valid(
        &self,
        variant: &TlsVariant,
    ) -> Result<()> {
        let _turn = self.gate.lock().await;
        info!("scenario start: valid {}", variant);

        let result = async {
            self.reconfigure(variant).await?;
            self.lifecycle.start_all().await?;
            self.wait_for_marker(self.cluster.observer(), &self.readiness).await?;
            self.probe.run(self.cluster.nodes()).await
        }
        .await;

        self.conclude(ExpectedOutcome::Valid, variant, result)
    }

    /// stop_all → apply → start observer → readiness marker → peer-rejection marker
    ///
    /// Only the observer's log is checked; whether the other nodes would also
    /// fail to form a quorum is not asserted.
    pub async fn run_invalid(
        &self,
        variant: &TlsVariant,
    ) -> Result<()> {
        let _turn = self.gate.lock().await;
        info!("scenario start: invalid {}", variant);

        let result = async {
            self.reconfigure(variant).await?;
            let observer = self.cluster.observer();
            self.lifecycle.start_one(observer).await?;
            self.wait_for_marker(observer, &self.readiness).await?;
            self.wait_for_marker(observer, &self.peer_rejection).await
        }
        .await;

        self.conclude(ExpectedOutcome::Invalid, variant, result)
    }

    async fn reconfigure(
        &self,
        variant: &TlsVariant,
    ) -> Result<()> {
        self.lifecycle.stop_all().await?;
        self.applier.apply_all(self.cluster.nodes(), variant).await
    }

    async fn wait_for_marker(
        &self,
        node: &Node,
        pattern: &LogPattern,
    ) -> Result<()> {
        debug!("[{}] waiting for '{}'", node.name(), pattern);
        node.handle()
            .wait_for_log_line(
                pattern,
                self.timeouts.look_back_lines,
                self.timeouts.log_marker_timeout(),
            )
            .await
    }

    fn conclude(
        &self,
        expected: ExpectedOutcome,
        variant: &TlsVariant,
        result: Result<()>,
    ) -> Result<()> {
        let scenario = format!("{expected} {variant}");
        match result {
            Ok(()) => {
                info!("scenario passed: {}", scenario);
                Ok(())
            }
            Err(e) => {
                error!("scenario failed: {}: {}", scenario, e);
                Err(Error::Scenario {
                    scenario,
                    source: Box::new(e),
                })
            }
        }
    }
}
