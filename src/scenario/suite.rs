//! The two exported scenario suites.
//!
//! Certificate pairs are expected on every node as `WithoutPassPhrase.{crt,key}`
//! (unencrypted key) and `WithPassPhrase.{crt,key}` (key encrypted with `test`).

use tracing::info;

use crate::ConfigurationScenarioRunner;
use crate::Result;
use crate::Scenario;
use crate::TlsVariant;

pub const PLAIN_CERTIFICATE: &str = "WithoutPassPhrase";
pub const ENCRYPTED_CERTIFICATE: &str = "WithPassPhrase";
pub const ENCRYPTED_KEY_PASSPHRASE: &str = "test";

/// Unencrypted key, no passphrase handler at all
pub fn plain_certificate_scenarios() -> Vec<Scenario> {
    vec![Scenario::valid(TlsVariant::plain(PLAIN_CERTIFICATE))]
}

/// Every passphrase case, in the order they run
pub fn passphrase_matrix_scenarios() -> Vec<Scenario> {
    vec![
        // A passphrase on an unencrypted key is ignored
        Scenario::valid(TlsVariant::with_passphrase(PLAIN_CERTIFICATE, "unusedpassword")),
        Scenario::invalid(TlsVariant::with_passphrase(ENCRYPTED_CERTIFICATE, "wrongpassword")),
        Scenario::invalid(TlsVariant::with_passphrase(ENCRYPTED_CERTIFICATE, "")),
        Scenario::valid(TlsVariant::with_passphrase(
            ENCRYPTED_CERTIFICATE,
            ENCRYPTED_KEY_PASSPHRASE,
        )),
        Scenario::invalid(TlsVariant::plain(ENCRYPTED_CERTIFICATE)),
    ]
}

/// Runs `scenarios` in order; the first failure ends the suite.
pub async fn run_scenarios(
    runner: &ConfigurationScenarioRunner,
    scenarios: &[Scenario],
) -> Result<()> {
    for (i, scenario) in scenarios.iter().enumerate() {
        info!("[{}/{}] {}", i + 1, scenarios.len(), scenario);
        runner.run(scenario).await?;
    }
    Ok(())
}

/// Plain-certificate validation
pub async fn secure_raft_works(runner: &ConfigurationScenarioRunner) -> Result<()> {
    run_scenarios(runner, &plain_certificate_scenarios()).await
}

/// Passphrase-matrix validation
pub async fn secure_raft_works_with_password(runner: &ConfigurationScenarioRunner) -> Result<()> {
    run_scenarios(runner, &passphrase_matrix_scenarios()).await
}
