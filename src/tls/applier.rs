use std::sync::Arc;

use tracing::debug;

use crate::Node;
use crate::Result;
use crate::TlsConfig;
use crate::TlsVariant;

/// Rewrites a node's TLS config file to select a certificate pair and an
/// optional key passphrase.
///
/// Certificate content is never inspected: a bad combination has to be
/// rejected by the cluster itself, which is what the invalid scenarios check.
pub struct TlsConfigurationApplier {
    tls: TlsConfig,
}

impl TlsConfigurationApplier {
    pub fn new(tls: TlsConfig) -> Self {
        Self { tls }
    }

    pub async fn apply(
        &self,
        node: &Node,
        variant: &TlsVariant,
    ) -> Result<()> {
        let handle = node.handle();
        let remote = &self.tls.remote_config_path;

        let template = match variant.passphrase() {
            None => self.tls.plain_template_path(),
            Some(_) => self.tls.passphrase_template_path(),
        };
        debug!("[{}] applying {} from {:?}", node.name(), variant, template);

        handle.copy_config_file(&template, remote).await?;
        handle
            .patch_config_file(remote, &self.tls.certificate_placeholder, variant.certificate())
            .await?;

        if let Some(passphrase) = variant.passphrase() {
            handle
                .patch_config_file(remote, &self.tls.password_placeholder, passphrase)
                .await?;
        }

        Ok(())
    }

    /// Applies `variant` to every node in turn; the first failure aborts.
    pub async fn apply_all(
        &self,
        nodes: &[Arc<Node>],
        variant: &TlsVariant,
    ) -> Result<()> {
        for node in nodes {
            self.apply(node, variant).await?;
        }
        Ok(())
    }
}
