use std::path::Path;
use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::CERTIFICATE_PLACEHOLDER;
use crate::constants::PASSWORD_PLACEHOLDER;
use crate::constants::TLS_PASSPHRASE_TEMPLATE;
use crate::constants::TLS_PLAIN_TEMPLATE;
use crate::constants::TLS_REMOTE_CONFIG_PATH;
use crate::constants::TLS_TEMPLATE_DIR;
use crate::Error;
use crate::Result;

/// Where the baseline TLS templates live and how they are rewritten
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TlsConfig {
    /// Directory holding the baseline templates.
    /// Relative paths resolve against the crate root.
    /// Default: "configs"
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Template used when no passphrase is configured
    /// Default: "ssl_conf.yml"
    #[serde(default = "default_plain_template")]
    pub plain_template: String,

    /// Template carrying a private key passphrase handler
    /// Default: "ssl_conf_password.yml"
    #[serde(default = "default_passphrase_template")]
    pub passphrase_template: String,

    /// Destination of the TLS config on each node
    /// Default: "/etc/clickhouse-server/config.d/ssl_conf.yml"
    #[serde(default = "default_remote_config_path")]
    pub remote_config_path: PathBuf,

    /// Text replaced by the certificate base name
    /// Default: "WithoutPassPhrase"
    #[serde(default = "default_certificate_placeholder")]
    pub certificate_placeholder: String,

    /// Text replaced by the passphrase
    /// Default: "PASSWORD"
    #[serde(default = "default_password_placeholder")]
    pub password_placeholder: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            plain_template: default_plain_template(),
            passphrase_template: default_passphrase_template(),
            remote_config_path: default_remote_config_path(),
            certificate_placeholder: default_certificate_placeholder(),
            password_placeholder: default_password_placeholder(),
        }
    }
}

impl TlsConfig {
    /// Validates placeholders and template file existence
    /// # Errors
    /// Returns `Error::Config` when:
    /// - a placeholder is empty
    /// - both placeholders are equal
    /// - a template file is missing
    pub fn validate(&self) -> Result<()> {
        if self.certificate_placeholder.is_empty() || self.password_placeholder.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "TLS placeholders cannot be empty".into(),
            )));
        }

        if self.certificate_placeholder == self.password_placeholder {
            return Err(Error::Config(ConfigError::Message(format!(
                "certificate and password placeholders must differ (both '{}')",
                self.certificate_placeholder
            ))));
        }

        if !self.remote_config_path.is_absolute() {
            return Err(Error::Config(ConfigError::Message(format!(
                "remote_config_path {} must be absolute",
                self.remote_config_path.display()
            ))));
        }

        self.validate_template(&self.plain_template_path(), "plain TLS template")?;
        self.validate_template(&self.passphrase_template_path(), "passphrase TLS template")?;

        Ok(())
    }

    pub fn plain_template_path(&self) -> PathBuf {
        self.resolved_template_dir().join(&self.plain_template)
    }

    pub fn passphrase_template_path(&self) -> PathBuf {
        self.resolved_template_dir().join(&self.passphrase_template)
    }

    fn resolved_template_dir(&self) -> PathBuf {
        if self.template_dir.is_absolute() {
            self.template_dir.clone()
        } else {
            Path::new(env!("CARGO_MANIFEST_DIR")).join(&self.template_dir)
        }
    }

    fn validate_template(
        &self,
        path: &Path,
        name: &str,
    ) -> Result<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(Error::Config(ConfigError::Message(format!(
                "{} file {} not found",
                name,
                path.display()
            ))))
        }
    }
}

// Default implementations
fn default_template_dir() -> PathBuf {
    PathBuf::from(TLS_TEMPLATE_DIR)
}
fn default_plain_template() -> String {
    TLS_PLAIN_TEMPLATE.into()
}
fn default_passphrase_template() -> String {
    TLS_PASSPHRASE_TEMPLATE.into()
}
fn default_remote_config_path() -> PathBuf {
    PathBuf::from(TLS_REMOTE_CONFIG_PATH)
}
fn default_certificate_placeholder() -> String {
    CERTIFICATE_PLACEHOLDER.into()
}
fn default_password_placeholder() -> String {
    PASSWORD_PLACEHOLDER.into()
}
