// -
// Log markers emitted by the coordination service

/// Secure Raft listener came up
pub(crate) const READINESS_MARKER: &str = "Raft ASIO listener initiated on :::9234, SSL enabled";

/// Outbound peer handshake rejected
pub(crate) const PEER_REJECTION_MARKER: &str = "failed to connect to peer.*Connection refused";

/// Only this many trailing log lines are scanned per poll
pub(crate) const DEFAULT_LOOK_BACK_LINES: usize = 5000;

// -
// Node filesystem layout

pub(crate) const TLS_REMOTE_CONFIG_PATH: &str = "/etc/clickhouse-server/config.d/ssl_conf.yml";
pub(crate) const COORDINATION_STATE_DIR: &str = "/var/lib/clickhouse/coordination";

// -
// TLS templates

pub(crate) const TLS_TEMPLATE_DIR: &str = "configs";
pub(crate) const TLS_PLAIN_TEMPLATE: &str = "ssl_conf.yml";
pub(crate) const TLS_PASSPHRASE_TEMPLATE: &str = "ssl_conf_password.yml";
pub(crate) const CERTIFICATE_PLACEHOLDER: &str = "WithoutPassPhrase";
pub(crate) const PASSWORD_PLACEHOLDER: &str = "PASSWORD";

// -
// Convergence probe

pub(crate) const PROBE_PATH: &str = "/test_node";
pub(crate) const PROBE_PAYLOAD: &str = "somedata1";
