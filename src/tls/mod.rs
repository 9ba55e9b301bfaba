//! Certificate configurations under test and how they land on a node.

mod applier;
pub use applier::*;

use std::fmt;

/// Whether and how a private key passphrase is configured.
///
/// `Empty` and `Absent` are different configurations: the first writes a
/// passphrase handler with an empty password, the second writes none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassphraseState {
    Absent,
    Empty,
    Set,
}

impl fmt::Display for PassphraseState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            PassphraseState::Absent => "absent",
            PassphraseState::Empty => "empty",
            PassphraseState::Set => "set",
        };
        f.write_str(s)
    }
}

/// One certificate configuration: a certificate/key pair base name plus an
/// optional passphrase for the key.
#[derive(Clone, PartialEq, Eq)]
pub struct TlsVariant {
    certificate: String,
    passphrase: Option<String>,
}

impl TlsVariant {
    /// Certificate pair used without any passphrase handler
    pub fn plain(certificate: impl Into<String>) -> Self {
        Self {
            certificate: certificate.into(),
            passphrase: None,
        }
    }

    /// Certificate pair whose key is unlocked with `passphrase` (may be empty)
    pub fn with_passphrase(
        certificate: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            certificate: certificate.into(),
            passphrase: Some(passphrase.into()),
        }
    }

    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }

    pub fn passphrase_state(&self) -> PassphraseState {
        match self.passphrase.as_deref() {
            None => PassphraseState::Absent,
            Some("") => PassphraseState::Empty,
            Some(_) => PassphraseState::Set,
        }
    }
}

/// Reports the passphrase's presence, never its value.
impl fmt::Display for TlsVariant {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "certificate={} passphrase={}",
            self.certificate,
            self.passphrase_state()
        )
    }
}

impl fmt::Debug for TlsVariant {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("TlsVariant")
            .field("certificate", &self.certificate)
            .field("passphrase", &self.passphrase_state())
            .finish()
    }
}
