//! Certificate scenarios and the runner that drives them end-to-end.
//!
//! A scenario is one full stop / reconfigure / start / verify cycle against
//! the shared cluster:
//!
//! - **Valid**: every node restarts, the observer logs the readiness marker,
//!   and a znode written on the first node is visible on all of them.
//! - **Invalid**: only the observer restarts; its secure listener still comes
//!   up, but its peer handshakes must be refused. Never probed.

mod runner;
mod suite;
pub use runner::*;
pub use suite::*;

use std::fmt;

use crate::TlsVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedOutcome {
    Valid,
    Invalid,
}

impl fmt::Display for ExpectedOutcome {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ExpectedOutcome::Valid => f.write_str("valid"),
            ExpectedOutcome::Invalid => f.write_str("invalid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub variant: TlsVariant,
    pub expected: ExpectedOutcome,
}

impl Scenario {
    pub fn valid(variant: TlsVariant) -> Self {
        Self {
            variant,
            expected: ExpectedOutcome::Valid,
        }
    }

    pub fn invalid(variant: TlsVariant) -> Self {
        Self {
            variant,
            expected: ExpectedOutcome::Invalid,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} {}", self.expected, self.variant)
    }
}
