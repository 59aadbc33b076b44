//! Failover error definitions.

use thiserror::Error;

use crate::failover::activation::ActivationError;
use crate::link::Priority;

/// Errors building the failover manager from configuration.
#[derive(Debug, Error)]
pub enum FailoverError {
    #[error("invalid address for link {priority}: {source}")]
    InvalidAddress {
        priority: Priority,
        #[source]
        source: url::ParseError,
    },
}

/// Why a switch attempt was abandoned.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("no stable or alive link available")]
    NoCandidate,

    #[error("command execution failed for link {priority}: {source}")]
    Activation {
        priority: Priority,
        #[source]
        source: ActivationError,
    },
}

impl SwitchError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            SwitchError::NoCandidate => "no_candidate",
            SwitchError::Activation { .. } => "activation_failed",
        }
    }
}
