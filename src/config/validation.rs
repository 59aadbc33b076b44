//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce the failover contract: at least two links, one seeded active
//! - Validate value ranges (periods > 0, addresses form a valid endpoint URL)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::FailoverConfig;
use crate::heartbeat::endpoint_url;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("failover requires at least 2 links, got {0}")]
    TooFewLinks(usize),

    #[error("command is not defined for link #{0}")]
    MissingCommand(usize),

    #[error("invalid address '{address}' for link #{link}")]
    InvalidAddress { link: usize, address: String },

    #[error("active link is not defined")]
    NoActiveLink,

    #[error("exactly one active link is allowed, got {0}")]
    MultipleActiveLinks(usize),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.links.len() < 2 {
        errors.push(ValidationError::TooFewLinks(config.links.len()));
    }

    for (i, link) in config.links.iter().enumerate() {
        let number = i + 1;
        let program_missing = link.command.first().map_or(true, |p| p.trim().is_empty());
        if program_missing {
            errors.push(ValidationError::MissingCommand(number));
        }
        if link.address.trim().is_empty() || endpoint_url(&link.address).is_err() {
            errors.push(ValidationError::InvalidAddress {
                link: number,
                address: link.address.clone(),
            });
        }
    }

    match config.links.iter().filter(|l| l.is_active).count() {
        0 => errors.push(ValidationError::NoActiveLink),
        1 => {}
        n => errors.push(ValidationError::MultipleActiveLinks(n)),
    }

    let durations = [
        ("ping.active", config.ping.active),
        ("ping.idle", config.ping.idle),
        ("ping.pong_wait", config.ping.pong_wait),
        ("min_uptime", config.min_uptime.0),
    ];
    for (name, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
