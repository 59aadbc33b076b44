//! Failover subsystem.
//!
//! # Data Flow
//! ```text
//! Link monitors (one task per link)
//!     → LinkEvent fan-in channel
//!     → manager.rs decision loop (single task)
//!     → activation.rs runs the chosen link's command
//!     → active flag moves to the new link
//! ```
//!
//! # Design Decisions
//! - The decision loop is the sole owner of "which link is active"
//! - Decision errors are logged and the loop keeps running
//! - No deactivation command: the new route supersedes the old one

pub mod activation;
pub mod error;
pub mod manager;

pub use activation::{ActivationError, Activator, CommandActivator};
pub use error::{FailoverError, SwitchError};
pub use manager::FailoverManager;
