//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse flags → Load config → Validate → Init logging/metrics → Run manager
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Cancel token → Tasks exit → Grace period → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any configuration error is fatal before monitoring starts
//! - One cancellation token for every task; no per-link shutdown
//! - Shutdown has timeout: forced exit after the grace period

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, SHUTDOWN_GRACE};
pub use signals::shutdown_signal;
