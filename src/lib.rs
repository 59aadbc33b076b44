//! WAN uplink failover daemon library.

pub mod config;
pub mod heartbeat;
pub mod link;
pub mod failover;
pub mod lifecycle;
pub mod observability;

pub use config::FailoverConfig;
pub use failover::FailoverManager;
pub use lifecycle::Shutdown;
