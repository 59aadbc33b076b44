//! Link subsystem.
//!
//! # Data Flow
//! ```text
//! HeartbeatConnection events (Up / Down)
//!     → monitor.rs (Link::observe)
//!     → state.rs (Init / Dead / Alive / Stable)
//!     → LinkEvent { priority, Down | Up | Stable } to the failover manager
//!
//! Stability timer (min_uptime, re-armed every loop iteration)
//!     → Link::stability_elapsed
//!     → Alive → Stable, LinkEvent::Stable
//! ```
//!
//! # Design Decisions
//! - Down is reported only on entry into Dead, Up on every reconnect
//! - Links never learn whether they are active; the manager owns that flag
//! - One monitor task per link, cancelled only by global shutdown

pub mod event;
pub mod monitor;
pub mod state;

pub use event::{LinkEvent, LinkEventKind, Priority};
pub use monitor::{Link, MonitorSettings};
pub use state::{LinkState, StateHolder};
