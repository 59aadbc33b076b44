//! Heartbeat subsystem.
//!
//! # Data Flow
//! ```text
//! keep_alive (every ping_period):
//!     connect if needed → arm read deadline → send ping
//!
//! listen (continuous):
//!     connect if needed → read frames
//!     → pong: extend read deadline
//!     → error / close / deadline expiry: close session, reconnect
//!
//! connect / close:
//!     → Connectivity::Up / Connectivity::Down on the event stream
//! ```
//!
//! # Design Decisions
//! - Transport errors never leave this module; they become `Down` events
//! - The read deadline travels over a watch channel so the listener wakes
//!   when the probe task tightens it
//! - Sessions carry an id so a stale close from one task cannot tear down a
//!   session the other task just established

pub mod connection;
pub mod error;

use url::Url;

pub use connection::{HeartbeatConnection, HeartbeatTiming};
pub use error::HeartbeatError;

/// Connectivity transition reported by a heartbeat connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Up,
    Down,
}

/// Build the heartbeat endpoint URL for a link address.
pub fn endpoint_url(address: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("ws://{}/ws", address.trim()))
}
