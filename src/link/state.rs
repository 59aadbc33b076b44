//! Link health state machine.
//!
//! # States
//! - Init: monitoring started, no connectivity result yet
//! - Dead: heartbeat connection is down
//! - Alive: heartbeat connection is up
//! - Stable: up with no connectivity event for `min_uptime`
//!
//! # State Transitions
//! ```text
//! Init  → Alive:  connectivity up
//! Init  → Dead:   connectivity down
//! Alive → Stable: stability timer expired
//! Alive | Stable → Dead: connectivity down
//! Dead | Alive | Stable → Alive: connectivity up
//! ```
//!
//! Dead never moves straight to Stable; it always passes through Alive.

use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

/// Health of a single link.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    Init = 0,
    Dead = 1,
    Alive = 2,
    Stable = 3,
}

impl LinkState {
    /// Whether the link can carry traffic right now.
    pub fn is_usable(self) -> bool {
        matches!(self, LinkState::Alive | LinkState::Stable)
    }
}

impl From<LinkState> for u8 {
    fn from(state: LinkState) -> Self {
        state as u8
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkState::Init => "init",
            LinkState::Dead => "dead",
            LinkState::Alive => "alive",
            LinkState::Stable => "stable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: LinkState,
    changed_at: Instant,
}

/// Lock-protected holder for a link's state and the time it last changed.
///
/// The link monitor is the only writer; anything may read.
#[derive(Debug)]
pub struct StateHolder {
    inner: RwLock<Entry>,
}

impl StateHolder {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Entry {
                state: LinkState::Init,
                changed_at: Instant::now(),
            }),
        }
    }

    pub fn get(&self) -> LinkState {
        self.read().state
    }

    pub fn is(&self, state: LinkState) -> bool {
        self.get() == state
    }

    /// When the state last changed (or the holder was created).
    pub fn changed_at(&self) -> Instant {
        self.read().changed_at
    }

    /// Store `state`, stamping the transition time.
    pub fn set(&self, state: LinkState) {
        let mut entry = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        entry.state = state;
        entry.changed_at = Instant::now();
    }

    fn read(&self) -> Entry {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StateHolder {
    fn default() -> Self {
        Self::new()
    }
}
