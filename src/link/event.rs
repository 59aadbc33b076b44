//! Lifecycle events sent from link monitors to the failover manager.

use std::fmt;

/// Link priority: 1 is the most preferred link.
pub type Priority = u32;

/// What happened to a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEventKind {
    Down,
    Up,
    Stable,
}

impl fmt::Display for LinkEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkEventKind::Down => "down",
            LinkEventKind::Up => "up",
            LinkEventKind::Stable => "stable",
        };
        f.write_str(name)
    }
}

/// A lifecycle event for the link with `priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkEvent {
    pub priority: Priority,
    pub kind: LinkEventKind,
}

impl LinkEvent {
    pub fn new(priority: Priority, kind: LinkEventKind) -> Self {
        Self { priority, kind }
    }
}
