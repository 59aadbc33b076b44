//! Link abstraction and its monitor loop.
//!
//! # Responsibilities
//! - Represent a single configured uplink (priority, endpoint, command)
//! - Translate heartbeat connectivity into link lifecycle events
//! - Promote a link to Stable after `min_uptime` without connectivity events

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::heartbeat::{endpoint_url, Connectivity, HeartbeatConnection, HeartbeatTiming};
use crate::link::event::{LinkEvent, LinkEventKind, Priority};
use crate::link::state::{LinkState, StateHolder};
use crate::observability::metrics;

/// Parameters fixed when a link monitor starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub heartbeat: HeartbeatTiming,
    pub min_uptime: Duration,
}

/// A single WAN uplink.
#[derive(Debug)]
pub struct Link {
    priority: Priority,
    url: Url,
    command: Vec<String>,
    state: StateHolder,
}

impl Link {
    /// Create a link for the heartbeat endpoint at `address`.
    pub fn new(
        priority: Priority,
        address: &str,
        command: Vec<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            priority,
            url: endpoint_url(address)?,
            command,
            state: StateHolder::new(),
        })
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Argument vector that makes this link the routed path.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn state(&self) -> LinkState {
        self.state.get()
    }

    pub fn state_changed_at(&self) -> Instant {
        self.state.changed_at()
    }

    pub fn is_alive(&self) -> bool {
        self.state.is(LinkState::Alive)
    }

    pub fn is_stable(&self) -> bool {
        self.state.is(LinkState::Stable)
    }

    /// Apply a connectivity change, returning the lifecycle event to report.
    ///
    /// Repeated downs collapse into one `Down`; every up is reported.
    pub fn observe(&self, connectivity: Connectivity) -> Option<LinkEvent> {
        match connectivity {
            Connectivity::Down => {
                if self.state.is(LinkState::Dead) {
                    return None;
                }
                tracing::debug!(priority = self.priority, url = %self.url, "Connection is down");
                self.transition(LinkState::Dead);
                Some(LinkEvent::new(self.priority, LinkEventKind::Down))
            }
            Connectivity::Up => {
                tracing::debug!(priority = self.priority, url = %self.url, "Connection is up");
                self.transition(LinkState::Alive);
                Some(LinkEvent::new(self.priority, LinkEventKind::Up))
            }
        }
    }

    /// Stability timer fired: promote an alive link to stable.
    pub fn stability_elapsed(&self) -> Option<LinkEvent> {
        if !self.state.is(LinkState::Alive) {
            return None;
        }
        tracing::debug!(priority = self.priority, url = %self.url, "Minimum uptime reached");
        self.transition(LinkState::Stable);
        Some(LinkEvent::new(self.priority, LinkEventKind::Stable))
    }

    fn transition(&self, state: LinkState) {
        self.state.set(state);
        metrics::record_link_state(self.priority, state);
    }

    /// Monitor this link until `cancel` fires, reporting lifecycle events.
    pub async fn monitor(
        self: Arc<Self>,
        settings: MonitorSettings,
        events: mpsc::UnboundedSender<LinkEvent>,
        cancel: CancellationToken,
    ) {
        tracing::info!(
            priority = self.priority,
            url = %self.url,
            ping_period = ?settings.heartbeat.ping_period,
            "Link monitor starting"
        );

        let (connection, mut connectivity) =
            HeartbeatConnection::new(self.url.clone(), settings.heartbeat);

        tokio::join!(
            connection.run(&cancel),
            self.drive(&mut connectivity, &events, settings.min_uptime, &cancel),
        );

        tracing::info!(priority = self.priority, "Link monitor stopped");
    }

    /// Consume connectivity events and the stability timer.
    ///
    /// The timer is re-armed on every iteration, so `Stable` means no
    /// connectivity event for `min_uptime`.
    async fn drive(
        &self,
        connectivity: &mut mpsc::UnboundedReceiver<Connectivity>,
        events: &mpsc::UnboundedSender<LinkEvent>,
        min_uptime: Duration,
        cancel: &CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => return,
                change = connectivity.recv() => match change {
                    Some(change) => self.observe(change),
                    None => return,
                },
                _ = time::sleep(min_uptime) => self.stability_elapsed(),
            };

            if let Some(event) = event {
                if events.send(event).is_err() {
                    return;
                }
            }
        }
    }
}
