//! Failover decision engine.
//!
//! # Responsibilities
//! - Own the set of links and which one is active
//! - Spawn one monitor per link and fan their events into one loop
//! - Decide when to switch, and run the activation command to do it
//!
//! # Decision Policy
//! ```text
//! Down(P), P active  → switch now
//! Down(P), P idle    → switch if the best idle Stable link beats the active
//!                      one and no better idle link is still only Alive
//! Up(P)              → switch if there is no active link
//! Stable(P)          → switch if P beats the active link and no better idle
//!                      link is still only Alive
//! ```
//!
//! # Design Decisions
//! - The loop is the only writer of the active flags, so no locking
//! - Link health is tracked from the events consumed here, never shared state
//! - A switch picks its replacement first and only moves the active flag once
//!   the command succeeded
//! - A link that went down while active loses its flag immediately, so a
//!   failed switch in that case leaves no active link until a later event

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::{FailoverConfig, PingConfig};
use crate::failover::activation::{Activator, CommandActivator};
use crate::failover::error::{FailoverError, SwitchError};
use crate::heartbeat::HeartbeatTiming;
use crate::link::{Link, LinkEvent, LinkEventKind, LinkState, MonitorSettings, Priority};
use crate::observability::metrics;

/// A link plus the manager-owned view of it.
#[derive(Debug)]
struct Slot {
    link: Arc<Link>,
    active: bool,
    health: LinkState,
}

impl Slot {
    fn priority(&self) -> Priority {
        self.link.priority()
    }
}

/// Central arbiter deciding which link is active.
pub struct FailoverManager<A = CommandActivator> {
    /// Ordered by priority.
    slots: Vec<Slot>,
    ping: PingConfig,
    min_uptime: Duration,
    activator: A,
}

impl<A: Activator> FailoverManager<A> {
    /// Build links from a validated configuration.
    ///
    /// Link priority follows configuration order, starting at 1.
    pub fn new(config: &FailoverConfig, activator: A) -> Result<Self, FailoverError> {
        let slots = config
            .links
            .iter()
            .enumerate()
            .map(|(i, link_config)| {
                let priority = (i + 1) as Priority;
                let link = Link::new(priority, &link_config.address, link_config.command.clone())
                    .map_err(|source| FailoverError::InvalidAddress { priority, source })?;
                Ok(Slot {
                    link: Arc::new(link),
                    active: link_config.is_active,
                    health: LinkState::Init,
                })
            })
            .collect::<Result<Vec<_>, FailoverError>>()?;

        let manager = Self {
            slots,
            ping: config.ping.clone(),
            min_uptime: config.min_uptime(),
            activator,
        };
        metrics::record_active_link(manager.active_priority());
        Ok(manager)
    }

    /// Priority of the active link, if any.
    pub fn active_priority(&self) -> Option<Priority> {
        self.slots.iter().find(|s| s.active).map(Slot::priority)
    }

    /// Health of a link as seen by the decision loop.
    pub fn link_state(&self, priority: Priority) -> Option<LinkState> {
        self.slot(priority).map(|s| s.health)
    }

    pub fn links(&self) -> impl Iterator<Item = &Arc<Link>> {
        self.slots.iter().map(|s| &s.link)
    }

    /// Monitor every link and run the decision loop until `shutdown` fires.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut monitors = JoinSet::new();

        for slot in &self.slots {
            let settings = self.monitor_settings(slot.active);
            monitors.spawn(Arc::clone(&slot.link).monitor(
                settings,
                events_tx.clone(),
                shutdown.clone(),
            ));
        }
        drop(events_tx);

        tracing::info!(
            links = self.slots.len(),
            active = ?self.active_priority(),
            "Failover manager running"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }

        while monitors.join_next().await.is_some() {}
        tracing::info!("Failover manager stopped");
    }

    /// Ping cadence is chosen once, from the role the link starts in.
    fn monitor_settings(&self, active: bool) -> MonitorSettings {
        let ping_period = if active {
            self.ping.active_period()
        } else {
            self.ping.idle_period()
        };
        MonitorSettings {
            heartbeat: HeartbeatTiming {
                ping_period,
                pong_wait: self.ping.pong_wait(),
            },
            min_uptime: self.min_uptime,
        }
    }

    /// Apply one lifecycle event to the decision policy.
    pub async fn handle_event(&mut self, event: LinkEvent) {
        let Some(slot) = self.slot_mut(event.priority) else {
            tracing::warn!(priority = event.priority, "Event for unknown link");
            return;
        };
        slot.health = match event.kind {
            LinkEventKind::Down => LinkState::Dead,
            LinkEventKind::Up => LinkState::Alive,
            LinkEventKind::Stable => LinkState::Stable,
        };

        match event.kind {
            LinkEventKind::Down => self.on_down(event.priority).await,
            LinkEventKind::Up => self.on_up(event.priority).await,
            LinkEventKind::Stable => self.on_stable(event.priority).await,
        }
    }

    async fn on_down(&mut self, priority: Priority) {
        if self.active_priority() == Some(priority) {
            tracing::info!(priority, "Active link is down, switching to another link");
            if let Some(slot) = self.slot_mut(priority) {
                slot.active = false;
            }
            metrics::record_active_link(None);
            self.try_switch().await;
            return;
        }

        tracing::info!(priority, "Idle link is down");
        let Some(stable) = self.best_idle(LinkState::Stable) else {
            return;
        };
        if !self.outranks_active(stable) || self.better_link_stabilizing(stable) {
            return;
        }

        tracing::info!(priority = stable, "Switching to a stable link with a higher priority");
        self.try_switch().await;
    }

    async fn on_up(&mut self, priority: Priority) {
        tracing::info!(priority, "Link is up");
        if self.active_priority().is_none() {
            tracing::info!(priority, "No active link, switching to an alive link");
            self.try_switch().await;
        }
    }

    async fn on_stable(&mut self, priority: Priority) {
        tracing::info!(priority, "Link is stable");
        if !self.outranks_active(priority) || self.better_link_stabilizing(priority) {
            return;
        }

        tracing::info!(priority, "Switching to a stable link with a higher priority");
        self.try_switch().await;
    }

    async fn try_switch(&mut self) {
        if let Err(e) = self.switch_active_link().await {
            tracing::error!(error = %e, "Cannot switch link");
            metrics::record_switch_failure(e.reason());
        }
    }

    /// Activate the best idle candidate: Stable before Alive, then priority.
    ///
    /// Flags are left untouched when no candidate exists or the command fails.
    pub async fn switch_active_link(&mut self) -> Result<Priority, SwitchError> {
        let link = self
            .best_idle(LinkState::Stable)
            .or_else(|| self.best_idle(LinkState::Alive))
            .and_then(|priority| self.slot(priority))
            .map(|slot| Arc::clone(&slot.link))
            .ok_or(SwitchError::NoCandidate)?;
        let priority = link.priority();

        tracing::debug!(priority, command = %link.command().join(" "), "Executing command");
        let output = self
            .activator
            .activate(link.command())
            .await
            .map_err(|source| SwitchError::Activation { priority, source })?;
        tracing::debug!(priority, output = %output.trim_end(), "Command execution complete");

        let previous = self.active_priority();
        for slot in &mut self.slots {
            slot.active = slot.priority() == priority;
        }

        tracing::info!(priority, previous = ?previous, "Switched active link");
        metrics::record_switch(priority);
        metrics::record_active_link(Some(priority));
        Ok(priority)
    }

    /// Whether `priority` is preferred over the active link (or none is active).
    fn outranks_active(&self, priority: Priority) -> bool {
        self.active_priority().map_or(true, |active| priority < active)
    }

    /// An idle link better than `priority` is up but not yet stable.
    fn better_link_stabilizing(&self, priority: Priority) -> bool {
        let waiting = self
            .best_idle(LinkState::Alive)
            .filter(|&alive| alive < priority);
        if let Some(alive) = waiting {
            tracing::debug!(
                priority,
                waiting_for = alive,
                "Deferring switch while a higher priority link stabilizes"
            );
        }
        waiting.is_some()
    }

    fn best_idle(&self, state: LinkState) -> Option<Priority> {
        self.slots
            .iter()
            .find(|s| !s.active && s.health == state)
            .map(Slot::priority)
    }

    fn slot(&self, priority: Priority) -> Option<&Slot> {
        self.slots.iter().find(|s| s.priority() == priority)
    }

    fn slot_mut(&mut self, priority: Priority) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.priority() == priority)
    }
}
