//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define failover metrics (link health, active link, switches)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `rewansh_link_state` (gauge): 0=init, 1=dead, 2=alive, 3=stable, by priority
//! - `rewansh_active_link_priority` (gauge): priority of the active link, 0 if none
//! - `rewansh_switches_total` (counter): successful switches by target priority
//! - `rewansh_switch_failures_total` (counter): abandoned switches by reason
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::link::{LinkState, Priority};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_link_state(priority: Priority, state: LinkState) {
    gauge!("rewansh_link_state", "priority" => priority.to_string()).set(f64::from(u8::from(state)));
}

pub fn record_active_link(priority: Option<Priority>) {
    gauge!("rewansh_active_link_priority").set(f64::from(priority.unwrap_or(0)));
}

pub fn record_switch(priority: Priority) {
    counter!("rewansh_switches_total", "priority" => priority.to_string()).increment(1);
}

pub fn record_switch_failure(reason: &'static str) {
    counter!("rewansh_switch_failures_total", "reason" => reason).increment(1);
}
