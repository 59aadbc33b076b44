//! Heartbeat connection tests against local WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use rewansh::heartbeat::{endpoint_url, Connectivity, HeartbeatConnection, HeartbeatTiming};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

mod common;

use common::{start_endpoint, start_endpoint_at, wait_for, Mode};

fn fast_timing() -> HeartbeatTiming {
    HeartbeatTiming {
        ping_period: Duration::from_millis(200),
        pong_wait: Duration::from_millis(300),
    }
}

fn spawn_heartbeat(
    address: &str,
    timing: HeartbeatTiming,
) -> (
    JoinHandle<()>,
    tokio::sync::mpsc::UnboundedReceiver<Connectivity>,
    CancellationToken,
) {
    let (conn, events) = HeartbeatConnection::new(endpoint_url(address).unwrap(), timing);
    let conn = Arc::new(conn);
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { conn.run(&cancel).await })
    };
    (task, events, cancel)
}

#[tokio::test]
async fn test_responsive_endpoint_stays_up() {
    let endpoint = start_endpoint(Mode::Responsive).await;
    let (task, mut events, cancel) = spawn_heartbeat(&endpoint.address(), fast_timing());

    let first = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap();
    assert_eq!(first, Some(Connectivity::Up));

    // Several probe cycles with pongs arriving in time.
    let quiet = tokio::time::timeout(Duration::from_millis(1500), events.recv()).await;
    assert!(quiet.is_err(), "unexpected event: {quiet:?}");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("heartbeat did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_silent_endpoint_misses_deadline_and_reconnects() {
    let endpoint = start_endpoint(Mode::Silent).await;
    let (task, mut events, cancel) = spawn_heartbeat(&endpoint.address(), fast_timing());

    wait_for(&mut events, Connectivity::Up, Duration::from_secs(5)).await;
    wait_for(&mut events, Connectivity::Down, Duration::from_secs(3)).await;
    wait_for(&mut events, Connectivity::Up, Duration::from_secs(5)).await;

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("heartbeat did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_silent_endpoint_detected_with_long_pong_wait() {
    // Probes more often than the pong allowance must not keep the session alive.
    let endpoint = start_endpoint(Mode::Silent).await;
    let timing = HeartbeatTiming {
        ping_period: Duration::from_millis(100),
        pong_wait: Duration::from_millis(600),
    };
    let (task, mut events, cancel) = spawn_heartbeat(&endpoint.address(), timing);

    wait_for(&mut events, Connectivity::Up, Duration::from_secs(5)).await;
    wait_for(&mut events, Connectivity::Down, Duration::from_secs(3)).await;

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn test_endpoint_restart_reports_down_then_up() {
    let endpoint = start_endpoint(Mode::Responsive).await;
    let addr = endpoint.addr;
    let (task, mut events, cancel) = spawn_heartbeat(&endpoint.address(), fast_timing());

    wait_for(&mut events, Connectivity::Up, Duration::from_secs(5)).await;

    endpoint.stop();
    drop(endpoint);
    wait_for(&mut events, Connectivity::Down, Duration::from_secs(3)).await;

    let _restarted = start_endpoint_at(addr, Mode::Responsive).await;
    wait_for(&mut events, Connectivity::Up, Duration::from_secs(5)).await;

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("heartbeat did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_cancel_while_connected_emits_nothing_more() {
    let endpoint = start_endpoint(Mode::Responsive).await;
    let (task, mut events, cancel) = spawn_heartbeat(&endpoint.address(), fast_timing());

    wait_for(&mut events, Connectivity::Up, Duration::from_secs(5)).await;
    cancel.cancel();
    task.await.unwrap();

    // The connection is gone, so the stream ends without a trailing Down.
    assert_eq!(events.recv().await, None);
}
