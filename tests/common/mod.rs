//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rewansh::failover::{ActivationError, Activator};
use rewansh::heartbeat::Connectivity;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

/// How a mock heartbeat endpoint treats its clients.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum Mode {
    /// Answer every ping with a pong.
    Responsive,
    /// Complete the handshake, then never read or reply.
    Silent,
}

/// A WebSocket heartbeat endpoint on localhost.
pub struct MockEndpoint {
    pub addr: SocketAddr,
    stop: CancellationToken,
}

impl MockEndpoint {
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Stop accepting and drop every open connection.
    pub fn stop(&self) {
        self.stop.cancel();
    }
}

impl Drop for MockEndpoint {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

/// Start an endpoint on a free port.
pub async fn start_endpoint(mode: Mode) -> MockEndpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve(listener, mode)
}

/// Start an endpoint on `addr`, retrying while the previous listener winds down.
#[allow(dead_code)]
pub async fn start_endpoint_at(addr: SocketAddr, mode: Mode) -> MockEndpoint {
    for _ in 0..40 {
        if let Ok(listener) = TcpListener::bind(addr).await {
            return serve(listener, mode);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("could not rebind {addr}");
}

fn serve(listener: TcpListener, mode: Mode) -> MockEndpoint {
    let addr = listener.local_addr().unwrap();
    let stop = CancellationToken::new();
    let accept_stop = stop.clone();

    tokio::spawn(async move {
        loop {
            let socket = tokio::select! {
                _ = accept_stop.cancelled() => return,
                accepted = listener.accept() => match accepted {
                    Ok((socket, _)) => socket,
                    Err(_) => return,
                },
            };

            let conn_stop = accept_stop.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(socket).await else {
                    return;
                };
                match mode {
                    Mode::Responsive => loop {
                        let frame = tokio::select! {
                            _ = conn_stop.cancelled() => return,
                            frame = ws.next() => frame,
                        };
                        match frame {
                            Some(Ok(Message::Ping(payload))) => {
                                if ws.send(Message::Pong(payload)).await.is_err() {
                                    return;
                                }
                            }
                            Some(Ok(_)) => {}
                            _ => return,
                        }
                    },
                    Mode::Silent => conn_stop.cancelled().await,
                }
            });
        }
    });

    MockEndpoint { addr, stop }
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub fn unused_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

/// Wait for `wanted`, skipping other events, failing after `limit`.
#[allow(dead_code)]
pub async fn wait_for(
    events: &mut mpsc::UnboundedReceiver<Connectivity>,
    wanted: Connectivity,
    limit: Duration,
) {
    tokio::time::timeout(limit, async {
        while let Some(event) = events.recv().await {
            if event == wanted {
                return;
            }
        }
        panic!("event stream closed while waiting for {wanted:?}");
    })
    .await
    .unwrap_or_else(|_| panic!("no {wanted:?} within {limit:?}"));
}

/// Records activation commands instead of running them.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingActivator {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

#[allow(dead_code)]
impl RecordingActivator {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Poll until at least `count` commands ran.
    pub async fn wait_for_calls(&self, count: usize, limit: Duration) -> Vec<Vec<String>> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let calls = self.calls();
            if calls.len() >= count {
                return calls;
            }
            if tokio::time::Instant::now() >= deadline {
                panic!("expected {count} activations within {limit:?}, got {calls:?}");
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Activator for RecordingActivator {
    async fn activate(&self, command: &[String]) -> Result<String, ActivationError> {
        self.calls.lock().unwrap().push(command.to_vec());
        Ok(String::new())
    }
}
