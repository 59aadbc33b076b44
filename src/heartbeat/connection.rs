//! WebSocket heartbeat connection with an endless reconnect loop.
//!
//! # Responsibilities
//! - Dial the link's control endpoint, retrying every second until cancelled
//! - Probe the peer with pings and enforce a read deadline for the pongs
//! - Report every connectivity change on an unbounded event stream
//!
//! # Read deadline
//! ```text
//! connected → now + ping_period + pong_wait
//! ping sent → now + pong_wait, unless already earlier
//! pong read → now + ping_period + pong_wait
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::heartbeat::{Connectivity, HeartbeatError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Delay between connection attempts.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for a single WebSocket handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(45);

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Probe cadence for one connection, fixed when the link monitor starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatTiming {
    /// Interval between pings.
    pub ping_period: Duration,
    /// Time allowed for a pong after a ping.
    pub pong_wait: Duration,
}

impl HeartbeatTiming {
    fn response_window(&self) -> Duration {
        self.ping_period + self.pong_wait
    }
}

/// One established WebSocket session.
struct Session {
    id: u64,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
    closed: CancellationToken,
}

/// Heartbeat connection to a single link endpoint.
pub struct HeartbeatConnection {
    url: Url,
    timing: HeartbeatTiming,
    /// Current session; also serializes dialling between the two tasks.
    session: Mutex<Option<Arc<Session>>>,
    deadline: watch::Sender<Option<Instant>>,
    next_session_id: AtomicU64,
    events: mpsc::UnboundedSender<Connectivity>,
}

impl HeartbeatConnection {
    /// Create a connection and the receiving end of its event stream.
    pub fn new(url: Url, timing: HeartbeatTiming) -> (Self, mpsc::UnboundedReceiver<Connectivity>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (deadline, _) = watch::channel(None);

        (
            Self {
                url,
                timing,
                session: Mutex::new(None),
                deadline,
                next_session_id: AtomicU64::new(1),
                events,
            },
            events_rx,
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timing(&self) -> HeartbeatTiming {
        self.timing
    }

    /// Run the probe and listen tasks until `cancel` fires.
    pub async fn run(&self, cancel: &CancellationToken) {
        tokio::join!(self.keep_alive(cancel), self.listen(cancel));
        tracing::debug!(url = %self.url, "Heartbeat stopped");
    }

    /// Return the current session, dialling until one is established.
    ///
    /// Returns `None` only when cancelled.
    async fn connect(&self, cancel: &CancellationToken) -> Option<Arc<Session>> {
        let mut slot = tokio::select! {
            _ = cancel.cancelled() => return None,
            slot = self.session.lock() => slot,
        };
        if let Some(session) = slot.as_ref() {
            return Some(Arc::clone(session));
        }

        let mut retry = time::interval(RECONNECT_INTERVAL);
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = retry.tick() => {}
            }

            let attempt = tokio::select! {
                _ = cancel.cancelled() => return None,
                result = self.dial() => result,
            };

            match attempt {
                Ok(ws) => {
                    let (sink, stream) = ws.split();
                    let session = Arc::new(Session {
                        id: self.next_session_id.fetch_add(1, Ordering::Relaxed),
                        sink: Mutex::new(sink),
                        stream: Mutex::new(stream),
                        closed: CancellationToken::new(),
                    });
                    self.set_read_deadline(self.timing.response_window());
                    *slot = Some(Arc::clone(&session));

                    tracing::debug!(url = %self.url, session = session.id, "Connected");
                    self.emit(Connectivity::Up);
                    return Some(session);
                }
                Err(e) => {
                    tracing::debug!(url = %self.url, error = %e, "Cannot connect");
                    self.emit(Connectivity::Down);
                }
            }
        }
    }

    async fn dial(&self) -> Result<WsStream, HeartbeatError> {
        match time::timeout(HANDSHAKE_TIMEOUT, connect_async(self.url.as_str())).await {
            Ok(Ok((ws, _response))) => Ok(ws),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(HeartbeatError::HandshakeTimeout(HANDSHAKE_TIMEOUT)),
        }
    }

    /// Tear down `session_id` if it is still the current session.
    async fn close(&self, session_id: u64) {
        let session = {
            let mut slot = self.session.lock().await;
            let is_current = slot.as_ref().is_some_and(|s| s.id == session_id);
            if !is_current {
                return;
            }
            slot.take()
        };

        self.deadline.send_replace(None);
        if let Some(session) = session {
            session.closed.cancel();
            let mut sink = session.sink.lock().await;
            let _ = time::timeout(CLOSE_TIMEOUT, sink.close()).await;
        }

        tracing::debug!(url = %self.url, session = session_id, "Disconnected");
        self.emit(Connectivity::Down);
    }

    async fn listen(&self, cancel: &CancellationToken) {
        tracing::debug!(url = %self.url, "Listening for messages");

        loop {
            let Some(session) = self.connect(cancel).await else {
                return;
            };

            let result = self.read_until_failure(&session, cancel).await;
            if cancel.is_cancelled() {
                return;
            }
            if let Err(e) = result {
                tracing::debug!(url = %self.url, error = %e, "Read error");
            }
            self.close(session.id).await;
        }
    }

    /// Read frames until the session fails, is closed, or `cancel` fires.
    async fn read_until_failure(
        &self,
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<(), HeartbeatError> {
        let mut stream = session.stream.lock().await;
        let mut deadline_rx = self.deadline.subscribe();

        loop {
            let deadline = *deadline_rx.borrow_and_update();

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = session.closed.cancelled() => return Ok(()),
                _ = deadline_rx.changed() => {}
                _ = expire(deadline) => return Err(HeartbeatError::DeadlineExceeded),
                frame = stream.next() => match frame {
                    Some(Ok(Message::Pong(_))) => {
                        tracing::debug!(url = %self.url, "Got pong");
                        self.set_read_deadline(self.timing.response_window());
                    }
                    Some(Ok(Message::Close(_))) | None => return Err(HeartbeatError::Closed),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
            }
        }
    }

    async fn keep_alive(&self, cancel: &CancellationToken) {
        let period = self.timing.ping_period;
        tracing::debug!(url = %self.url, period = ?period, "Ping pong started");

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let Some(session) = self.connect(cancel).await else {
                return;
            };

            tracing::debug!(url = %self.url, "Sending ping");
            self.tighten_read_deadline(self.timing.pong_wait);
            if let Err(e) = self.send_probe(&session).await {
                tracing::debug!(url = %self.url, error = %e, "Write error");
                self.close(session.id).await;
            }
        }
    }

    async fn send_probe(&self, session: &Session) -> Result<(), HeartbeatError> {
        let mut sink = session.sink.lock().await;
        let ping = sink.send(Message::Ping(Vec::new().into()));
        match time::timeout(self.timing.pong_wait, ping).await {
            Ok(result) => result.map_err(HeartbeatError::from),
            Err(_) => Err(HeartbeatError::DeadlineExceeded),
        }
    }

    fn set_read_deadline(&self, after: Duration) {
        self.deadline.send_replace(Some(Instant::now() + after));
    }

    /// Pull the deadline in to `now + after`, never pushing it out.
    fn tighten_read_deadline(&self, after: Duration) {
        let at = Instant::now() + after;
        self.deadline.send_if_modified(|deadline| match deadline {
            Some(current) if *current <= at => false,
            _ => {
                *deadline = Some(at);
                true
            }
        });
    }

    fn emit(&self, event: Connectivity) {
        // The receiver only goes away when the link monitor is shutting down.
        let _ = self.events.send(event);
    }
}

async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
