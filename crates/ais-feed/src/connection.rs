//! Feed connection manager.
//!
//! Handles the upstream session lifecycle: connect, subscribe, receive, and
//! reconnect after a fixed delay until the attempt budget is exhausted.

use crate::error::{FeedError, FeedResult};
use crate::subscription::{BoundingBox, SubscriptionRequest, GLOBAL_BOUNDING_BOX};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// AISStream production endpoint.
pub const DEFAULT_FEED_URL: &str = "wss://stream.aisstream.io/v0/stream";

/// Feed connection configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket URL.
    pub url: String,
    /// AISStream API credential.
    pub api_key: String,
    /// Regions to subscribe to.
    pub bounding_boxes: Vec<BoundingBox>,
    /// Message types requested from the feed.
    pub message_types: Vec<String>,
    /// Maximum consecutive connection attempts before the feed goes idle.
    pub max_connect_attempts: u32,
    /// Fixed delay between reconnection attempts.
    pub reconnect_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            api_key: String::new(),
            bounding_boxes: vec![GLOBAL_BOUNDING_BOX],
            message_types: vec!["PositionReport".to_string()],
            max_connect_attempts: 5,
            reconnect_delay_ms: 5000,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Socket open, subscription request sent, no data yet.
    Subscribed,
    /// At least one frame received on the current session.
    Receiving,
    Closing,
}

/// Outcome of decoding a single inbound text frame.
#[derive(Debug)]
enum FrameOutcome {
    /// Not valid JSON; logged and skipped, never fatal.
    Malformed(String),
    /// The feed sent an explicit error payload; the session is torn down.
    UpstreamError(String),
    /// A well-formed message, delivered verbatim.
    Message(Value),
}

/// Feed connection manager.
///
/// Owns the upstream session exclusively; at most one session exists at any
/// time. Decoded frames are delivered to the sink channel in arrival order.
pub struct FeedConnection {
    config: FeedConfig,
    state: Arc<RwLock<ConnectionState>>,
    /// Consecutive connection attempts; reset on the first received frame.
    attempts: Arc<RwLock<u32>>,
    sink: mpsc::Sender<Value>,
    /// Cancellation token for graceful shutdown; also cancels a pending
    /// reconnect delay so a restart cannot race a stale timer.
    shutdown_token: CancellationToken,
}

impl FeedConnection {
    /// Create a new feed connection delivering frames to `sink`.
    pub fn new(config: FeedConfig, sink: mpsc::Sender<Value>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            attempts: Arc::new(RwLock::new(0)),
            sink,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Current consecutive connection attempt count.
    ///
    /// Increments on every `Connecting` transition and resets to zero on the
    /// first frame received in a session. Pinned at the maximum once the
    /// budget is exhausted.
    pub fn connection_attempts(&self) -> u32 {
        *self.attempts.read()
    }

    /// Signal graceful shutdown.
    pub fn shutdown(&self) {
        info!("Feed shutdown requested");
        self.shutdown_token.cancel();
    }

    /// Check if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Drive the connection until shutdown or budget exhaustion.
    ///
    /// Returns `Ok(())` on shutdown and `RetryBudgetExhausted` once the
    /// attempt counter reaches the maximum with no intervening success. The
    /// caller decides whether to restart; nothing escalates to a process
    /// exit.
    pub async fn run(&self) -> FeedResult<()> {
        loop {
            if self.is_shutdown() {
                *self.state.write() = ConnectionState::Disconnected;
                return Ok(());
            }

            if *self.attempts.read() >= self.config.max_connect_attempts {
                error!(
                    attempts = *self.attempts.read(),
                    "Connection attempt budget exhausted, feed ingestion stopped"
                );
                *self.state.write() = ConnectionState::Disconnected;
                return Err(FeedError::RetryBudgetExhausted);
            }

            let attempt = {
                let mut attempts = self.attempts.write();
                *attempts += 1;
                *attempts
            };
            *self.state.write() = ConnectionState::Connecting;
            info!(
                attempt,
                max = self.config.max_connect_attempts,
                "Connecting to upstream feed"
            );

            match self.run_session().await {
                Ok(()) => info!("Feed session closed"),
                Err(e) => error!(?e, "Feed session error"),
            }

            *self.state.write() = ConnectionState::Disconnected;

            if self.is_shutdown() {
                return Ok(());
            }

            let delay = Duration::from_millis(self.config.reconnect_delay_ms);
            warn!(
                delay_ms = self.config.reconnect_delay_ms,
                "Feed disconnected, reconnecting after delay"
            );

            // Cancellation-aware sleep: a shutdown during the delay must not
            // leave a timer that would open a duplicate session later.
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during reconnect delay");
                    return Ok(());
                }
            }
        }
    }

    /// Run one upstream session to completion.
    async fn run_session(&self) -> FeedResult<()> {
        let (ws_stream, _response) =
            connect_async_tls_with_config(&self.config.url, None, true, None).await?;
        let (mut write, mut read) = ws_stream.split();

        let request = SubscriptionRequest::new(
            self.config.api_key.clone(),
            self.config.bounding_boxes.clone(),
            self.config.message_types.clone(),
        );
        write.send(Message::Text(serde_json::to_string(&request)?)).await?;
        *self.state.write() = ConnectionState::Subscribed;
        info!("Subscription request sent");

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in feed session");
                    *self.state.write() = ConnectionState::Closing;
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame during shutdown");
                    }
                    return Ok(());
                }

                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            match classify_frame(&text) {
                                FrameOutcome::Malformed(reason) => {
                                    warn!(%reason, "Failed to decode feed frame, skipping");
                                }
                                FrameOutcome::UpstreamError(reason) => {
                                    error!(%reason, "Upstream feed error, closing session");
                                    *self.state.write() = ConnectionState::Closing;
                                    if let Err(e) = write.send(Message::Close(None)).await {
                                        warn!(?e, "Failed to send Close frame after upstream error");
                                    }
                                    return Err(FeedError::Upstream(reason));
                                }
                                FrameOutcome::Message(value) => self.dispatch(value).await,
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "Feed closed by upstream");
                            *self.state.write() = ConnectionState::Closing;
                            return Err(FeedError::Closed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(?e, "Feed read error");
                            *self.state.write() = ConnectionState::Closing;
                            return Err(e.into());
                        }
                        None => {
                            warn!("Feed stream ended");
                            *self.state.write() = ConnectionState::Closing;
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Deliver a decoded frame to the sink.
    async fn dispatch(&self, msg: Value) {
        if *self.state.read() != ConnectionState::Receiving {
            *self.state.write() = ConnectionState::Receiving;
            *self.attempts.write() = 0;
            info!("Receiving feed data");
        }

        if msg.get("MessageType").and_then(Value::as_str) == Some("PositionReport") {
            debug!(mmsi = ?msg.pointer("/MetaData/MMSI"), "Position report received");
        }

        if self.sink.send(msg).await.is_err() {
            warn!("Feed sink receiver dropped");
        }
    }
}

/// Classify one inbound text frame.
///
/// Extracted as a free function for testability. Malformed frames are
/// non-fatal; an explicit `error` payload tears the session down.
fn classify_frame(text: &str) -> FrameOutcome {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => return FrameOutcome::Malformed(e.to_string()),
    };

    if let Some(reason) = value.get("error") {
        let reason = reason
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| reason.to_string());
        return FrameOutcome::UpstreamError(reason);
    }

    FrameOutcome::Message(value)
}
