//! AISStream WebSocket feed client.
//!
//! Maintains a single upstream session at a time:
//! - connect, send one fire-and-forget subscription request
//! - decode inbound frames and deliver them verbatim to a sink channel
//! - tear down on upstream error payloads, transport errors, or close
//! - reconnect after a fixed delay, bounded by an attempt budget

pub mod connection;
pub mod error;
pub mod subscription;

pub use connection::{ConnectionState, FeedConfig, FeedConnection, DEFAULT_FEED_URL};
pub use error::{FeedError, FeedResult};
pub use subscription::{BoundingBox, SubscriptionRequest, GLOBAL_BOUNDING_BOX};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
