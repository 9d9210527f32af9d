//! Relay query state.
//!
//! `RelayState` is the read-only surface handed to the HTTP handlers. It
//! filters the store's current contents at query time; the feed side is
//! never consulted beyond its attempt counter.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use ais_feed::FeedConnection;
use ais_store::{filter_position_reports, MessageStore};

/// Query response served on `GET /api`.
///
/// `ships` holds the raw surviving messages, not a reshaped view, so
/// consumers can still reach nested fields like `MetaData.MMSI`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Total surviving position reports (before the 100-ship cap).
    pub count: usize,
    pub ships: Vec<Value>,
    /// ISO-8601 UTC timestamp of the snapshot.
    pub timestamp: String,
    /// Feed reconnect counter, read-only at this boundary.
    #[serde(rename = "connectionAttempts")]
    pub connection_attempts: u32,
}

/// Shared state for the query handlers.
#[derive(Clone)]
pub struct RelayState {
    store: Arc<MessageStore>,
    feed: Arc<FeedConnection>,
}

impl RelayState {
    pub fn new(store: Arc<MessageStore>, feed: Arc<FeedConnection>) -> Self {
        Self { store, feed }
    }

    /// Filtered snapshot of the current store contents.
    ///
    /// An empty store yields an empty result, never an error.
    pub fn query(&self) -> QueryResponse {
        let snapshot = self.store.snapshot();
        let filtered = filter_position_reports(&snapshot);

        QueryResponse {
            count: filtered.total,
            ships: filtered.ships,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            connection_attempts: self.feed.connection_attempts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ais_feed::FeedConfig;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn test_state(store: Arc<MessageStore>) -> RelayState {
        let (sink, _rx) = mpsc::channel(8);
        let feed = Arc::new(FeedConnection::new(FeedConfig::default(), sink));
        RelayState::new(store, feed)
    }

    #[test]
    fn test_query_empty_store() {
        let state = test_state(Arc::new(MessageStore::default()));
        let response = state.query();
        assert_eq!(response.count, 0);
        assert!(response.ships.is_empty());
        assert_eq!(response.connection_attempts, 0);
    }

    #[test]
    fn test_query_returns_raw_surviving_message() {
        let store = Arc::new(MessageStore::default());
        let report = json!({
            "MessageType": "PositionReport",
            "MetaData": {"latitude": 12.5, "longitude": 77.6, "MMSI": "123"}
        });
        store.append(report.clone());
        store.append(json!({"MessageType": "ShipStaticData"}));

        let response = test_state(store).query();
        assert_eq!(response.count, 1);
        assert_eq!(response.ships, vec![report]);
    }

    #[test]
    fn test_query_timestamp_is_rfc3339_utc() {
        let state = test_state(Arc::new(MessageStore::default()));
        let response = state.query();
        let parsed = chrono::DateTime::parse_from_rfc3339(&response.timestamp).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert!(response.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_response_json_contract() {
        let state = test_state(Arc::new(MessageStore::default()));
        let json = serde_json::to_value(state.query()).unwrap();
        assert!(json.get("count").is_some());
        assert!(json.get("ships").is_some());
        assert!(json.get("timestamp").is_some());
        assert!(json.get("connectionAttempts").is_some());
    }
}
