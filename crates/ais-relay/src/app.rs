//! Relay service composition root.
//!
//! Wires the feed connection's sink into the message store and runs the
//! ingestion and query paths side by side. The feed side can halt (retry
//! budget exhausted) without taking the query path down.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use ais_api::{run_server, RelayState};
use ais_feed::FeedConnection;
use ais_store::MessageStore;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Sink channel depth between the feed session and the ingest task.
const SINK_CHANNEL_CAPACITY: usize = 1024;

/// Relay application.
pub struct Application {
    config: AppConfig,
    store: Arc<MessageStore>,
    feed: Arc<FeedConnection>,
    sink_rx: mpsc::Receiver<Value>,
}

impl Application {
    /// Create the application from configuration.
    ///
    /// Fails if the API credential is not present in the environment.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let api_key = config.resolve_api_key()?;

        let store = Arc::new(MessageStore::new(config.store.capacity));
        let (sink_tx, sink_rx) = mpsc::channel(SINK_CHANNEL_CAPACITY);
        let feed = Arc::new(FeedConnection::new(config.feed_config(api_key), sink_tx));

        Ok(Self {
            config,
            store,
            feed,
            sink_rx,
        })
    }

    /// Query state handle for the HTTP layer.
    pub fn relay_state(&self) -> RelayState {
        RelayState::new(self.store.clone(), self.feed.clone())
    }

    /// Run until the server exits or a shutdown signal arrives.
    pub async fn run(self) -> AppResult<()> {
        let Self {
            config,
            store,
            feed,
            mut sink_rx,
        } = self;

        // Ingest task: the store's append is the feed's registered sink.
        let ingest = tokio::spawn({
            let store = store.clone();
            async move {
                while let Some(msg) = sink_rx.recv().await {
                    store.append(msg);
                }
                debug!("Feed sink closed, ingest task exiting");
            }
        });

        // Feed driver: owns the upstream session and its retries.
        let feed_task = tokio::spawn({
            let feed = feed.clone();
            async move {
                match feed.run().await {
                    Ok(()) => info!("Feed connection stopped"),
                    Err(e) => error!(?e, "Feed ingestion halted"),
                }
            }
        });

        let state = RelayState::new(store, feed.clone());

        tokio::select! {
            result = run_server(state, config.server.clone()) => {
                result.map_err(|e| AppError::Server(e.to_string()))?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
            }
        }

        feed.shutdown();
        let _ = feed_task.await;
        ingest.abort();

        Ok(())
    }
}
