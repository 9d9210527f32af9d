//! HTTP query layer for the AIS relay.
//!
//! Serves a point-in-time, filtered snapshot of the message store on demand.
//! Query handling never blocks behind feed I/O; it only takes the store's
//! read lock for the duration of a copy.

pub mod config;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use server::{create_router, run_server};
pub use state::{QueryResponse, RelayState};
