//! Bounded message storage and snapshot filtering for the AIS relay.
//!
//! Raw feed messages are stored verbatim as `serde_json::Value`; validation
//! is deferred to query time so a malformed frame never breaks ingestion.

pub mod filter;
pub mod store;

pub use filter::{filter_position_reports, FilteredSnapshot, POSITION_REPORT, SNAPSHOT_LIMIT};
pub use store::MessageStore;
